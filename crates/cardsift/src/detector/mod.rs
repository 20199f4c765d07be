//! Payment card number detection for single lines of text.
//!
//! A candidate is a run of exactly 16 ASCII digits bounded on each side by the start or end
//! of the line or by a comma, so a number must occupy a whole comma-separated field.
//! Whitespace inside the field is significant and disqualifies the candidate.

mod brand;
mod luhn;

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::sanitize;

pub use brand::{CardBrand, CARD_NUMBER_LEN};
pub use luhn::luhn_valid;

static RE_CANDIDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|,)([0-9]{16})(?:$|,)").unwrap());

/// A card number found inside a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardMatch<'a> {
    pub number: &'a str,
    pub brand: CardBrand,
    /// Byte offset of the first digit within the line.
    pub offset: usize,
}

/// Returns `true` when `line` contains at least one valid card number.
pub fn detect(line: &str) -> bool {
    find_card(line).is_some()
}

/// Finds the first valid card number in `line`, scanning candidates left to right.
///
/// A rejected candidate only consumes its own digits: scanning resumes at its trailing
/// comma, which can then open the next candidate.
pub fn find_card(line: &str) -> Option<CardMatch<'_>> {
    let mut start = 0;

    while let Some(caps) = RE_CANDIDATE.captures_at(line, start) {
        let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let candidate = digits.as_str();

        match CardBrand::from_number(candidate) {
            Some(brand) if luhn_valid(candidate) => {
                trace!(candidate = %sanitize::mask_pan(candidate), %brand, "valid card number");
                return Some(CardMatch {
                    number: candidate,
                    brand,
                    offset: digits.start(),
                });
            }
            _ => {
                trace!(candidate = %sanitize::mask_pan(candidate), "candidate rejected");
            }
        }

        // The match is at least 16 bytes long, so this always moves forward.
        start = whole.end() - 1;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_visa_number_matches() {
        assert!(detect("4111111111111111"));
    }

    #[test]
    fn test_bad_checksum_in_field_does_not_match() {
        assert!(!detect("a,4111111111111112,b"));
    }

    #[test]
    fn test_seventeen_digits_do_not_match() {
        assert!(!detect("41111111111111111"));
        assert!(!detect("a,41111111111111111,b"));
        assert!(!detect("14111111111111111"));
    }

    #[test]
    fn test_number_in_middle_field_matches() {
        assert!(detect("john,4111111111111111,12/29"));
        assert!(detect("john,smith,5555555555554444"));
        assert!(detect("5500000000000004,expired"));
    }

    #[test]
    fn test_whitespace_is_significant() {
        assert!(!detect("john, 4111111111111111,12/29"));
        assert!(!detect("john,4111111111111111 ,12/29"));
        assert!(!detect(" 4111111111111111"));
        assert!(!detect("4111111111111111\t"));
    }

    #[test]
    fn test_other_delimiters_are_not_boundaries() {
        assert!(!detect("card=4111111111111111"));
        assert!(!detect("\"4111111111111111\""));
        assert!(!detect("x;4111111111111111;y"));
    }

    #[test]
    fn test_rejected_candidate_shares_delimiter_with_next() {
        // First candidate fails Luhn, its trailing comma opens the second.
        let line = "4111111111111112,4012888888881881";
        let found = find_card(line).unwrap();
        assert_eq!(found.number, "4012888888881881");
        assert_eq!(found.offset, 17);
    }

    #[test]
    fn test_first_valid_candidate_wins() {
        let found = find_card("a,5105105105105100,4111111111111111").unwrap();
        assert_eq!(found.number, "5105105105105100");
        assert_eq!(found.brand, CardBrand::Mastercard);
    }

    #[test]
    fn test_unsupported_brand_with_valid_checksum_is_ignored() {
        // Discover passes Luhn but is not a recognised brand.
        assert!(!detect("6011111111111117"));
    }

    #[test]
    fn test_mastercard_two_series() {
        let found = find_card("2223000048400011").unwrap();
        assert_eq!(found.brand, CardBrand::Mastercard);
    }

    #[test]
    fn test_unicode_digits_are_not_candidates() {
        assert!(!detect("４１１１１１１１１１１１１１１１"));
    }

    #[test]
    fn test_lines_without_candidates() {
        assert!(!detect(""));
        assert!(!detect(","));
        assert!(!detect("no numbers here"));
        assert!(!detect("411111111111111"));
    }
}
