/// Luhn mod-10 check over a run of ASCII digits.
///
/// Every second digit counting from the rightmost is doubled, with 9 subtracted when the
/// doubled value exceeds 9. The number is valid when the digit sum is a multiple of 10.
/// Returns `false` for empty input or any non-digit byte.
pub fn luhn_valid(digits: &str) -> bool {
    if digits.is_empty() {
        return false;
    }

    let mut sum = 0u32;
    for (i, byte) in digits.bytes().rev().enumerate() {
        if !byte.is_ascii_digit() {
            return false;
        }
        let mut digit = u32::from(byte - b'0');
        if i % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }

    sum % 10 == 0
}
