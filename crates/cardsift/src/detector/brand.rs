use serde::Serialize;

/// Length of every card number the detector accepts.
pub const CARD_NUMBER_LEN: usize = 16;

/// Card brands whose 16-digit numbers are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
}

impl CardBrand {
    /// Identifies the brand from the leading digits of a 16-digit number.
    ///
    /// Visa numbers start with `4`. Mastercard numbers start with `51`-`55` or fall in the
    /// `2221`-`2720` range. Anything else, including numbers of another length, is `None`.
    pub fn from_number(number: &str) -> Option<Self> {
        if number.len() != CARD_NUMBER_LEN || !number.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        if number.starts_with('4') {
            return Some(CardBrand::Visa);
        }

        let two: u32 = number[..2].parse().ok()?;
        if (51..=55).contains(&two) {
            return Some(CardBrand::Mastercard);
        }

        let four: u32 = number[..4].parse().ok()?;
        if (2221..=2720).contains(&four) {
            return Some(CardBrand::Mastercard);
        }

        None
    }

    pub fn name(&self) -> &'static str {
        match self {
            CardBrand::Visa => "Visa",
            CardBrand::Mastercard => "Mastercard",
        }
    }
}

impl std::fmt::Display for CardBrand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
