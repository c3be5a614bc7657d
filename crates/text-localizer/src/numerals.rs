use serde::{Deserialize, Serialize};

/// Digit system used when rendering numbers inside a localized sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumeralSystem {
    /// 0-9, left untouched.
    Latin,
    /// U+0660..U+0669, used by Arabic.
    ArabicIndic,
    /// U+06F0..U+06F9, used by Urdu and Persian.
    ExtendedArabicIndic,
}

impl NumeralSystem {
    fn zero(self) -> Option<u32> {
        match self {
            NumeralSystem::Latin => None,
            NumeralSystem::ArabicIndic => Some(0x0660),
            NumeralSystem::ExtendedArabicIndic => Some(0x06F0),
        }
    }

    /// Replace every ASCII digit with its native counterpart. Everything else,
    /// including letters, hyphens and the "N/A" sentinel, passes through.
    pub fn transliterate(self, input: &str) -> String {
        let Some(zero) = self.zero() else {
            return input.to_string();
        };
        input
            .chars()
            .map(|c| match c.to_digit(10) {
                Some(d) if c.is_ascii_digit() => char::from_u32(zero + d).unwrap_or(c),
                _ => c,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_is_identity() {
        assert_eq!(NumeralSystem::Latin.transliterate("P-101"), "P-101");
    }

    #[test]
    fn arabic_indic_digits() {
        assert_eq!(NumeralSystem::ArabicIndic.transliterate("101"), "١٠١");
        assert_eq!(NumeralSystem::ArabicIndic.transliterate("5"), "٥");
        assert_eq!(NumeralSystem::ArabicIndic.transliterate("N/A"), "N/A");
    }

    #[test]
    fn extended_digits_for_urdu() {
        assert_eq!(
            NumeralSystem::ExtendedArabicIndic.transliterate("2024"),
            "۲۰۲۴"
        );
    }
}
