use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Card network inferred from the leading digits of a card number.
///
/// The serialized form is the human readable name (`"Visa"`, `"American Express"`),
/// which is also what gets stored in the `brand` column and written to CSV exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Brand {
    Visa,
    Mastercard,
    #[serde(rename = "American Express")]
    AmericanExpress,
    Discover,
    #[serde(rename = "JCB")]
    Jcb,
    #[serde(rename = "Diners Club")]
    DinersClub,
    UnionPay,
}

impl Brand {
    pub const ALL: [Brand; 7] = [
        Brand::Visa,
        Brand::Mastercard,
        Brand::AmericanExpress,
        Brand::Discover,
        Brand::Jcb,
        Brand::DinersClub,
        Brand::UnionPay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::AmericanExpress => "American Express",
            Self::Discover => "Discover",
            Self::Jcb => "JCB",
            Self::DinersClub => "Diners Club",
            Self::UnionPay => "UnionPay",
        }
    }

    /// Classifies a digits-only card number by its prefix.
    ///
    /// Ranges are checked in a fixed order so that overlapping prefixes resolve
    /// the same way every time (Discover's `622126..=622925` wins over UnionPay's `62`).
    pub fn from_card_number(digits: &str) -> Option<Self> {
        let prefix = |len: usize| -> Option<u32> {
            digits.get(..len).and_then(|p| p.parse::<u32>().ok())
        };
        let in_range = |len: usize, lo: u32, hi: u32| prefix(len).is_some_and(|p| (lo..=hi).contains(&p));

        if in_range(2, 34, 34) || in_range(2, 37, 37) {
            Some(Self::AmericanExpress)
        } else if in_range(3, 300, 305) || in_range(2, 36, 36) || in_range(2, 38, 39) {
            Some(Self::DinersClub)
        } else if in_range(4, 3528, 3589) {
            Some(Self::Jcb)
        } else if in_range(1, 4, 4) {
            Some(Self::Visa)
        } else if in_range(2, 51, 55) || in_range(4, 2221, 2720) {
            Some(Self::Mastercard)
        } else if in_range(4, 6011, 6011)
            || in_range(6, 622126, 622925)
            || in_range(3, 644, 649)
            || in_range(2, 65, 65)
        {
            Some(Self::Discover)
        } else if in_range(2, 62, 62) {
            Some(Self::UnionPay)
        } else {
            None
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBrand(pub String);

impl fmt::Display for UnknownBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown card brand '{}'", self.0)
    }
}

impl std::error::Error for UnknownBrand {}

impl FromStr for Brand {
    type Err = UnknownBrand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownBrand(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_prefixes() {
        assert_eq!(Brand::from_card_number("4111111111111111"), Some(Brand::Visa));
        assert_eq!(Brand::from_card_number("5555555555554444"), Some(Brand::Mastercard));
        assert_eq!(Brand::from_card_number("2223003122003222"), Some(Brand::Mastercard));
        assert_eq!(Brand::from_card_number("378282246310005"), Some(Brand::AmericanExpress));
        assert_eq!(Brand::from_card_number("6011111111111117"), Some(Brand::Discover));
        assert_eq!(Brand::from_card_number("6221260000000000"), Some(Brand::Discover));
        assert_eq!(Brand::from_card_number("3530111333300000"), Some(Brand::Jcb));
        assert_eq!(Brand::from_card_number("30569309025904"), Some(Brand::DinersClub));
        assert_eq!(Brand::from_card_number("6200000000000005"), Some(Brand::UnionPay));
    }

    #[test]
    fn unknown_or_short_numbers_have_no_brand() {
        assert_eq!(Brand::from_card_number("1234567890123"), None);
        assert_eq!(Brand::from_card_number("2220000000000000"), None);
        assert_eq!(Brand::from_card_number(""), None);
    }

    #[test]
    fn parses_display_names_case_insensitively() {
        assert_eq!("visa".parse::<Brand>(), Ok(Brand::Visa));
        assert_eq!("American Express".parse::<Brand>(), Ok(Brand::AmericanExpress));
        assert!("Maestro".parse::<Brand>().is_err());
    }

    #[test]
    fn serializes_as_display_name() {
        let json = serde_json::to_string(&Brand::DinersClub).unwrap();
        assert_eq!(json, "\"Diners Club\"");
    }
}
