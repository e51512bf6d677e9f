use std::ops::RangeInclusive;

pub const CARD_NUMBER_LENGTH: RangeInclusive<usize> = 13..=19;

/// Mod-10 checksum over a digits-only string. Any non-digit fails the check.
pub fn luhn(digits: &str) -> bool {
    if digits.is_empty() {
        return false;
    }
    let mut sum = 0u32;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

/// Validity flag stored on every record.
///
/// Expiration does not take part: an expired or unparseable date still yields
/// a valid record as long as the number and holder name pass.
pub fn is_valid(card_number: &str, holder_name: &str) -> bool {
    CARD_NUMBER_LENGTH.contains(&card_number.len())
        && luhn(card_number)
        && !holder_name.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("4111111111111111")]
    #[case("4222222222222")]
    #[case("378282246310005")]
    #[case("30569309025904")]
    #[case("5105105105105100")]
    #[case("6011111111111117")]
    #[case("41111111111111113")]
    #[case("411111111111111118")]
    #[case("4111111111111111110")]
    fn luhn_accepts_known_test_numbers(#[case] number: &str) {
        assert!(luhn(number));
        assert!(is_valid(number, "Jane Doe"));
    }

    #[rstest]
    #[case("4111111111111112")]
    #[case("1234567890123")]
    #[case("")]
    #[case("4111-1111")]
    fn luhn_rejects_bad_numbers(#[case] number: &str) {
        assert!(!luhn(number));
        assert!(!is_valid(number, "Jane Doe"));
    }

    #[test]
    fn validity_requires_length_and_holder() {
        // Passes Luhn but is too short.
        assert!(luhn("18"));
        assert!(!is_valid("18", "Jane Doe"));
        // 12 and 20 digits passing Luhn.
        assert!(luhn("411111111117"));
        assert!(!is_valid("411111111117", "Jane Doe"));
        assert!(luhn("00000000000000000000"));
        assert!(!is_valid("00000000000000000000", "Jane Doe"));
        assert!(!is_valid("4111111111111111", ""));
    }
}
