use crate::model::brand::Brand;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A validated, persisted representation of one analyzed card image.
///
/// Records are created once by the ingest pipeline and never updated afterwards.
/// `id` and `created_at` are assigned by the store at insert time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: i64,
    /// Digits only. Stored unmasked.
    pub card_number: String,
    /// Trimmed with internal whitespace collapsed. Empty when extraction found no name.
    pub holder_name: String,
    pub expiration_month: Option<u32>,
    pub expiration_year: Option<i32>,
    pub brand: Option<Brand>,
    pub image_reference: String,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
    /// Issuing bank as read from the card image. Not part of the CSV export.
    #[serde(default)]
    pub bank_name: Option<String>,
}

impl CardRecord {
    /// Card number with everything but the last four digits replaced by `*`.
    ///
    /// Use this form whenever a number ends up in logs.
    pub fn masked_number(&self) -> String {
        mask_card_number(&self.card_number)
    }
}

pub fn mask_card_number(number: &str) -> String {
    let visible = number.chars().count().saturating_sub(4);
    number
        .chars()
        .enumerate()
        .map(|(i, c)| if i < visible { '*' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_all_but_last_four() {
        assert_eq!(mask_card_number("4111111111111111"), "************1111");
        assert_eq!(mask_card_number("123"), "123");
        assert_eq!(mask_card_number(""), "");
    }
}
