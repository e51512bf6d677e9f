//! Typed view over the key/value output of the document extraction service.
//!
//! The extraction service returns loosely named fields ("CardNumber", "number",
//! "card_no", ...). `ExtractedFields` folds those names into a closed set of
//! recognized fields and drops everything else, so the pipeline never looks
//! fields up by name at runtime.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The fields the ingest pipeline knows how to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RecognizedField {
    CardNumber,
    HolderName,
    Expiration,
    BankName,
}

impl RecognizedField {
    /// Maps an extraction key onto a recognized field.
    ///
    /// Matching ignores ASCII case and the separators `_`, `-` and space, so
    /// `CardHolderName`, `card_holder_name` and `card holder name` are the same key.
    fn from_key(key: &str) -> Option<Self> {
        let folded: String = key
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "number" | "cardnumber" | "cardno" | "pan" => Some(Self::CardNumber),
            "name" | "holdername" | "cardholdername" | "cardholder" | "cardname" | "holder" => {
                Some(Self::HolderName)
            }
            "exp" | "expiration" | "expirationdate" | "expiry" | "expirydate" | "validthru" => {
                Some(Self::Expiration)
            }
            "bank" | "bankname" | "issuingbank" | "issuer" => Some(Self::BankName),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, Option<String>>")]
pub struct ExtractedFields {
    pub card_number: Option<String>,
    pub holder_name: Option<String>,
    pub expiration: Option<String>,
    pub bank_name: Option<String>,
    /// Keys that were present in the raw output but not recognized.
    #[serde(skip)]
    pub ignored: Vec<String>,
}

impl ExtractedFields {
    fn set(&mut self, field: RecognizedField, value: String) {
        let slot = match field {
            RecognizedField::CardNumber => &mut self.card_number,
            RecognizedField::HolderName => &mut self.holder_name,
            RecognizedField::Expiration => &mut self.expiration,
            RecognizedField::BankName => &mut self.bank_name,
        };
        // First non-empty alias wins; later aliases of the same field are ignored.
        if slot.is_none() {
            *slot = Some(value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ExtractedFields
where
    K: Into<String>,
    V: Into<Option<String>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut pairs: Vec<(String, Option<String>)> = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        // HashMap iteration order is unspecified; sort so alias resolution is stable.
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut fields = ExtractedFields::default();
        for (key, value) in pairs {
            match RecognizedField::from_key(&key) {
                Some(field) => {
                    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                        fields.set(field, value);
                    }
                }
                None => fields.ignored.push(key),
            }
        }
        fields
    }
}

impl From<HashMap<String, Option<String>>> for ExtractedFields {
    fn from(raw: HashMap<String, Option<String>>) -> Self {
        raw.into_iter().collect()
    }
}
