use crate::model::brand::Brand;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Options accepted by the list and CSV export queries. Every option is optional;
/// the default filter matches every stored record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardFilter {
    /// Exact brand match.
    pub brand: Option<Brand>,
    pub is_valid: Option<bool>,
    /// Case-insensitive substring of the holder name.
    pub holder_name_contains: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub created_to: Option<DateTime<Utc>>,
}

impl CardFilter {
    /// Case-insensitive substring match of the holder name predicate. The
    /// needle is used as given, surrounding whitespace included; an absent or
    /// empty predicate matches every name.
    pub fn holder_name_matches(&self, holder_name: &str) -> bool {
        match self.holder_name_contains.as_deref() {
            Some(needle) if !needle.is_empty() => holder_name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder_filter(needle: &str) -> CardFilter {
        CardFilter {
            holder_name_contains: Some(needle.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn holder_name_predicate_ignores_case() {
        let filter = holder_filter("jOSÉ");
        assert!(filter.holder_name_matches("MARIA JOSÉ LIMA"));
        assert!(!filter.holder_name_matches("Jane Doe"));
    }

    #[test]
    fn holder_name_predicate_keeps_surrounding_whitespace() {
        let filter = holder_filter(" doe");
        assert!(filter.holder_name_matches("Jane Doe"));
        assert!(!filter.holder_name_matches("Doeman"));
    }

    #[test]
    fn empty_holder_name_predicate_matches_everything() {
        assert!(holder_filter("").holder_name_matches("Jane Doe"));
        assert!(CardFilter::default().holder_name_matches(""));
    }
}
