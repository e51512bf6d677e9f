//! Normalization of raw extraction values into the shapes stored on a card record.

use crate::pipeline::error::{PipelineError, PipelineResult};
use regex::Regex;
use std::sync::LazyLock;

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2199;

/// `MM/YY`, `MM/YYYY`, `MM-YY`, `MM.YYYY`, `MM YY`.
static MONTH_FIRST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\s*[/\-. ]\s*(\d{4}|\d{2})$").expect("valid regex"));

/// `YYYY-MM`, `YYYY/MM`.
static YEAR_FIRST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})\s*[/\-.]\s*(\d{1,2})$").expect("valid regex"));

/// `MMYY` with no separator.
static COMPACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})(\d{2})$").expect("valid regex"));

/// Keeps ASCII digits only; spaces, dashes and any OCR noise are dropped.
pub fn card_number(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Trims and collapses every run of whitespace into a single space.
pub fn holder_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses an expiration date into `(month, year)` with a four-digit year.
///
/// Two-digit years are read as `20YY`.
pub fn expiration(raw: &str) -> PipelineResult<(u32, i32)> {
    let value = raw.trim();
    let failure = || PipelineError::ParseFailure {
        field: "expiration",
        value: raw.to_string(),
    };

    let (month, year) = if let Some(caps) = MONTH_FIRST.captures(value) {
        (caps[1].to_string(), caps[2].to_string())
    } else if let Some(caps) = YEAR_FIRST.captures(value) {
        (caps[2].to_string(), caps[1].to_string())
    } else if let Some(caps) = COMPACT.captures(value) {
        (caps[1].to_string(), caps[2].to_string())
    } else {
        return Err(failure());
    };

    let month: u32 = month.parse().map_err(|_| failure())?;
    let mut year: i32 = year.parse().map_err(|_| failure())?;
    if year < 100 {
        year += 2000;
    }

    if !(1..=12).contains(&month) || !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(failure());
    }
    Ok((month, year))
}
