//! # Record Pipeline
//!
//! Turns extraction output into validated card records, persists them, and
//! answers filter and export queries over what has been stored.
//!
//! Every operation takes the SQLite connection it should use. Nothing here
//! keeps a connection between calls.
//!
//! - `ingest`: normalize, validate, insert one record.
//! - `list`: lazily iterate the records matching a `CardFilter`.
//! - `export_csv`: the same records rendered as CSV.
//! - `get`, `find_by_card_number`: point lookups.

pub mod error;
pub mod export;
pub mod normalize;
pub mod store;
pub mod validate;

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::store::CardRecords;
use card_model::model::brand::Brand;
use card_model::model::card::CardRecord;
use card_model::model::fields::ExtractedFields;
use card_model::model::filter::CardFilter;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rusqlite::Connection;

pub use crate::pipeline::export::export_csv;
pub use crate::pipeline::store::{find_by_card_number, get};

/// A normalized card that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    pub card_number: String,
    pub holder_name: String,
    pub expiration_month: Option<u32>,
    pub expiration_year: Option<i32>,
    pub brand: Option<Brand>,
    pub image_reference: String,
    pub is_valid: bool,
    pub bank_name: Option<String>,
}

impl NewCard {
    /// Normalizes and validates extraction output without touching the store.
    ///
    /// Fails with `MissingData` only when no card number digits can be found.
    /// An unparseable expiration is logged and stored as null.
    pub fn prepare(fields: &ExtractedFields, image_reference: &str) -> PipelineResult<Self> {
        for key in &fields.ignored {
            debug!("Ignoring unrecognized extraction field '{}'", key);
        }

        let raw_number = fields
            .card_number
            .as_deref()
            .ok_or_else(|| PipelineError::MissingData("no card number field".to_string()))?;
        let card_number = normalize::card_number(raw_number);
        if card_number.is_empty() {
            return Err(PipelineError::MissingData(
                "card number field contains no digits".to_string(),
            ));
        }

        let holder_name = fields
            .holder_name
            .as_deref()
            .map(normalize::holder_name)
            .unwrap_or_default();

        let (expiration_month, expiration_year) = match fields.expiration.as_deref() {
            Some(raw) => match normalize::expiration(raw) {
                Ok((month, year)) => (Some(month), Some(year)),
                Err(e) => {
                    warn!("{}; storing expiration as null", e);
                    (None, None)
                }
            },
            None => (None, None),
        };

        let bank_name = fields
            .bank_name
            .as_deref()
            .map(normalize::holder_name)
            .filter(|name| !name.is_empty());

        let is_valid = validate::is_valid(&card_number, &holder_name);
        let brand = Brand::from_card_number(&card_number);

        Ok(Self {
            card_number,
            holder_name,
            expiration_month,
            expiration_year,
            brand,
            image_reference: image_reference.to_string(),
            is_valid,
            bank_name,
        })
    }
}

/// Normalizes, validates and stores one extraction result.
///
/// Invalid cards are stored with `is_valid = false`; they are never dropped.
/// On error nothing is written.
pub fn ingest(
    conn: &mut Connection,
    fields: &ExtractedFields,
    image_reference: &str,
) -> PipelineResult<CardRecord> {
    ingest_at(conn, fields, image_reference, Utc::now())
}

/// `ingest` with an explicit clock reading.
pub fn ingest_at(
    conn: &mut Connection,
    fields: &ExtractedFields,
    image_reference: &str,
    now: DateTime<Utc>,
) -> PipelineResult<CardRecord> {
    let card = NewCard::prepare(fields, image_reference)?;
    let record = store::insert(conn, &card, now)?;
    info!(
        "Stored card record {} ({}, brand: {}, valid: {})",
        record.id,
        record.masked_number(),
        record.brand.map_or("unknown", |b| b.as_str()),
        record.is_valid
    );
    Ok(record)
}

/// Records matching `filter`, ordered by `created_at` then `id`.
///
/// The returned iterator reads from the store page by page as it is consumed.
/// It borrows `conn` for its whole lifetime.
pub fn list(conn: &Connection, filter: CardFilter) -> CardRecords<'_> {
    CardRecords::new(conn, filter, store::PAGE_SIZE)
}
