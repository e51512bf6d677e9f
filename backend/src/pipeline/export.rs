use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::store::format_timestamp;
use card_model::model::card::CardRecord;
use card_model::model::filter::CardFilter;
use rusqlite::Connection;

/// Column order of every CSV export. The header row is written even when no
/// record matches.
pub const CSV_HEADER: [&str; 8] = [
    "id",
    "card_number",
    "holder_name",
    "expiration_month",
    "expiration_year",
    "brand",
    "is_valid",
    "created_at",
];

fn csv_row(record: &CardRecord) -> [String; 8] {
    let opt = |v: Option<String>| v.unwrap_or_default();
    [
        record.id.to_string(),
        record.card_number.clone(),
        record.holder_name.clone(),
        opt(record.expiration_month.map(|m| m.to_string())),
        opt(record.expiration_year.map(|y| y.to_string())),
        opt(record.brand.map(|b| b.as_str().to_string())),
        record.is_valid.to_string(),
        format_timestamp(&record.created_at),
    ]
}

/// Renders the records matching `filter` as UTF-8 CSV, in `list` order.
///
/// Null fields become empty cells; quoting follows the `csv` crate's defaults.
pub fn export_csv(conn: &Connection, filter: CardFilter) -> PipelineResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    let mut rows = 0usize;
    for record in super::list(conn, filter) {
        writer.write_record(csv_row(&record?))?;
        rows += 1;
    }
    log::debug!("Exported {} card records to CSV", rows);

    writer
        .into_inner()
        .map_err(|e| PipelineError::Export(e.to_string()))
}
