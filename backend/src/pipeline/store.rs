//! SQLite persistence for card records.
//!
//! The store owns the `card_records` schema, the single insert path and the
//! read queries behind `list`, `get` and `find_by_card_number`. Every function
//! takes the connection explicitly; callers open one per operation and drop it
//! when the operation returns.
//!
//! `created_at` is stored as fixed-width RFC 3339 text (`%Y-%m-%dT%H:%M:%S%.6fZ`),
//! so ordering and range comparisons on the text column are chronological.

use crate::pipeline::error::PipelineResult;
use crate::pipeline::NewCard;
use card_model::model::brand::Brand;
use card_model::model::card::CardRecord;
use card_model::model::filter::CardFilter;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::{ToSql, Type};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Rows fetched per round trip while iterating `list` results.
pub const PAGE_SIZE: usize = 256;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS card_records (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    card_number      TEXT    NOT NULL,
    holder_name      TEXT    NOT NULL DEFAULT '',
    expiration_month INTEGER,
    expiration_year  INTEGER,
    brand            TEXT,
    image_reference  TEXT    NOT NULL,
    is_valid         INTEGER NOT NULL,
    created_at       TEXT    NOT NULL,
    bank_name        TEXT
);
CREATE INDEX IF NOT EXISTS idx_card_records_created ON card_records (created_at, id);
CREATE INDEX IF NOT EXISTS idx_card_records_number ON card_records (card_number);
";

const COLUMNS: &str = "id, card_number, holder_name, expiration_month, expiration_year, \
                       brand, image_reference, is_valid, created_at, bank_name";

/// Opens a connection to the database file with a busy timeout so concurrent
/// writers wait on each other instead of failing immediately.
pub fn open(path: impl AsRef<Path>) -> PipelineResult<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

/// Creates the `card_records` table and its indexes when missing.
pub fn migrate(conn: &Connection) -> PipelineResult<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<CardRecord> {
    let brand: Option<String> = row.get(5)?;
    let brand = brand
        .map(|b| b.parse::<Brand>())
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;
    let created_at: String = row.get(8)?;

    Ok(CardRecord {
        id: row.get(0)?,
        card_number: row.get(1)?,
        holder_name: row.get(2)?,
        expiration_month: row.get(3)?,
        expiration_year: row.get(4)?,
        brand,
        image_reference: row.get(6)?,
        is_valid: row.get(7)?,
        created_at: parse_timestamp(8, &created_at)?,
        bank_name: row.get(9)?,
    })
}

/// Inserts one record inside its own transaction and returns the row as stored.
///
/// `created_at` is `now` truncated to microseconds, raised to the latest stored
/// timestamp if the clock went backwards, so insertion order never decreases.
/// Any error rolls the transaction back and leaves no row behind.
///
/// The transaction takes the write lock up front so that concurrent writers
/// queue on the busy timeout instead of failing on a lock upgrade.
pub fn insert(conn: &mut Connection, card: &NewCard, now: DateTime<Utc>) -> PipelineResult<CardRecord> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let latest: Option<String> =
        tx.query_row("SELECT MAX(created_at) FROM card_records", [], |row| row.get(0))?;
    let mut created_at = now.trunc_subsecs(6);
    if let Some(latest) = latest {
        let latest = parse_timestamp(0, &latest)?;
        if latest > created_at {
            created_at = latest;
        }
    }

    tx.execute(
        "INSERT INTO card_records (card_number, holder_name, expiration_month, expiration_year, \
         brand, image_reference, is_valid, created_at, bank_name) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            card.card_number,
            card.holder_name,
            card.expiration_month,
            card.expiration_year,
            card.brand.map(|b| b.as_str()),
            card.image_reference,
            card.is_valid,
            format_timestamp(&created_at),
            card.bank_name,
        ],
    )?;
    let id = tx.last_insert_rowid();
    let record = get(&tx, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;

    tx.commit()?;
    Ok(record)
}

pub fn get(conn: &Connection, id: i64) -> PipelineResult<Option<CardRecord>> {
    let record = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM card_records WHERE id = ?1"),
            params![id],
            map_record,
        )
        .optional()?;
    Ok(record)
}

/// Earliest record stored with exactly this (normalized) card number.
pub fn find_by_card_number(conn: &Connection, card_number: &str) -> PipelineResult<Option<CardRecord>> {
    let record = conn
        .query_row(
            &format!(
                "SELECT {COLUMNS} FROM card_records WHERE card_number = ?1 \
                 ORDER BY created_at ASC, id ASC LIMIT 1"
            ),
            params![card_number],
            map_record,
        )
        .optional()?;
    Ok(record)
}

/// Lazily paged cursor over the records matching a filter, in
/// `(created_at, id)` ascending order.
///
/// Pages are fetched on demand with keyset pagination, so iteration never holds
/// a statement open between `next` calls. The sequence ends after the first
/// short page; calling `list` again restarts it from the beginning.
pub struct CardRecords<'c> {
    conn: &'c Connection,
    filter: CardFilter,
    page_size: usize,
    after: Option<(String, i64)>,
    buffer: VecDeque<CardRecord>,
    exhausted: bool,
}

impl<'c> CardRecords<'c> {
    pub(crate) fn new(conn: &'c Connection, filter: CardFilter, page_size: usize) -> Self {
        Self {
            conn,
            filter,
            page_size: page_size.max(1),
            after: None,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    fn fetch_page(&self) -> rusqlite::Result<Vec<CardRecord>> {
        let mut conditions: Vec<String> = Vec::new();
        let mut bind: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(brand) = self.filter.brand {
            bind.push(Box::new(brand.as_str()));
            conditions.push(format!("brand = ?{}", bind.len()));
        }
        if let Some(is_valid) = self.filter.is_valid {
            bind.push(Box::new(is_valid));
            conditions.push(format!("is_valid = ?{}", bind.len()));
        }
        if let Some(from) = &self.filter.created_from {
            bind.push(Box::new(format_timestamp(from)));
            conditions.push(format!("created_at >= ?{}", bind.len()));
        }
        if let Some(to) = &self.filter.created_to {
            bind.push(Box::new(format_timestamp(to)));
            conditions.push(format!("created_at <= ?{}", bind.len()));
        }
        if let Some((created_at, id)) = &self.after {
            bind.push(Box::new(created_at.clone()));
            let ts = bind.len();
            bind.push(Box::new(*id));
            let id_idx = bind.len();
            conditions.push(format!(
                "(created_at > ?{ts} OR (created_at = ?{ts} AND id > ?{id_idx}))"
            ));
        }
        bind.push(Box::new(self.page_size as i64));
        let limit_idx = bind.len();

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {COLUMNS} FROM card_records {where_clause} \
             ORDER BY created_at ASC, id ASC LIMIT ?{limit_idx}"
        );

        let bind_refs: Vec<&dyn ToSql> = bind.iter().map(|b| b.as_ref()).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(bind_refs.as_slice(), map_record)?;
        rows.collect()
    }
}

impl Iterator for CardRecords<'_> {
    type Item = PipelineResult<CardRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Some(Ok(record));
            }
            if self.exhausted {
                return None;
            }

            let page = match self.fetch_page() {
                Ok(page) => page,
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e.into()));
                }
            };
            if page.len() < self.page_size {
                self.exhausted = true;
            }
            if let Some(last) = page.last() {
                self.after = Some((format_timestamp(&last.created_at), last.id));
            }

            // The holder name predicate is applied here rather than in SQL so
            // that case folding covers non-ASCII names.
            let filter = &self.filter;
            self.buffer.extend(
                page.into_iter()
                    .filter(|record| filter.holder_name_matches(&record.holder_name)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn memory_store() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    fn new_card(number: &str, holder: &str) -> NewCard {
        NewCard {
            card_number: number.to_string(),
            holder_name: holder.to_string(),
            expiration_month: None,
            expiration_year: None,
            brand: Brand::from_card_number(number),
            image_reference: "blob://test".to_string(),
            is_valid: false,
            bank_name: None,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_800_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn migrate_is_idempotent() {
        let conn = memory_store();
        migrate(&conn).unwrap();
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let mut conn = memory_store();
        let a = insert(&mut conn, &new_card("4111111111111111", "A"), at(0)).unwrap();
        let b = insert(&mut conn, &new_card("4111111111111111", "B"), at(1)).unwrap();
        assert!(b.id > a.id);
        assert_eq!(get(&conn, a.id).unwrap(), Some(a));
    }

    #[test]
    fn created_at_never_goes_backwards() {
        let mut conn = memory_store();
        let first = insert(&mut conn, &new_card("1", "A"), at(10)).unwrap();
        let second = insert(&mut conn, &new_card("2", "B"), at(5)).unwrap();
        assert_eq!(second.created_at, first.created_at);
        assert!(second.id > first.id);
    }

    #[test]
    fn created_at_is_truncated_to_microseconds() {
        let mut conn = memory_store();
        let now = Utc.timestamp_opt(1_800_000_000, 123_456_789).unwrap();
        let record = insert(&mut conn, &new_card("1", "A"), now).unwrap();
        assert_eq!(record.created_at.timestamp_subsec_nanos(), 123_456_000);
    }

    #[test]
    fn get_missing_id_is_none() {
        let conn = memory_store();
        assert_eq!(get(&conn, 42).unwrap(), None);
    }

    #[test]
    fn find_by_card_number_returns_earliest() {
        let mut conn = memory_store();
        let first = insert(&mut conn, &new_card("4111111111111111", "A"), at(0)).unwrap();
        insert(&mut conn, &new_card("4111111111111111", "B"), at(1)).unwrap();
        let found = find_by_card_number(&conn, "4111111111111111").unwrap();
        assert_eq!(found.map(|r| r.id), Some(first.id));
        assert_eq!(find_by_card_number(&conn, "5555").unwrap(), None);
    }

    #[test]
    fn cursor_crosses_page_boundaries_with_tied_timestamps() {
        let mut conn = memory_store();
        for i in 0..7 {
            // Pairs of records share a timestamp.
            insert(&mut conn, &new_card("1", &format!("holder {i}")), at(i / 2)).unwrap();
        }
        let ids: Vec<i64> = CardRecords::new(&conn, CardFilter::default(), 2)
            .map(|r| r.unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn cursor_applies_holder_name_filter_across_pages() {
        let mut conn = memory_store();
        for name in ["Ana", "Bruno", "ANABELA", "Carla", "mariana"] {
            insert(&mut conn, &new_card("1", name), at(0)).unwrap();
        }
        let filter = CardFilter {
            holder_name_contains: Some("ana".to_string()),
            ..Default::default()
        };
        let names: Vec<String> = CardRecords::new(&conn, filter, 2)
            .map(|r| r.unwrap().holder_name)
            .collect();
        assert_eq!(names, vec!["Ana", "ANABELA", "mariana"]);
    }

    #[test]
    fn unreadable_brand_surfaces_as_storage_failure() {
        let conn = memory_store();
        conn.execute(
            "INSERT INTO card_records (card_number, holder_name, brand, image_reference, is_valid, created_at) \
             VALUES ('1', 'A', 'Nope', 'blob://x', 0, '2027-01-01T00:00:00.000000Z')",
            [],
        )
        .unwrap();
        let result: Vec<_> = CardRecords::new(&conn, CardFilter::default(), PAGE_SIZE).collect();
        assert_eq!(result.len(), 1);
        assert!(matches!(
            result[0],
            Err(crate::pipeline::error::PipelineError::StorageFailure(_))
        ));
    }
}
