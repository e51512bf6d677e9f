//! Model types shared by the card analyzer workspace.
//!
//! - `model`: the persisted `CardRecord`, the derived `Brand`, the typed view of
//!   extraction output (`ExtractedFields`) and the `CardFilter` used by list and
//!   export queries.
//! - `requests`: JSON payloads accepted and returned by the HTTP API.

pub mod model;
pub mod requests;
