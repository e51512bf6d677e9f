//! # Card Record Service Module
//!
//! HTTP endpoints over the record pipeline, grouped under `/api/cards`.
//!
//! ## Sub-modules:
//! - `ingest`: stores extraction output for an image that is already in the blob store.
//! - `upload`: stores an uploaded image in the blob store, then ingests its extraction output.
//! - `list`: filtered JSON listing.
//! - `export`: the same listing as a CSV download.
//! - `get`: a single record by id.

mod export;
mod get;
mod ingest;
mod list;
mod upload;


use actix_web::web::{get, post, scope};
use actix_web::Scope;

/// The base path for all card record endpoints.
const API_PATH: &str = "/api/cards";

/// Largest accepted extracted-fields document, as a JSON body or as the
/// `json` part of an upload.
pub const JSON_LIMIT: usize = 64 * 1024;

/// Configures and returns the Actix `Scope` for card record routes.
///
/// # Registered Routes:
///
/// *   **`POST /ingest`**: JSON `{ "fields": {..}, "image_reference": ".." }`. Returns the
///     stored record plus `previous_id` when the same card number was seen before.
/// *   **`POST /upload`**: multipart with a `json` part (extracted fields) and a `file`
///     part (JPEG or PNG image).
/// *   **`GET /`**: records matching the query-string filter (`brand`, `is_valid`,
///     `holder_name_contains`, `created_from`, `created_to`).
/// *   **`GET /export.csv`**: same filter, returned as a CSV attachment.
/// *   **`GET /{id}`**: one record, `404` when absent.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/ingest", post().to(ingest::process))
        .route("/upload", post().to(upload::process))
        .route("", get().to(list::process))
        .route("/", get().to(list::process))
        // Registered before `/{id}` so the literal path wins.
        .route("/export.csv", get().to(export::process))
        .route("/{id}", get().to(get::process))
}
