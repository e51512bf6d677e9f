use crate::model::card::CardRecord;
use crate::model::fields::ExtractedFields;
use serde::{Deserialize, Serialize};

/// Request payload for `POST /api/cards/ingest`.
///
/// `fields` is the extraction service output as a flat JSON object of
/// field name to string; `image_reference` is the blob store reference of the
/// analyzed image.
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub fields: ExtractedFields,
    pub image_reference: String,
}

/// Response payload for the ingest and upload endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub record: CardRecord,
    /// Id of an earlier record carrying the same card number, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub previous_id: Option<i64>,
}
