use crate::services::cards::ingest::ingest_card;
use crate::services::cards::JSON_LIMIT;
use crate::services::error::ServiceError;
use crate::state::AppState;
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use card_model::model::fields::ExtractedFields;
use card_model::requests::IngestResponse;
use futures_util::StreamExt;
use serde_json::from_slice;

/// Actix web handler for `POST /api/cards/upload`.
///
/// - `200 OK` with an `IngestResponse` on success.
/// - `400`/`413`/`415` for malformed multipart bodies, oversized or non-image files.
/// - `422`/`503` as for `/ingest`.
pub async fn process(state: web::Data<AppState>, payload: Multipart) -> impl Responder {
    match upload_card(&state, payload).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

/// Buffers one multipart part, failing with `PayloadTooLarge` as soon as it
/// grows past `limit` bytes.
async fn read_part(field: &mut Field, limit: usize) -> Result<Vec<u8>, ServiceError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| ServiceError::BadRequest(e.to_string()))?;
        if bytes.len() + chunk.len() > limit {
            return Err(ServiceError::PayloadTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Reads the `json` (extracted fields) and `file` (card image) parts, stores the
/// image in the blob store and ingests the fields against the returned reference.
///
/// Parts may arrive in any order; both are required.
pub async fn upload_card(
    state: &AppState,
    mut payload: Multipart,
) -> Result<IngestResponse, ServiceError> {
    let mut fields: Option<ExtractedFields> = None;
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ServiceError::BadRequest(e.to_string()))?;
        let part_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match part_name.as_deref() {
            Some("file") => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();

                let bytes = read_part(&mut field, state.max_upload_bytes).await?;
                image = Some((filename, bytes));
            }

            Some("json") => {
                let bytes = read_part(&mut field, JSON_LIMIT).await?;
                let parsed: ExtractedFields = from_slice(&bytes)
                    .map_err(|e| ServiceError::BadRequest(format!("Invalid fields JSON: {}", e)))?;
                fields = Some(parsed);
            }

            // Unknown parts are drained and ignored.
            _ => {
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| ServiceError::BadRequest(e.to_string()))?;
                }
            }
        }
    }

    let fields = fields.ok_or_else(|| ServiceError::BadRequest("Missing json part".to_string()))?;
    let (filename, bytes) =
        image.ok_or_else(|| ServiceError::BadRequest("Missing file part".to_string()))?;

    let blobs = state.blobs.clone();
    let image_reference = web::block(move || blobs.put(&filename, &bytes)).await??;

    ingest_card(state, fields, image_reference).await
}
