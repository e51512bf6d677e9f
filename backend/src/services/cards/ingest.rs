use crate::pipeline;
use crate::services::error::ServiceError;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use card_model::model::fields::ExtractedFields;
use card_model::requests::{IngestRequest, IngestResponse};

/// Actix web handler for `POST /api/cards/ingest`.
///
/// - `200 OK` with an `IngestResponse` once the record is stored (valid or not).
/// - `422 Unprocessable Entity` when the fields carry no card number.
/// - `503 Service Unavailable` when the database cannot be written.
pub async fn process(state: web::Data<AppState>, payload: web::Json<IngestRequest>) -> impl Responder {
    let IngestRequest {
        fields,
        image_reference,
    } = payload.into_inner();
    match ingest_card(&state, fields, image_reference).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

/// Ingests one extraction result and looks up whether the same card number was
/// already stored.
pub(super) async fn ingest_card(
    state: &AppState,
    fields: ExtractedFields,
    image_reference: String,
) -> Result<IngestResponse, ServiceError> {
    state
        .with_connection(move |conn| {
            let record = pipeline::ingest(conn, &fields, &image_reference)?;
            let previous_id = pipeline::find_by_card_number(conn, &record.card_number)?
                .map(|earliest| earliest.id)
                .filter(|&id| id != record.id);
            if let Some(id) = previous_id {
                log::info!(
                    "Card {} was already stored as record {}",
                    record.masked_number(),
                    id
                );
            }
            Ok(IngestResponse {
                record,
                previous_id,
            })
        })
        .await
}
