use crate::pipeline;
use crate::pipeline::error::PipelineResult;
use crate::services::error::ServiceError;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use card_model::model::card::CardRecord;
use card_model::model::filter::CardFilter;

/// Actix web handler for `GET /api/cards`.
///
/// Returns the matching records as a JSON array, ordered by `created_at` then `id`.
pub async fn process(state: web::Data<AppState>, filter: web::Query<CardFilter>) -> impl Responder {
    match list_cards(&state, filter.into_inner()).await {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(e) => e.error_response(),
    }
}

async fn list_cards(state: &AppState, filter: CardFilter) -> Result<Vec<CardRecord>, ServiceError> {
    state
        .with_connection(move |conn| pipeline::list(conn, filter).collect::<PipelineResult<Vec<_>>>())
        .await
}
