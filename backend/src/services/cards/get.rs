use crate::pipeline;
use crate::services::error::ServiceError;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};

/// Actix web handler for `GET /api/cards/{id}`.
pub async fn process(state: web::Data<AppState>, id: web::Path<i64>) -> impl Responder {
    let id = id.into_inner();
    let result = state
        .with_connection(move |conn| pipeline::get(conn, id))
        .await
        .and_then(|record| record.ok_or(ServiceError::NotFound(id)));
    match result {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(e) => e.error_response(),
    }
}
