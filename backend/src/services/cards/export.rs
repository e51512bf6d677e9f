use crate::pipeline;
use crate::state::AppState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use card_model::model::filter::CardFilter;

pub const EXPORT_FILE_NAME: &str = "card_records.csv";

/// Actix web handler for `GET /api/cards/export.csv`.
///
/// Accepts the same query-string filter as the listing endpoint and returns
/// the records as a `text/csv` attachment. The header row is always present.
pub async fn process(state: web::Data<AppState>, filter: web::Query<CardFilter>) -> impl Responder {
    let filter = filter.into_inner();
    match state
        .with_connection(move |conn| pipeline::export_csv(conn, filter))
        .await
    {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(EXPORT_FILE_NAME.to_string())],
            })
            .body(bytes),
        Err(e) => e.error_response(),
    }
}
