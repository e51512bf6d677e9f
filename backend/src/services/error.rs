use crate::blob::BlobError;
use crate::pipeline::error::PipelineError;
use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Failures a card endpoint can report back to the client.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Upload exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    #[error("Card record {0} not found")]
    NotFound(i64),

    #[error("Worker pool error: {0}")]
    Blocking(#[from] BlockingError),
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Pipeline(PipelineError::MissingData(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Pipeline(PipelineError::ParseFailure { .. }) => StatusCode::BAD_REQUEST,
            Self::Pipeline(PipelineError::StorageFailure(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Pipeline(PipelineError::Export(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Blob(BlobError::UnsupportedType(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Blob(BlobError::Empty(_)) => StatusCode::BAD_REQUEST,
            Self::Blob(BlobError::Io(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::warn!("{}", self);
        }
        HttpResponse::build(status).body(format!("Error: {}", self))
    }
}
