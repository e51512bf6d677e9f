use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The extraction output carries no usable card number.
    #[error("Missing data: {0}")]
    MissingData(String),

    /// A non-critical field could not be parsed. `ingest` records such fields
    /// as null instead of failing.
    #[error("Could not parse {field} from '{value}'")]
    ParseFailure { field: &'static str, value: String },

    #[error("Storage failure: {0}")]
    StorageFailure(#[from] rusqlite::Error),

    #[error("CSV export failed: {0}")]
    Export(String),
}

impl From<csv::Error> for PipelineError {
    fn from(e: csv::Error) -> Self {
        PipelineError::Export(e.to_string())
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
