//! Shared application state injected into every handler as `web::Data<AppState>`.
//!
//! The state holds where the database lives, not a connection: each request
//! opens its own connection on actix's blocking pool and drops it before the
//! response is written.

use crate::blob::BlobStore;
use crate::config::Config;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::store;
use crate::services::error::ServiceError;
use actix_web::web;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db_path: Arc<PathBuf>,
    pub blobs: Arc<dyn BlobStore>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &Config, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            db_path: Arc::new(config.db_path.clone()),
            blobs,
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Runs `op` against a fresh connection on the blocking thread pool.
    pub async fn with_connection<T, F>(&self, op: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut Connection) -> PipelineResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = Arc::clone(&self.db_path);
        let result = web::block(move || {
            let mut conn = store::open(path.as_path())?;
            op(&mut conn)
        })
        .await?;
        Ok(result?)
    }
}
