use std::io;

use thiserror::Error;

use crate::types::SourceId;

/// Error type for source access, export, download, and configuration failures.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("data source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable { source_id: SourceId, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Configuration(String),
}
