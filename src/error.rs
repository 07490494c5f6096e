use std::path::PathBuf;
use thiserror::Error;

/// Error type for the whole indexing pipeline.
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("required input file not found: {0}")]
    MissingInput(PathBuf),

    #[error("dump stream error in {source_name}: {message}")]
    DumpStream { source_name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, IndexerError>;
