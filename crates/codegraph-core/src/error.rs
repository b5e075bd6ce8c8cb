use thiserror::Error;

/// Error kinds surfaced across the ingestion pipeline and its storage
/// collaborator. Per-file problems never propagate as these — they are
/// captured in a `failedFiles[]` report instead (see `codegraph_graph::pipeline::Report`).
#[derive(Error, Debug)]
pub enum CodeGraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("not a repository: {0}")]
    NotARepository(String),

    #[error("no index found at: {0}")]
    NoIndex(String),

    #[error("index is stale: {0}")]
    StaleIndex(String),

    #[error("unsupported language for: {0}")]
    UnsupportedLanguage(String),

    #[error("parse failure for {path}: {reason}")]
    ParseFailure { path: String, reason: String },

    #[error("storage is locked: {0}")]
    StorageLocked(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("graph error: {0}")]
    Graph(String),
}

pub type Result<T> = std::result::Result<T, CodeGraphError>;
