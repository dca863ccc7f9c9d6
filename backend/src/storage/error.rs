use thiserror::Error;

/// Transport and format failures reported by a store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt document: {0}")]
    Corrupt(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("blob not found: {0}")]
    BlobNotFound(String),

    #[error("blob {path} is {size} bytes, limit is {limit}")]
    BlobTooLarge { path: String, size: u64, limit: u64 },

    #[error("document store unavailable: {0}")]
    Unavailable(String),
}
