use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("conflicting record already exists")]
    Conflict,

    #[error("snapshot corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),

    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store backend error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
