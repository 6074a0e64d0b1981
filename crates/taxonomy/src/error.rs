use catalog_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("category tree is capped at 3 levels (level {0} requested)")]
    DepthExceeded(u8),

    #[error("category cannot be its own parent")]
    SelfParent,

    #[error("reparenting would create a cycle through category #{0}")]
    CycleDetected(u64),

    #[error("category title must be non-empty in at least one locale")]
    EmptyTitle,

    #[error("title '{0}' does not reduce to a usable slug")]
    UnsluggableTitle(String),

    #[error("category not found")]
    NotFound,

    #[error("could not find a free slug for '{0}'")]
    SlugExhausted(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, TaxonomyError>;
