use catalog_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ItemsError {
    #[error("item title must be non-empty in at least one locale")]
    EmptyTitle,

    #[error("title '{0}' does not reduce to a usable slug")]
    UnsluggableTitle(String),

    #[error("keyword name must not be empty")]
    EmptyKeyword,

    #[error("keyword '{0}' already exists")]
    DuplicateKeyword(String),

    #[error("category #{0} does not exist")]
    CategoryNotFound(u64),

    #[error("item not found")]
    ItemNotFound,

    #[error("keyword not found")]
    KeywordNotFound,

    #[error("keyword is already attached to this item")]
    AlreadyAttached,

    #[error("keyword is not attached to this item")]
    NotAttached,

    #[error("could not find a free slug for '{0}'")]
    SlugExhausted(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ItemsError>;
