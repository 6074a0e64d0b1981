use catalog_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReactionError {
    #[error("item #{0} does not exist")]
    ItemNotFound(u64),

    #[error("comment not found")]
    CommentNotFound,

    #[error("parent comment belongs to a different item")]
    ParentMismatch,

    #[error("comment text must not be empty")]
    EmptyComment,

    #[error("review text must not be empty")]
    EmptyReview,

    #[error("rating {0} is out of range (0..=5)")]
    RatingOutOfRange(u8),

    #[error("item is already bookmarked by this user")]
    AlreadyBookmarked,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ReactionError>;
