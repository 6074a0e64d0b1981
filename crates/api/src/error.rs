use catalog_items::ItemsError;
use catalog_reactions::ReactionError;
use catalog_search::SearchError;
use catalog_store::StoreError;
use catalog_taxonomy::TaxonomyError;
use serde::Serialize;
use thiserror::Error;

/// The four outcomes the HTTP layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

/// Boundary error. Validation, not-found and conflict messages travel to
/// the caller unchanged; internal errors keep their cause for logging but
/// display a generic message so store details never leak out.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Conflict(_) => ErrorKind::Conflict,
            ApiError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status the boundary should map this error to.
    pub fn status_hint(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }

    fn internal(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        log::error!("internal error at api boundary: {source}");
        ApiError::Internal(Box::new(source))
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound(err.to_string()),
            StoreError::Conflict => ApiError::Conflict(err.to_string()),
            other => ApiError::internal(other),
        }
    }
}

impl From<TaxonomyError> for ApiError {
    fn from(err: TaxonomyError) -> Self {
        match err {
            TaxonomyError::DepthExceeded(_)
            | TaxonomyError::SelfParent
            | TaxonomyError::CycleDetected(_)
            | TaxonomyError::EmptyTitle
            | TaxonomyError::UnsluggableTitle(_) => ApiError::Validation(err.to_string()),
            TaxonomyError::NotFound => ApiError::NotFound(err.to_string()),
            TaxonomyError::SlugExhausted(_) => ApiError::Conflict(err.to_string()),
            TaxonomyError::Store(store) => store.into(),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::EmptyQuery => ApiError::Validation(err.to_string()),
            SearchError::Store(store) => store.into(),
        }
    }
}

impl From<ItemsError> for ApiError {
    fn from(err: ItemsError) -> Self {
        match err {
            ItemsError::EmptyTitle
            | ItemsError::UnsluggableTitle(_)
            | ItemsError::EmptyKeyword => ApiError::Validation(err.to_string()),
            ItemsError::CategoryNotFound(_)
            | ItemsError::ItemNotFound
            | ItemsError::KeywordNotFound
            | ItemsError::NotAttached => ApiError::NotFound(err.to_string()),
            ItemsError::DuplicateKeyword(_)
            | ItemsError::AlreadyAttached
            | ItemsError::SlugExhausted(_) => ApiError::Conflict(err.to_string()),
            ItemsError::Store(store) => store.into(),
        }
    }
}

impl From<ReactionError> for ApiError {
    fn from(err: ReactionError) -> Self {
        match err {
            ReactionError::EmptyComment
            | ReactionError::EmptyReview
            | ReactionError::ParentMismatch
            | ReactionError::RatingOutOfRange(_) => ApiError::Validation(err.to_string()),
            ReactionError::ItemNotFound(_) | ReactionError::CommentNotFound => {
                ApiError::NotFound(err.to_string())
            }
            ReactionError::AlreadyBookmarked => ApiError::Conflict(err.to_string()),
            ReactionError::Store(store) => store.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kinds_map_to_status_hints() {
        assert_eq!(ApiError::Validation("x".into()).status_hint(), 400);
        assert_eq!(ApiError::NotFound("x".into()).status_hint(), 404);
        assert_eq!(ApiError::Conflict("x".into()).status_hint(), 409);
        let internal: ApiError = StoreError::Internal("disk on fire".into()).into();
        assert_eq!(internal.status_hint(), 500);
    }

    #[test]
    fn internal_display_does_not_leak_the_cause() {
        let err: ApiError = StoreError::Internal("connection string with secrets".into()).into();
        assert_eq!(err.to_string(), "internal error");
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn domain_errors_keep_their_messages() {
        let err: ApiError = TaxonomyError::SelfParent.into();
        assert_eq!(err.to_string(), "category cannot be its own parent");
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err: ApiError = SearchError::EmptyQuery.into();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err: ApiError = ItemsError::AlreadyAttached.into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}
