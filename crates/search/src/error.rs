use catalog_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    /// The query was empty or whitespace-only. Distinct from a query whose
    /// tokens all get filtered out, which is a legitimate empty result.
    #[error("search query must not be empty")]
    EmptyQuery,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, SearchError>;
