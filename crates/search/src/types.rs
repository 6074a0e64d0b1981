use crate::error::Result;
use async_trait::async_trait;
use catalog_model::{Item, Locale};
use serde::Serialize;

/// Result cap applied when the caller does not pass one.
pub const DEFAULT_LIMIT: usize = 20;

/// A search invocation. `locale` picks the title used for the final
/// alphabetical tie-break and for substring matching context.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub limit: usize,
    pub locale: Locale,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: DEFAULT_LIMIT,
            locale: Locale::default(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

/// Ranked results plus the echoed query breakdown, so callers can see what
/// the engine actually matched.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<Item>,
    pub query: String,
    pub tokens: Vec<String>,
    /// Tokens that hit the keyword vocabulary, in token order.
    pub matched_tokens: Vec<String>,
    pub total_results: usize,
}

impl SearchResponse {
    /// The legitimate-empty shape: tokens echoed, nothing matched.
    pub(crate) fn empty(query: String, tokens: Vec<String>) -> Self {
        Self {
            results: Vec::new(),
            query,
            tokens,
            matched_tokens: Vec::new(),
            total_results: 0,
        }
    }
}

/// Common surface for the reference engine and any alternate backend.
#[async_trait]
pub trait ItemSearcher: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;
}
