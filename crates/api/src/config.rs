use crate::error::{ApiError, ApiResult};
use anyhow::Context;
use catalog_model::Locale;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Facade configuration, loadable from TOML:
///
/// ```toml
/// default_locale = "ru"
///
/// [search]
/// default_limit = 10
/// max_limit = 50
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub default_locale: Locale,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result cap when the caller passes no limit.
    pub default_limit: usize,
    /// Hard ceiling; larger caller limits are clamped down to this.
    pub max_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: catalog_search::DEFAULT_LIMIT,
            max_limit: 100,
        }
    }
}

impl CatalogConfig {
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).context("parsing catalog configuration")
    }

    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("reading catalog configuration {:?}", path.as_ref()))?;
        Self::from_toml_str(&raw)
    }

    /// Resolves a caller-supplied limit: absent falls back to the default,
    /// zero is rejected, anything above the ceiling is clamped.
    pub(crate) fn resolve_limit(&self, requested: Option<usize>) -> ApiResult<usize> {
        match requested {
            None => Ok(self.search.default_limit),
            Some(0) => Err(ApiError::Validation("limit must be at least 1".into())),
            Some(n) => Ok(n.min(self.search.max_limit)),
        }
    }
}
