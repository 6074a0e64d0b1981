//! # Catalog API
//!
//! The facade the HTTP layer talks to. [`Catalog`] wires the category
//! tree, the search engine, the item/keyword managers and the reaction
//! services over one shared store, translates every domain error into an
//! [`ApiError`] with a stable kind and status hint, and renders localized
//! view structs ready for JSON serialization.

mod catalog;
mod config;
mod error;
mod views;

pub use catalog::{Catalog, CascadeReport};
pub use config::{CatalogConfig, SearchConfig};
pub use error::{ApiError, ApiResult, ErrorKind};
pub use views::{CategoryDetailView, CategoryTreeNode, CategoryView, ItemView, SearchView};

pub use catalog_items::{ItemDraft, ItemPatch};
pub use catalog_model::{Locale, LocalizedText};
pub use catalog_reactions::RatingSummary;
pub use catalog_taxonomy::{CategoryDraft, CategoryFilter, CategoryPatch};
