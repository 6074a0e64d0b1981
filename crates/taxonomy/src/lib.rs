//! # Catalog Taxonomy
//!
//! The category tree manager: a 3-level-max hierarchy where every write
//! recomputes the node's level from its parent and derives a globally
//! unique slug from the first non-empty localized title. Reads cover the
//! flat list, the nested tree, ancestors, descendants, roots, leaves and
//! slug lookup, all built from bulk fetches rather than per-node queries.

mod error;
mod manager;
mod types;

pub use error::{Result, TaxonomyError};
pub use manager::{CategoryManager, MAX_LEVEL};
pub use types::{CategoryDraft, CategoryFilter, CategoryNode, CategoryPatch};
