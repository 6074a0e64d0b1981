use catalog_model::{Category, LocalizedText};
use serde::Serialize;

/// Input for a new category. Level and slug are always computed; there is
/// no way to request them.
#[derive(Debug, Clone, Default)]
pub struct CategoryDraft {
    pub title: LocalizedText,
    pub parent_id: Option<u64>,
}

/// Partial update. `parent_id: Some(None)` detaches the category and makes
/// it a root; `None` leaves the parent untouched.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub title: Option<LocalizedText>,
    pub parent_id: Option<Option<u64>>,
}

/// Filters for the flat category list. Empty filter returns everything.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub level: Option<u8>,
    /// `Some(None)` selects roots, `Some(Some(id))` the children of `id`.
    pub parent_id: Option<Option<u64>>,
}

/// Category with its children eagerly resolved, for tree rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}
