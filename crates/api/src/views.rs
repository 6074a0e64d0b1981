use catalog_model::{Category, Item, Locale};
use serde::Serialize;

/// Flat category projection with the title resolved for one locale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryView {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub level: u8,
    pub parent_id: Option<u64>,
    pub is_root: bool,
    pub is_leaf: bool,
}

impl CategoryView {
    pub(crate) fn render(category: &Category, locale: Locale, is_leaf: bool) -> Self {
        Self {
            id: category.id,
            title: category
                .title
                .resolve(locale)
                .unwrap_or_default()
                .to_string(),
            slug: category.slug.clone(),
            level: category.level,
            parent_id: category.parent_id,
            is_root: category.is_root(),
            is_leaf,
        }
    }
}

/// Category with eagerly rendered children, at most three levels deep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTreeNode {
    #[serde(flatten)]
    pub category: CategoryView,
    pub children: Vec<CategoryTreeNode>,
}

/// Single-category detail: the node, its ancestor chain root-first, and a
/// localized breadcrumb like `Electronics > Phones > Cases`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDetailView {
    #[serde(flatten)]
    pub category: CategoryView,
    pub ancestors: Vec<CategoryView>,
    pub breadcrumb: String,
}

/// Item projection with resolved text and linked keyword names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub logo: Option<String>,
    pub category_id: u64,
    pub keywords: Vec<String>,
}

impl ItemView {
    pub(crate) fn render(item: &Item, locale: Locale, keywords: Vec<String>) -> Self {
        Self {
            id: item.id,
            title: item.title.resolve(locale).unwrap_or_default().to_string(),
            slug: item.slug.clone(),
            description: item
                .description
                .resolve(locale)
                .unwrap_or_default()
                .to_string(),
            logo: item.logo.clone(),
            category_id: item.category_id,
            keywords,
        }
    }
}

/// Search results plus the echoed query breakdown, mirroring the engine's
/// response with rendered items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchView {
    pub results: Vec<ItemView>,
    pub query: String,
    pub tokens: Vec<String>,
    pub matched_tokens: Vec<String>,
    pub total_results: usize,
}
