use crate::locale::LocalizedText;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A persistable record with a store-assigned id.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Short kind name used in log lines and snapshot diagnostics.
    const KIND: &'static str;

    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);
}

macro_rules! impl_record {
    ($ty:ty, $kind:literal) => {
        impl Record for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> u64 {
                self.id
            }

            fn set_id(&mut self, id: u64) {
                self.id = id;
            }
        }
    };
}

/// Node of the category tree. `level` and `slug` are computed on every
/// write that touches the title or parent; callers never set them directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub title: LocalizedText,
    pub slug: String,
    pub parent_id: Option<u64>,
    pub level: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Catalog entry. Belongs to exactly one category; keyword links live in
/// [`ItemKeyword`] edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub title: LocalizedText,
    pub slug: String,
    pub description: LocalizedText,
    /// Opaque logo reference (URL or storage key); asset handling is not
    /// this crate's concern.
    pub logo: Option<String>,
    pub category_id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Search vocabulary entry. `name` is stored Unicode-lowercased and is
/// unique on that form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: u64,
    pub name: String,
    pub slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item/keyword join edge. The (item, keyword) pair is unique; the row id
/// exists only for storage bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemKeyword {
    pub id: u64,
    pub item_id: u64,
    pub keyword_id: u64,
    pub created_at: DateTime<Utc>,
}

/// Threaded comment on an item. `parent_id` must reference a comment on
/// the same item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub item_id: u64,
    pub user: Option<u64>,
    pub text: String,
    pub parent_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Like event. At most one per (item, user) when the user is known;
/// anonymous likes are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub id: u64,
    pub item_id: u64,
    pub user: Option<u64>,
    pub created_at: DateTime<Utc>,
}

/// Star rating in `0..=5`. One per (item, user) when the user is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub id: u64,
    pub item_id: u64,
    pub user: Option<u64>,
    pub rating: u8,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub item_id: u64,
    pub user: Option<u64>,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Bookmark, unique per (item, user). Always tied to a known user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: u64,
    pub item_id: u64,
    pub user: u64,
    pub created_at: DateTime<Utc>,
}

/// Append-only item view event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemViewEvent {
    pub id: u64,
    pub item_id: u64,
    pub user: Option<u64>,
    pub created_at: DateTime<Utc>,
}

/// Search-history entry: the query a user ran and, when known, the item
/// they opened from the results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub id: u64,
    pub user: Option<u64>,
    pub query: String,
    pub item_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl_record!(Category, "category");
impl_record!(Item, "item");
impl_record!(Keyword, "keyword");
impl_record!(ItemKeyword, "item_keyword");
impl_record!(Comment, "comment");
impl_record!(Like, "like");
impl_record!(Rate, "rate");
impl_record!(Review, "review");
impl_record!(Bookmark, "bookmark");
impl_record!(ItemViewEvent, "item_view");
impl_record!(SearchQuery, "search_query");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;

    #[test]
    fn category_root_predicate_follows_parent() {
        let now = Utc::now();
        let mut category = Category {
            id: 1,
            title: LocalizedText::new().with(Locale::Uz, "Xizmatlar"),
            slug: "xizmatlar".to_string(),
            parent_id: None,
            level: 0,
            created_at: now,
            updated_at: now,
        };
        assert!(category.is_root());

        category.parent_id = Some(7);
        assert!(!category.is_root());
    }

    #[test]
    fn record_ids_are_writable() {
        let now = Utc::now();
        let mut keyword = Keyword {
            id: 0,
            name: "iphone".to_string(),
            slug: None,
            created_at: now,
            updated_at: now,
        };
        keyword.set_id(42);
        assert_eq!(keyword.id(), 42);
        assert_eq!(Keyword::KIND, "keyword");
    }
}
