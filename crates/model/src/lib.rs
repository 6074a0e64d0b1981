//! # Catalog Model
//!
//! Shared record types for the catalog core: categories, items, keywords,
//! the item/keyword join edge, and the reaction records (comments, likes,
//! rates, reviews, bookmarks, view events, search history).
//!
//! All records are plain serde structs keyed by a store-assigned `u64` id.
//! Multilingual fields are held in [`LocalizedText`], an explicit per-locale
//! map with a fixed fallback order (requested locale, then the default
//! locale, then the first non-empty value).

mod locale;
mod records;

pub use locale::{Locale, LocalizedText, ParseLocaleError};
pub use records::{
    Bookmark, Category, Comment, Item, ItemKeyword, ItemViewEvent, Keyword, Like, Rate, Record,
    Review, SearchQuery,
};
