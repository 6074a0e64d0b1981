//! # Catalog Items
//!
//! Item and keyword lifecycle: CRUD with the shared unique-slug rule,
//! category existence checks, and the item/keyword edge table with its
//! per-pair uniqueness. Deleting an item always takes its edges with it;
//! reaction cleanup is the facade's job.

mod error;
mod items;
mod keywords;

pub use error::{ItemsError, Result};
pub use items::{ItemDraft, ItemManager, ItemPatch};
pub use keywords::KeywordManager;
