//! # Catalog Reactions
//!
//! Social reaction records around items: threaded comments, likes, star
//! rates, reviews, bookmarks, view events and per-user search history.
//! Every write validates that the target item exists; `purge_item` is the
//! cascade hook the facade calls when an item goes away.

mod error;
mod manager;

pub use error::{ReactionError, Result};
pub use manager::{RatingSummary, ReactionManager};
