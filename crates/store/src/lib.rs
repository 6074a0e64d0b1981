//! # Catalog Store
//!
//! Generic record-store interface the catalog core is written against, plus
//! an in-memory backend. Every entity type gets the same surface: lookup by
//! id, full list, predicate filter, create/update/delete, and two
//! conditional writes (`insert_where` / `update_where`) that hold the
//! collection's write lock across the conflict check and the mutation. The
//! conditional writes are what give the slug-uniqueness path its single-row
//! atomicity.

mod error;
mod memory;
mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use traits::{CatalogStore, Predicate, Records};
