use crate::error::Result;
use async_trait::async_trait;
use catalog_model::{
    Bookmark, Category, Comment, Item, ItemKeyword, ItemViewEvent, Keyword, Like, Rate, Record,
    Review, SearchQuery,
};

/// Row-level filter. Predicates run under the collection's lock, so they
/// must be cheap and must not call back into the store.
pub type Predicate<'a, R> = &'a (dyn Fn(&R) -> bool + Send + Sync);

/// Uniform persistence surface for one record type.
///
/// `create` assigns the id; callers pass the record with `id == 0`.
/// The `*_where` variants check the conflict predicate and perform the
/// mutation without releasing the write lock in between, which is the
/// store's transactional guarantee for uniqueness constraints.
#[async_trait]
pub trait Records<R: Record>: Send + Sync {
    /// Fetches one record; `NotFound` on miss.
    async fn get(&self, id: u64) -> Result<R>;

    /// All records, ascending by id.
    async fn list(&self) -> Result<Vec<R>>;

    /// Records matching `predicate`, ascending by id.
    async fn find(&self, predicate: Predicate<'_, R>) -> Result<Vec<R>>;

    /// Inserts `record`, assigning the next id. Returns the stored record.
    async fn create(&self, record: R) -> Result<R>;

    /// Replaces the record with the same id; `NotFound` if it is missing.
    async fn update(&self, record: R) -> Result<R>;

    /// Deletes by id; `NotFound` if nothing was there.
    async fn delete(&self, id: u64) -> Result<()>;

    /// Inserts `record` only if no existing record satisfies `conflict`;
    /// returns `Conflict` otherwise. Check and insert are atomic.
    async fn insert_where(&self, record: R, conflict: Predicate<'_, R>) -> Result<R>;

    /// Replaces the record with the same id only if no record satisfies
    /// `conflict`. The predicate sees every row, including the one being
    /// replaced, so callers exclude self by id.
    async fn update_where(&self, record: R, conflict: Predicate<'_, R>) -> Result<R>;
}

/// Access to every collection the catalog persists. Managers hold an
/// `Arc<dyn CatalogStore>` and never name a concrete backend.
pub trait CatalogStore: Send + Sync {
    fn categories(&self) -> &dyn Records<Category>;
    fn items(&self) -> &dyn Records<Item>;
    fn keywords(&self) -> &dyn Records<Keyword>;
    fn item_keywords(&self) -> &dyn Records<ItemKeyword>;
    fn comments(&self) -> &dyn Records<Comment>;
    fn likes(&self) -> &dyn Records<Like>;
    fn rates(&self) -> &dyn Records<Rate>;
    fn reviews(&self) -> &dyn Records<Review>;
    fn bookmarks(&self) -> &dyn Records<Bookmark>;
    fn item_views(&self) -> &dyn Records<ItemViewEvent>;
    fn search_queries(&self) -> &dyn Records<SearchQuery>;
}
