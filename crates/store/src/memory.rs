use crate::error::{Result, StoreError};
use crate::traits::{CatalogStore, Predicate, Records};
use async_trait::async_trait;
use catalog_model::{
    Bookmark, Category, Comment, Item, ItemKeyword, ItemViewEvent, Keyword, Like, Rate, Record,
    Review, SearchQuery,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// One entity collection: ordered rows behind an async `RwLock` plus an id
/// counter. Reads take the read lock; every write path, including the
/// conditional ones, holds the write lock from check to mutation.
struct Collection<R: Record> {
    rows: RwLock<BTreeMap<u64, R>>,
    next_id: AtomicU64,
}

impl<R: Record> Collection<R> {
    fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn from_rows(rows: Vec<R>) -> Self {
        let map: BTreeMap<u64, R> = rows.into_iter().map(|r| (r.id(), r)).collect();
        let next = map.keys().next_back().map_or(1, |max| max + 1);
        Self {
            rows: RwLock::new(map),
            next_id: AtomicU64::new(next),
        }
    }

    async fn dump(&self) -> Vec<R> {
        self.rows.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl<R: Record> Records<R> for Collection<R> {
    async fn get(&self, id: u64) -> Result<R> {
        self.rows
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<Vec<R>> {
        Ok(self.dump().await)
    }

    async fn find(&self, predicate: Predicate<'_, R>) -> Result<Vec<R>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect())
    }

    async fn create(&self, mut record: R) -> Result<R> {
        let mut rows = self.rows.write().await;
        record.set_id(self.next_id.fetch_add(1, Ordering::SeqCst));
        rows.insert(record.id(), record.clone());
        log::debug!("created {} #{}", R::KIND, record.id());
        Ok(record)
    }

    async fn update(&self, record: R) -> Result<R> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&record.id()) {
            return Err(StoreError::NotFound);
        }
        rows.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn delete(&self, id: u64) -> Result<()> {
        let mut rows = self.rows.write().await;
        if rows.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        log::debug!("deleted {} #{}", R::KIND, id);
        Ok(())
    }

    async fn insert_where(&self, mut record: R, conflict: Predicate<'_, R>) -> Result<R> {
        let mut rows = self.rows.write().await;
        if rows.values().any(|row| conflict(row)) {
            return Err(StoreError::Conflict);
        }
        record.set_id(self.next_id.fetch_add(1, Ordering::SeqCst));
        rows.insert(record.id(), record.clone());
        log::debug!("created {} #{}", R::KIND, record.id());
        Ok(record)
    }

    async fn update_where(&self, record: R, conflict: Predicate<'_, R>) -> Result<R> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&record.id()) {
            return Err(StoreError::NotFound);
        }
        if rows.values().any(|row| conflict(row)) {
            return Err(StoreError::Conflict);
        }
        rows.insert(record.id(), record.clone());
        Ok(record)
    }
}

/// JSON shape of a full store snapshot.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    categories: Vec<Category>,
    items: Vec<Item>,
    keywords: Vec<Keyword>,
    item_keywords: Vec<ItemKeyword>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
    rates: Vec<Rate>,
    reviews: Vec<Review>,
    bookmarks: Vec<Bookmark>,
    item_views: Vec<ItemViewEvent>,
    search_queries: Vec<SearchQuery>,
}

/// In-memory catalog store. Suitable for tests, fixtures and single-process
/// deployments; [`MemoryStore::save`] / [`MemoryStore::load`] round-trip the
/// whole state as pretty-printed JSON.
pub struct MemoryStore {
    categories: Collection<Category>,
    items: Collection<Item>,
    keywords: Collection<Keyword>,
    item_keywords: Collection<ItemKeyword>,
    comments: Collection<Comment>,
    likes: Collection<Like>,
    rates: Collection<Rate>,
    reviews: Collection<Review>,
    bookmarks: Collection<Bookmark>,
    item_views: Collection<ItemViewEvent>,
    search_queries: Collection<SearchQuery>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot::default())
    }

    fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            categories: Collection::from_rows(snapshot.categories),
            items: Collection::from_rows(snapshot.items),
            keywords: Collection::from_rows(snapshot.keywords),
            item_keywords: Collection::from_rows(snapshot.item_keywords),
            comments: Collection::from_rows(snapshot.comments),
            likes: Collection::from_rows(snapshot.likes),
            rates: Collection::from_rows(snapshot.rates),
            reviews: Collection::from_rows(snapshot.reviews),
            bookmarks: Collection::from_rows(snapshot.bookmarks),
            item_views: Collection::from_rows(snapshot.item_views),
            search_queries: Collection::from_rows(snapshot.search_queries),
        }
    }

    /// Writes all collections to `path` as JSON.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let snapshot = Snapshot {
            categories: self.categories.dump().await,
            items: self.items.dump().await,
            keywords: self.keywords.dump().await,
            item_keywords: self.item_keywords.dump().await,
            comments: self.comments.dump().await,
            likes: self.likes.dump().await,
            rates: self.rates.dump().await,
            reviews: self.reviews.dump().await,
            bookmarks: self.bookmarks.dump().await,
            item_views: self.item_views.dump().await,
            search_queries: self.search_queries.dump().await,
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        tokio::fs::write(path.as_ref(), json).await?;
        log::info!("saved store snapshot to {:?}", path.as_ref());
        Ok(())
    }

    /// Restores a store from a snapshot written by [`MemoryStore::save`].
    /// Id counters resume past the highest persisted id per collection.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        let snapshot: Snapshot = serde_json::from_str(&json)?;
        log::info!("loaded store snapshot from {:?}", path.as_ref());
        Ok(Self::from_snapshot(snapshot))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore for MemoryStore {
    fn categories(&self) -> &dyn Records<Category> {
        &self.categories
    }

    fn items(&self) -> &dyn Records<Item> {
        &self.items
    }

    fn keywords(&self) -> &dyn Records<Keyword> {
        &self.keywords
    }

    fn item_keywords(&self) -> &dyn Records<ItemKeyword> {
        &self.item_keywords
    }

    fn comments(&self) -> &dyn Records<Comment> {
        &self.comments
    }

    fn likes(&self) -> &dyn Records<Like> {
        &self.likes
    }

    fn rates(&self) -> &dyn Records<Rate> {
        &self.rates
    }

    fn reviews(&self) -> &dyn Records<Review> {
        &self.reviews
    }

    fn bookmarks(&self) -> &dyn Records<Bookmark> {
        &self.bookmarks
    }

    fn item_views(&self) -> &dyn Records<ItemViewEvent> {
        &self.item_views
    }

    fn search_queries(&self) -> &dyn Records<SearchQuery> {
        &self.search_queries
    }
}
