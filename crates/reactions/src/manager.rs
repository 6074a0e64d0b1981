use crate::error::{ReactionError, Result};
use catalog_model::{Bookmark, Comment, ItemViewEvent, Like, Rate, Review, SearchQuery};
use catalog_store::{CatalogStore, StoreError};
use chrono::Utc;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Aggregate over an item's rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub count: usize,
    /// Mean rating; 0.0 when nothing has been rated yet.
    pub average: f64,
}

/// Services for every reaction record type. Thin validation over the
/// store: item existence, range checks, per-user uniqueness rules.
pub struct ReactionManager {
    store: Arc<dyn CatalogStore>,
}

impl ReactionManager {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    // -- comments ---------------------------------------------------------

    /// Adds a comment, optionally as a reply. The parent must be a comment
    /// on the same item.
    pub async fn add_comment(
        &self,
        item_id: u64,
        user: Option<u64>,
        text: &str,
        parent_id: Option<u64>,
    ) -> Result<Comment> {
        if text.trim().is_empty() {
            return Err(ReactionError::EmptyComment);
        }
        self.require_item(item_id).await?;
        if let Some(parent_id) = parent_id {
            let parent = self.get_comment(parent_id).await?;
            if parent.item_id != item_id {
                return Err(ReactionError::ParentMismatch);
            }
        }

        let now = Utc::now();
        let saved = self
            .store
            .comments()
            .create(Comment {
                id: 0,
                item_id,
                user,
                text: text.trim().to_string(),
                parent_id,
                created_at: now,
                updated_at: now,
            })
            .await?;
        log::debug!("comment #{} added to item #{}", saved.id, item_id);
        Ok(saved)
    }

    /// All comments on an item, oldest first.
    pub async fn comments_for(&self, item_id: u64) -> Result<Vec<Comment>> {
        Ok(self
            .store
            .comments()
            .find(&move |c| c.item_id == item_id)
            .await?)
    }

    /// Deletes a comment together with its reply subtree. Returns how many
    /// comments were removed.
    pub async fn delete_comment(&self, id: u64) -> Result<usize> {
        let root = self.get_comment(id).await?;
        let thread = self.comments_for(root.item_id).await?;

        let mut children: HashMap<u64, Vec<u64>> = HashMap::new();
        for comment in &thread {
            if let Some(parent_id) = comment.parent_id {
                children.entry(parent_id).or_default().push(comment.id);
            }
        }

        let mut doomed = Vec::new();
        let mut stack = vec![id];
        let mut visited = HashSet::new();
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            doomed.push(current);
            if let Some(replies) = children.get(&current) {
                stack.extend(replies);
            }
        }

        for comment_id in doomed.iter().rev() {
            self.store.comments().delete(*comment_id).await?;
        }
        log::debug!("deleted comment #{} and {} replies", id, doomed.len() - 1);
        Ok(doomed.len())
    }

    async fn get_comment(&self, id: u64) -> Result<Comment> {
        match self.store.comments().get(id).await {
            Ok(comment) => Ok(comment),
            Err(StoreError::NotFound) => Err(ReactionError::CommentNotFound),
            Err(other) => Err(other.into()),
        }
    }

    // -- likes ------------------------------------------------------------

    /// Records a like. For a known user this is idempotent: liking twice
    /// returns the existing row. Anonymous likes are append-only events.
    pub async fn like(&self, item_id: u64, user: Option<u64>) -> Result<Like> {
        self.require_item(item_id).await?;
        let record = Like {
            id: 0,
            item_id,
            user,
            created_at: Utc::now(),
        };
        let Some(user_id) = user else {
            return Ok(self.store.likes().create(record).await?);
        };

        match self
            .store
            .likes()
            .insert_where(record, &move |l| {
                l.item_id == item_id && l.user == Some(user_id)
            })
            .await
        {
            Ok(saved) => Ok(saved),
            Err(StoreError::Conflict) => {
                let existing = self
                    .store
                    .likes()
                    .find(&move |l| l.item_id == item_id && l.user == Some(user_id))
                    .await?;
                existing
                    .into_iter()
                    .next()
                    .ok_or_else(|| StoreError::Internal("like vanished mid-upsert".into()).into())
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Removes a known user's like. Returns whether one existed.
    pub async fn unlike(&self, item_id: u64, user: u64) -> Result<bool> {
        let existing = self
            .store
            .likes()
            .find(&move |l| l.item_id == item_id && l.user == Some(user))
            .await?;
        let found = !existing.is_empty();
        for like in existing {
            self.store.likes().delete(like.id).await?;
        }
        Ok(found)
    }

    pub async fn like_count(&self, item_id: u64) -> Result<usize> {
        Ok(self
            .store
            .likes()
            .find(&move |l| l.item_id == item_id)
            .await?
            .len())
    }

    // -- rates ------------------------------------------------------------

    /// Records a star rating in `0..=5`. A known user's rating is an
    /// upsert; anonymous ratings accumulate.
    pub async fn rate(&self, item_id: u64, user: Option<u64>, rating: u8) -> Result<Rate> {
        if rating > 5 {
            return Err(ReactionError::RatingOutOfRange(rating));
        }
        self.require_item(item_id).await?;

        if let Some(user_id) = user {
            let existing = self
                .store
                .rates()
                .find(&move |r| r.item_id == item_id && r.user == Some(user_id))
                .await?;
            if let Some(mut rate) = existing.into_iter().next() {
                rate.rating = rating;
                return Ok(self.store.rates().update(rate).await?);
            }
        }
        Ok(self
            .store
            .rates()
            .create(Rate {
                id: 0,
                item_id,
                user,
                rating,
                created_at: Utc::now(),
            })
            .await?)
    }

    pub async fn rating_summary(&self, item_id: u64) -> Result<RatingSummary> {
        let rates = self
            .store
            .rates()
            .find(&move |r| r.item_id == item_id)
            .await?;
        let count = rates.len();
        let average = if count == 0 {
            0.0
        } else {
            rates.iter().map(|r| r.rating as f64).sum::<f64>() / count as f64
        };
        Ok(RatingSummary { count, average })
    }

    // -- reviews ----------------------------------------------------------

    pub async fn add_review(&self, item_id: u64, user: Option<u64>, text: &str) -> Result<Review> {
        if text.trim().is_empty() {
            return Err(ReactionError::EmptyReview);
        }
        self.require_item(item_id).await?;
        let now = Utc::now();
        Ok(self
            .store
            .reviews()
            .create(Review {
                id: 0,
                item_id,
                user,
                text: text.trim().to_string(),
                created_at: now,
                updated_at: now,
            })
            .await?)
    }

    pub async fn reviews_for(&self, item_id: u64) -> Result<Vec<Review>> {
        Ok(self
            .store
            .reviews()
            .find(&move |r| r.item_id == item_id)
            .await?)
    }

    // -- bookmarks --------------------------------------------------------

    /// Bookmarks an item for a user; at most one per (item, user).
    pub async fn bookmark(&self, item_id: u64, user: u64) -> Result<Bookmark> {
        self.require_item(item_id).await?;
        match self
            .store
            .bookmarks()
            .insert_where(
                Bookmark {
                    id: 0,
                    item_id,
                    user,
                    created_at: Utc::now(),
                },
                &move |b| b.item_id == item_id && b.user == user,
            )
            .await
        {
            Ok(saved) => Ok(saved),
            Err(StoreError::Conflict) => Err(ReactionError::AlreadyBookmarked),
            Err(other) => Err(other.into()),
        }
    }

    /// Removes a bookmark. Returns whether one existed.
    pub async fn remove_bookmark(&self, item_id: u64, user: u64) -> Result<bool> {
        let existing = self
            .store
            .bookmarks()
            .find(&move |b| b.item_id == item_id && b.user == user)
            .await?;
        let found = !existing.is_empty();
        for bookmark in existing {
            self.store.bookmarks().delete(bookmark.id).await?;
        }
        Ok(found)
    }

    pub async fn bookmarks_for_user(&self, user: u64) -> Result<Vec<Bookmark>> {
        Ok(self
            .store
            .bookmarks()
            .find(&move |b| b.user == user)
            .await?)
    }

    // -- views ------------------------------------------------------------

    pub async fn record_view(&self, item_id: u64, user: Option<u64>) -> Result<ItemViewEvent> {
        self.require_item(item_id).await?;
        Ok(self
            .store
            .item_views()
            .create(ItemViewEvent {
                id: 0,
                item_id,
                user,
                created_at: Utc::now(),
            })
            .await?)
    }

    pub async fn view_count(&self, item_id: u64) -> Result<usize> {
        Ok(self
            .store
            .item_views()
            .find(&move |v| v.item_id == item_id)
            .await?
            .len())
    }

    // -- search history ---------------------------------------------------

    /// Recording history is an explicit call, never a search side effect.
    pub async fn record_search(
        &self,
        user: Option<u64>,
        query: &str,
        item_id: Option<u64>,
    ) -> Result<SearchQuery> {
        if let Some(item_id) = item_id {
            self.require_item(item_id).await?;
        }
        Ok(self
            .store
            .search_queries()
            .create(SearchQuery {
                id: 0,
                user,
                query: query.to_string(),
                item_id,
                created_at: Utc::now(),
            })
            .await?)
    }

    /// A user's history, newest first.
    pub async fn search_history(&self, user: u64) -> Result<Vec<SearchQuery>> {
        let mut entries = self
            .store
            .search_queries()
            .find(&move |q| q.user == Some(user))
            .await?;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    /// Clears a user's history; returns how many entries were removed.
    pub async fn clear_search_history(&self, user: u64) -> Result<usize> {
        let entries = self
            .store
            .search_queries()
            .find(&move |q| q.user == Some(user))
            .await?;
        let count = entries.len();
        for entry in entries {
            self.store.search_queries().delete(entry.id).await?;
        }
        log::debug!("cleared {} history entries for user #{}", count, user);
        Ok(count)
    }

    // -- cascades ---------------------------------------------------------

    /// Deletes every reaction row referencing `item_id`. Called by the
    /// facade after an item is removed; returns the total rows deleted.
    pub async fn purge_item(&self, item_id: u64) -> Result<usize> {
        let mut removed = 0;
        for comment in self
            .store
            .comments()
            .find(&move |c| c.item_id == item_id)
            .await?
        {
            self.store.comments().delete(comment.id).await?;
            removed += 1;
        }
        for like in self
            .store
            .likes()
            .find(&move |l| l.item_id == item_id)
            .await?
        {
            self.store.likes().delete(like.id).await?;
            removed += 1;
        }
        for rate in self
            .store
            .rates()
            .find(&move |r| r.item_id == item_id)
            .await?
        {
            self.store.rates().delete(rate.id).await?;
            removed += 1;
        }
        for review in self
            .store
            .reviews()
            .find(&move |r| r.item_id == item_id)
            .await?
        {
            self.store.reviews().delete(review.id).await?;
            removed += 1;
        }
        for bookmark in self
            .store
            .bookmarks()
            .find(&move |b| b.item_id == item_id)
            .await?
        {
            self.store.bookmarks().delete(bookmark.id).await?;
            removed += 1;
        }
        for view in self
            .store
            .item_views()
            .find(&move |v| v.item_id == item_id)
            .await?
        {
            self.store.item_views().delete(view.id).await?;
            removed += 1;
        }
        // History keeps the query text but drops the dangling item link.
        for mut entry in self
            .store
            .search_queries()
            .find(&move |q| q.item_id == Some(item_id))
            .await?
        {
            entry.item_id = None;
            self.store.search_queries().update(entry).await?;
        }
        log::info!("purged {} reaction rows for item #{}", removed, item_id);
        Ok(removed)
    }

    async fn require_item(&self, item_id: u64) -> Result<()> {
        match self.store.items().get(item_id).await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound) => Err(ReactionError::ItemNotFound(item_id)),
            Err(other) => Err(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_model::{Item, Locale, LocalizedText};
    use catalog_store::MemoryStore;
    use pretty_assertions::assert_eq;

    struct Fixture {
        store: Arc<MemoryStore>,
        reactions: ReactionManager,
        item_id: u64,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let item = store
            .items()
            .create(Item {
                id: 0,
                title: LocalizedText::new().with(Locale::En, "Case"),
                slug: "case".to_string(),
                description: LocalizedText::new(),
                logo: None,
                category_id: 1,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        let reactions = ReactionManager::new(Arc::clone(&store) as Arc<dyn CatalogStore>);
        Fixture {
            store,
            reactions,
            item_id: item.id,
        }
    }

    #[tokio::test]
    async fn comments_thread_and_cascade() {
        let f = fixture().await;
        let root = f
            .reactions
            .add_comment(f.item_id, Some(1), "Great case", None)
            .await
            .unwrap();
        let reply = f
            .reactions
            .add_comment(f.item_id, Some(2), "Agreed", Some(root.id))
            .await
            .unwrap();
        f.reactions
            .add_comment(f.item_id, None, "Me too", Some(reply.id))
            .await
            .unwrap();

        let removed = f.reactions.delete_comment(root.id).await.unwrap();
        assert_eq!(removed, 3);
        assert!(f
            .reactions
            .comments_for(f.item_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn reply_must_share_the_item() {
        let f = fixture().await;
        let now = Utc::now();
        let other = f
            .store
            .items()
            .create(Item {
                id: 0,
                title: LocalizedText::new().with(Locale::En, "Charger"),
                slug: "charger".to_string(),
                description: LocalizedText::new(),
                logo: None,
                category_id: 1,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        let root = f
            .reactions
            .add_comment(f.item_id, None, "Nice", None)
            .await
            .unwrap();
        let cross = f
            .reactions
            .add_comment(other.id, None, "Reply", Some(root.id))
            .await;
        assert!(matches!(cross, Err(ReactionError::ParentMismatch)));
    }

    #[tokio::test]
    async fn likes_are_idempotent_per_user() {
        let f = fixture().await;
        let first = f.reactions.like(f.item_id, Some(1)).await.unwrap();
        let second = f.reactions.like(f.item_id, Some(1)).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(f.reactions.like_count(f.item_id).await.unwrap(), 1);

        // Anonymous likes accumulate.
        f.reactions.like(f.item_id, None).await.unwrap();
        f.reactions.like(f.item_id, None).await.unwrap();
        assert_eq!(f.reactions.like_count(f.item_id).await.unwrap(), 3);

        assert!(f.reactions.unlike(f.item_id, 1).await.unwrap());
        assert!(!f.reactions.unlike(f.item_id, 1).await.unwrap());
    }

    #[tokio::test]
    async fn rates_validate_and_upsert() {
        let f = fixture().await;
        assert!(matches!(
            f.reactions.rate(f.item_id, Some(1), 6).await,
            Err(ReactionError::RatingOutOfRange(6))
        ));

        f.reactions.rate(f.item_id, Some(1), 2).await.unwrap();
        f.reactions.rate(f.item_id, Some(1), 5).await.unwrap();
        f.reactions.rate(f.item_id, Some(2), 3).await.unwrap();

        let summary = f.reactions.rating_summary(f.item_id).await.unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average, 4.0);
    }

    #[tokio::test]
    async fn empty_summary_is_zeroed() {
        let f = fixture().await;
        let summary = f.reactions.rating_summary(f.item_id).await.unwrap();
        assert_eq!(summary, RatingSummary { count: 0, average: 0.0 });
    }

    #[tokio::test]
    async fn bookmarks_are_unique_and_removable() {
        let f = fixture().await;
        f.reactions.bookmark(f.item_id, 1).await.unwrap();
        assert!(matches!(
            f.reactions.bookmark(f.item_id, 1).await,
            Err(ReactionError::AlreadyBookmarked)
        ));
        assert_eq!(f.reactions.bookmarks_for_user(1).await.unwrap().len(), 1);
        assert!(f.reactions.remove_bookmark(f.item_id, 1).await.unwrap());
        assert!(!f.reactions.remove_bookmark(f.item_id, 1).await.unwrap());
    }

    #[tokio::test]
    async fn views_accumulate() {
        let f = fixture().await;
        f.reactions.record_view(f.item_id, Some(1)).await.unwrap();
        f.reactions.record_view(f.item_id, None).await.unwrap();
        assert_eq!(f.reactions.view_count(f.item_id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn history_lists_newest_first_and_clears_with_count() {
        let f = fixture().await;
        f.reactions
            .record_search(Some(1), "iphone", None)
            .await
            .unwrap();
        f.reactions
            .record_search(Some(1), "case", Some(f.item_id))
            .await
            .unwrap();
        f.reactions
            .record_search(Some(2), "other", None)
            .await
            .unwrap();

        let history = f.reactions.search_history(1).await.unwrap();
        let queries: Vec<&str> = history.iter().map(|h| h.query.as_str()).collect();
        assert_eq!(queries, vec!["case", "iphone"]);

        assert_eq!(f.reactions.clear_search_history(1).await.unwrap(), 2);
        assert!(f.reactions.search_history(1).await.unwrap().is_empty());
        assert_eq!(f.reactions.search_history(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn purge_removes_every_reaction_row() {
        let f = fixture().await;
        f.reactions
            .add_comment(f.item_id, Some(1), "Nice", None)
            .await
            .unwrap();
        f.reactions.like(f.item_id, Some(1)).await.unwrap();
        f.reactions.rate(f.item_id, Some(1), 4).await.unwrap();
        f.reactions
            .add_review(f.item_id, Some(1), "Solid")
            .await
            .unwrap();
        f.reactions.bookmark(f.item_id, 1).await.unwrap();
        f.reactions.record_view(f.item_id, None).await.unwrap();
        f.reactions
            .record_search(Some(1), "case", Some(f.item_id))
            .await
            .unwrap();

        let removed = f.reactions.purge_item(f.item_id).await.unwrap();
        assert_eq!(removed, 6);

        // History survives with the item link dropped.
        let history = f.reactions.search_history(1).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].item_id, None);
    }

    #[tokio::test]
    async fn writes_against_missing_items_fail() {
        let f = fixture().await;
        assert!(matches!(
            f.reactions.like(999, Some(1)).await,
            Err(ReactionError::ItemNotFound(999))
        ));
        assert!(matches!(
            f.reactions.add_comment(999, None, "hi", None).await,
            Err(ReactionError::ItemNotFound(999))
        ));
    }
}
