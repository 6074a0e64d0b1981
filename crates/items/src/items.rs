use crate::error::{ItemsError, Result};
use catalog_model::{Item, ItemKeyword, Keyword, LocalizedText};
use catalog_store::{CatalogStore, StoreError};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

const SLUG_ATTEMPTS: u32 = 1000;

/// Input for a new item. The category must already exist.
#[derive(Debug, Clone, Default)]
pub struct ItemDraft {
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub logo: Option<String>,
    pub category_id: u64,
}

/// Partial item update. `logo: Some(None)` clears the logo reference.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub title: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub logo: Option<Option<String>>,
    pub category_id: Option<u64>,
}

/// Item lifecycle and the item/keyword edge table.
pub struct ItemManager {
    store: Arc<dyn CatalogStore>,
}

impl ItemManager {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: ItemDraft) -> Result<Item> {
        if draft.title.is_blank() {
            return Err(ItemsError::EmptyTitle);
        }
        self.require_category(draft.category_id).await?;

        let now = Utc::now();
        let record = Item {
            id: 0,
            title: draft.title,
            slug: String::new(),
            description: draft.description,
            logo: draft.logo,
            category_id: draft.category_id,
            created_at: now,
            updated_at: now,
        };
        let saved = self.write_with_unique_slug(record, false).await?;
        log::info!("created item #{} '{}'", saved.id, saved.slug);
        Ok(saved)
    }

    /// Applies a partial update. The slug is regenerated only when the
    /// patch touches the title.
    pub async fn update(&self, id: u64, patch: ItemPatch) -> Result<Item> {
        let mut record = self.get(id).await?;

        if let Some(category_id) = patch.category_id {
            self.require_category(category_id).await?;
            record.category_id = category_id;
        }
        if let Some(description) = patch.description {
            record.description = description;
        }
        if let Some(logo) = patch.logo {
            record.logo = logo;
        }
        let retitled = match patch.title {
            Some(title) => {
                if title.is_blank() {
                    return Err(ItemsError::EmptyTitle);
                }
                record.title = title;
                true
            }
            None => false,
        };

        record.updated_at = Utc::now();
        let saved = if retitled {
            self.write_with_unique_slug(record, true).await?
        } else {
            self.store.items().update(record).await?
        };
        log::info!("updated item #{} '{}'", saved.id, saved.slug);
        Ok(saved)
    }

    /// Deletes the item and all of its keyword edges. Returns the id so
    /// the caller can purge dependent reaction records.
    pub async fn delete(&self, id: u64) -> Result<u64> {
        self.get(id).await?;
        for edge in self
            .store
            .item_keywords()
            .find(&move |e| e.item_id == id)
            .await?
        {
            self.store.item_keywords().delete(edge.id).await?;
        }
        self.store.items().delete(id).await?;
        log::info!("deleted item #{}", id);
        Ok(id)
    }

    /// Bulk cascade used when a category subtree is deleted. Returns the
    /// ids of every removed item.
    pub async fn delete_in_categories(&self, category_ids: &[u64]) -> Result<Vec<u64>> {
        let wanted: HashSet<u64> = category_ids.iter().copied().collect();
        let doomed = self
            .store
            .items()
            .find(&move |item| wanted.contains(&item.category_id))
            .await?;
        let mut removed = Vec::with_capacity(doomed.len());
        for item in doomed {
            removed.push(self.delete(item.id).await?);
        }
        Ok(removed)
    }

    pub async fn get(&self, id: u64) -> Result<Item> {
        match self.store.items().get(id).await {
            Ok(item) => Ok(item),
            Err(StoreError::NotFound) => Err(ItemsError::ItemNotFound),
            Err(other) => Err(other.into()),
        }
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Item> {
        self.store
            .items()
            .find(&|item| item.slug == slug)
            .await?
            .into_iter()
            .next()
            .ok_or(ItemsError::ItemNotFound)
    }

    pub async fn list_in_category(&self, category_id: u64) -> Result<Vec<Item>> {
        Ok(self
            .store
            .items()
            .find(&move |item| item.category_id == category_id)
            .await?)
    }

    /// Creates the (item, keyword) edge. Both ends must exist and the pair
    /// must be new.
    pub async fn attach_keyword(&self, item_id: u64, keyword_id: u64) -> Result<ItemKeyword> {
        self.get(item_id).await?;
        match self.store.keywords().get(keyword_id).await {
            Ok(_) => {}
            Err(StoreError::NotFound) => return Err(ItemsError::KeywordNotFound),
            Err(other) => return Err(other.into()),
        }

        let edge = ItemKeyword {
            id: 0,
            item_id,
            keyword_id,
            created_at: Utc::now(),
        };
        match self
            .store
            .item_keywords()
            .insert_where(edge, &move |e| {
                e.item_id == item_id && e.keyword_id == keyword_id
            })
            .await
        {
            Ok(saved) => {
                log::debug!("attached keyword #{} to item #{}", keyword_id, item_id);
                Ok(saved)
            }
            Err(StoreError::Conflict) => Err(ItemsError::AlreadyAttached),
            Err(other) => Err(other.into()),
        }
    }

    pub async fn detach_keyword(&self, item_id: u64, keyword_id: u64) -> Result<()> {
        let edge = self
            .store
            .item_keywords()
            .find(&move |e| e.item_id == item_id && e.keyword_id == keyword_id)
            .await?
            .into_iter()
            .next()
            .ok_or(ItemsError::NotAttached)?;
        self.store.item_keywords().delete(edge.id).await?;
        log::debug!("detached keyword #{} from item #{}", keyword_id, item_id);
        Ok(())
    }

    /// Keywords linked to an item, in attachment order.
    pub async fn keywords_for(&self, item_id: u64) -> Result<Vec<Keyword>> {
        self.get(item_id).await?;
        let edges = self
            .store
            .item_keywords()
            .find(&move |e| e.item_id == item_id)
            .await?;
        let mut keywords = Vec::with_capacity(edges.len());
        for edge in edges {
            keywords.push(self.store.keywords().get(edge.keyword_id).await?);
        }
        Ok(keywords)
    }

    pub async fn items_for_keyword(&self, keyword_id: u64) -> Result<Vec<Item>> {
        let edges = self
            .store
            .item_keywords()
            .find(&move |e| e.keyword_id == keyword_id)
            .await?;
        let ids: HashSet<u64> = edges.iter().map(|e| e.item_id).collect();
        Ok(self
            .store
            .items()
            .find(&move |item| ids.contains(&item.id))
            .await?)
    }

    async fn require_category(&self, category_id: u64) -> Result<()> {
        match self.store.categories().get(category_id).await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound) => Err(ItemsError::CategoryNotFound(category_id)),
            Err(other) => Err(other.into()),
        }
    }

    async fn write_with_unique_slug(&self, mut record: Item, update: bool) -> Result<Item> {
        let source = record.title.first().unwrap_or_default().to_string();
        let base = catalog_slug::slug_source(&source);
        if base.is_empty() {
            return Err(ItemsError::UnsluggableTitle(source));
        }

        let self_id = record.id;
        for attempt in 0..SLUG_ATTEMPTS {
            let candidate = if attempt == 0 {
                base.clone()
            } else {
                format!("{base}-{attempt}")
            };
            record.slug = candidate.clone();
            let result = if update {
                self.store
                    .items()
                    .update_where(record.clone(), &|i| i.slug == candidate && i.id != self_id)
                    .await
            } else {
                self.store
                    .items()
                    .insert_where(record.clone(), &|i| i.slug == candidate)
                    .await
            };
            match result {
                Ok(saved) => return Ok(saved),
                Err(StoreError::Conflict) => continue,
                Err(other) => return Err(other.into()),
            }
        }
        Err(ItemsError::SlugExhausted(base))
    }
}
