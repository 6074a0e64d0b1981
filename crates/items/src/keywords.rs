use crate::error::{ItemsError, Result};
use catalog_model::Keyword;
use catalog_store::{CatalogStore, StoreError};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

/// Keyword vocabulary. Names are stored Unicode-lowercased and are unique
/// on that form, which is also what the search engine matches tokens
/// against.
pub struct KeywordManager {
    store: Arc<dyn CatalogStore>,
}

impl KeywordManager {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Creates a keyword from `name`, lowercasing it first. Duplicate
    /// names (after folding) are a conflict.
    pub async fn create(&self, name: &str) -> Result<Keyword> {
        let normalized = name.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ItemsError::EmptyKeyword);
        }

        // Keyword slugs share the catalog-wide slug rule; the scope here is
        // the keyword table.
        let taken: HashSet<String> = self
            .store
            .keywords()
            .list()
            .await?
            .into_iter()
            .filter_map(|k| k.slug)
            .collect();
        let slug = catalog_slug::generate_unique_slug(&normalized, |candidate| {
            taken.contains(candidate)
        });

        let now = Utc::now();
        let record = Keyword {
            id: 0,
            name: normalized.clone(),
            slug: (!slug.is_empty()).then_some(slug),
            created_at: now,
            updated_at: now,
        };
        match self
            .store
            .keywords()
            .insert_where(record, &move |k| k.name == normalized)
            .await
        {
            Ok(saved) => {
                log::info!("created keyword #{} '{}'", saved.id, saved.name);
                Ok(saved)
            }
            Err(StoreError::Conflict) => Err(ItemsError::DuplicateKeyword(name.trim().to_string())),
            Err(other) => Err(other.into()),
        }
    }

    pub async fn get(&self, id: u64) -> Result<Keyword> {
        match self.store.keywords().get(id).await {
            Ok(keyword) => Ok(keyword),
            Err(StoreError::NotFound) => Err(ItemsError::KeywordNotFound),
            Err(other) => Err(other.into()),
        }
    }

    /// Exact lookup on the lowercased name.
    pub async fn get_by_name(&self, name: &str) -> Result<Keyword> {
        let normalized = name.trim().to_lowercase();
        self.store
            .keywords()
            .find(&move |k| k.name == normalized)
            .await?
            .into_iter()
            .next()
            .ok_or(ItemsError::KeywordNotFound)
    }

    pub async fn list(&self) -> Result<Vec<Keyword>> {
        Ok(self.store.keywords().list().await?)
    }

    /// Removes the keyword and any edges pointing at it.
    pub async fn delete(&self, id: u64) -> Result<()> {
        self.get(id).await?;
        for edge in self
            .store
            .item_keywords()
            .find(&move |e| e.keyword_id == id)
            .await?
        {
            self.store.item_keywords().delete(edge.id).await?;
        }
        self.store.keywords().delete(id).await?;
        log::info!("deleted keyword #{}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn manager() -> KeywordManager {
        KeywordManager::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn names_are_lowercased_and_unique() {
        let keywords = manager();
        let created = keywords.create("  iPhone ").await.unwrap();
        assert_eq!(created.name, "iphone");
        assert_eq!(created.slug.as_deref(), Some("iphone"));

        let dup = keywords.create("IPHONE").await;
        assert!(matches!(dup, Err(ItemsError::DuplicateKeyword(_))));
    }

    #[tokio::test]
    async fn cyrillic_names_fold_consistently() {
        let keywords = manager();
        let created = keywords.create("Чехол").await.unwrap();
        assert_eq!(created.name, "чехол");
        assert_eq!(created.slug.as_deref(), Some("chekhol"));
        assert_eq!(keywords.get_by_name("ЧЕХОЛ").await.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let keywords = manager();
        assert!(matches!(
            keywords.create("   ").await,
            Err(ItemsError::EmptyKeyword)
        ));
    }

    #[tokio::test]
    async fn colliding_slugs_get_suffixes() {
        let keywords = manager();
        let spaced = keywords.create("phone case").await.unwrap();
        let dashed = keywords.create("phone-case").await.unwrap();
        assert_eq!(spaced.slug.as_deref(), Some("phone-case"));
        assert_eq!(dashed.slug.as_deref(), Some("phone-case-1"));
    }

    #[tokio::test]
    async fn delete_removes_dangling_edges() {
        let store = Arc::new(MemoryStore::new());
        let keywords = KeywordManager::new(Arc::clone(&store) as Arc<dyn CatalogStore>);
        let created = keywords.create("case").await.unwrap();
        store
            .item_keywords()
            .create(catalog_model::ItemKeyword {
                id: 0,
                item_id: 7,
                keyword_id: created.id,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        keywords.delete(created.id).await.unwrap();
        assert!(store.item_keywords().list().await.unwrap().is_empty());
    }
}
