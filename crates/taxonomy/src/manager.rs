use crate::error::{Result, TaxonomyError};
use crate::types::{CategoryDraft, CategoryFilter, CategoryNode, CategoryPatch};
use catalog_model::{Category, Locale};
use catalog_store::{CatalogStore, StoreError};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Highest allowed category level; the tree holds at most three levels
/// (0, 1, 2).
pub const MAX_LEVEL: u8 = 2;

/// Suffix attempts before a slug write gives up. Each attempt is a
/// conditional store write, so exhaustion means something is persistently
/// racing us over hundreds of candidates.
const SLUG_ATTEMPTS: u32 = 1000;

/// Maintains the category hierarchy: computed levels, unique slugs, and
/// the traversal queries the HTTP layer renders from.
pub struct CategoryManager {
    store: Arc<dyn CatalogStore>,
}

impl CategoryManager {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Creates a category under `draft.parent_id` (or as a root). Level is
    /// `parent.level + 1`, slug is derived from the first non-empty
    /// localized title and suffixed until unique.
    pub async fn create(&self, draft: CategoryDraft) -> Result<Category> {
        if draft.title.is_blank() {
            return Err(TaxonomyError::EmptyTitle);
        }

        let level = match draft.parent_id {
            Some(parent_id) => {
                let parent = self.get(parent_id).await?;
                if parent.level >= MAX_LEVEL {
                    return Err(TaxonomyError::DepthExceeded(parent.level + 1));
                }
                parent.level + 1
            }
            None => 0,
        };

        let now = Utc::now();
        let record = Category {
            id: 0,
            title: draft.title,
            slug: String::new(),
            parent_id: draft.parent_id,
            level,
            created_at: now,
            updated_at: now,
        };
        let saved = self.write_with_unique_slug(record, false).await?;
        log::info!(
            "created category #{} '{}' at level {}",
            saved.id,
            saved.slug,
            saved.level
        );
        Ok(saved)
    }

    /// Applies a partial update. Reparenting revalidates depth for the
    /// whole moved subtree and renumbers every descendant; the slug is
    /// regenerated only when the patch touches the title.
    pub async fn update(&self, id: u64, patch: CategoryPatch) -> Result<Category> {
        let mut record = self.get(id).await?;
        let old_level = record.level;

        let new_parent = patch.parent_id.unwrap_or(record.parent_id);
        if new_parent != record.parent_id {
            record.level = self.validate_reparent(&record, new_parent).await?;
            record.parent_id = new_parent;
        }

        let retitled = match patch.title {
            Some(title) => {
                if title.is_blank() {
                    return Err(TaxonomyError::EmptyTitle);
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
            self.store.categories().update(record).await?
        };

        if saved.level != old_level {
            self.renumber_descendants(saved.id, saved.level as i16 - old_level as i16)
                .await?;
        }
        log::info!("updated category #{} '{}'", saved.id, saved.slug);
        Ok(saved)
    }

    /// Deletes the category and its whole subtree, children before parents.
    /// Returns every removed id (the subtree in pre-order, root first) so
    /// the caller can cascade item deletion.
    pub async fn delete(&self, id: u64) -> Result<Vec<u64>> {
        let root = self.get(id).await?;
        let mut removed = vec![root.id];
        removed.extend(self.descendants(id).await?.iter().map(|c| c.id));

        for category_id in removed.iter().rev() {
            self.store.categories().delete(*category_id).await?;
        }
        log::info!(
            "deleted category #{} and {} descendants",
            id,
            removed.len() - 1
        );
        Ok(removed)
    }

    pub async fn get(&self, id: u64) -> Result<Category> {
        match self.store.categories().get(id).await {
            Ok(category) => Ok(category),
            Err(StoreError::NotFound) => Err(TaxonomyError::NotFound),
            Err(other) => Err(other.into()),
        }
    }

    /// Canonical slug lookup; slugs are globally unique so this is at most
    /// one hit.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Category> {
        self.store
            .categories()
            .find(&|c| c.slug == slug)
            .await?
            .into_iter()
            .next()
            .ok_or(TaxonomyError::NotFound)
    }

    /// Flat list with optional level / parent filters, ascending by id.
    pub async fn list(&self, filter: CategoryFilter) -> Result<Vec<Category>> {
        Ok(self
            .store
            .categories()
            .find(&move |c| {
                filter.level.map_or(true, |level| c.level == level)
                    && filter.parent_id.map_or(true, |parent| c.parent_id == parent)
            })
            .await?)
    }

    /// Case-insensitive substring match against the title resolved for
    /// `locale`.
    pub async fn search_titles(&self, fragment: &str, locale: Locale) -> Result<Vec<Category>> {
        let needle = fragment.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .store
            .categories()
            .find(&move |c| {
                c.title
                    .resolve(locale)
                    .is_some_and(|title| title.to_lowercase().contains(&needle))
            })
            .await?)
    }

    /// Chain of parents, root first. Its length always equals the
    /// category's level. The visited set is a defensive bound; writes
    /// reject cycles, so it should never trip on healthy data.
    pub async fn ancestors(&self, id: u64) -> Result<Vec<Category>> {
        let mut current = self.get(id).await?;
        let mut chain = Vec::new();
        let mut visited = HashSet::from([id]);
        while let Some(parent_id) = current.parent_id {
            if !visited.insert(parent_id) {
                break;
            }
            current = self.get(parent_id).await?;
            chain.push(current.clone());
        }
        chain.reverse();
        Ok(chain)
    }

    /// Every category whose ancestor chain includes `id`, in pre-order.
    /// Built from one bulk fetch and an in-memory adjacency map.
    pub async fn descendants(&self, id: u64) -> Result<Vec<Category>> {
        self.get(id).await?;
        let children = self.children_index().await?;
        let mut out = Vec::new();
        let mut visited = HashSet::from([id]);
        collect_preorder(id, &children, &mut visited, &mut out);
        Ok(out)
    }

    /// Direct children, ascending by id.
    pub async fn children_of(&self, id: u64) -> Result<Vec<Category>> {
        self.get(id).await?;
        Ok(self
            .store
            .categories()
            .find(&move |c| c.parent_id == Some(id))
            .await?)
    }

    pub async fn roots(&self) -> Result<Vec<Category>> {
        Ok(self
            .store
            .categories()
            .find(&|c| c.parent_id.is_none())
            .await?)
    }

    /// Categories no other category points at as parent.
    pub async fn leaves(&self) -> Result<Vec<Category>> {
        let all = self.store.categories().list().await?;
        let parents: HashSet<u64> = all.iter().filter_map(|c| c.parent_id).collect();
        Ok(all.into_iter().filter(|c| !parents.contains(&c.id)).collect())
    }

    pub async fn is_leaf(&self, id: u64) -> Result<bool> {
        Ok(self.children_of(id).await?.is_empty())
    }

    /// Nested tree from `root` (or all roots), children eagerly resolved.
    /// Depth is bounded by the level cap, so the result is at most three
    /// levels deep.
    pub async fn tree(&self, root: Option<u64>) -> Result<Vec<CategoryNode>> {
        let children = self.children_index().await?;
        let tops = match root {
            Some(id) => vec![self.get(id).await?],
            None => self.roots().await?,
        };
        let mut visited: HashSet<u64> = tops.iter().map(|c| c.id).collect();
        Ok(tops
            .into_iter()
            .map(|category| build_node(category, &children, &mut visited))
            .collect())
    }

    /// Validates a parent change and returns the level the category would
    /// land on. Rejects self-parenting, cycles through the category's own
    /// subtree, and any move that would push the deepest descendant past
    /// the level cap.
    async fn validate_reparent(&self, record: &Category, new_parent: Option<u64>) -> Result<u8> {
        let subtree = self.descendants(record.id).await?;
        let new_level = match new_parent {
            Some(parent_id) => {
                if parent_id == record.id {
                    return Err(TaxonomyError::SelfParent);
                }
                if subtree.iter().any(|c| c.id == parent_id) {
                    return Err(TaxonomyError::CycleDetected(parent_id));
                }
                let parent = self.get(parent_id).await?;
                if parent.level >= MAX_LEVEL {
                    return Err(TaxonomyError::DepthExceeded(parent.level + 1));
                }
                parent.level + 1
            }
            None => 0,
        };

        let height = subtree
            .iter()
            .map(|c| c.level - record.level)
            .max()
            .unwrap_or(0);
        if new_level + height > MAX_LEVEL {
            return Err(TaxonomyError::DepthExceeded(new_level + height));
        }
        Ok(new_level)
    }

    /// Shifts every descendant's level by `delta` after a reparent. Depth
    /// was validated before the move, so the new levels stay in range.
    async fn renumber_descendants(&self, id: u64, delta: i16) -> Result<()> {
        for mut descendant in self.descendants(id).await? {
            descendant.level = (descendant.level as i16 + delta) as u8;
            self.store.categories().update(descendant).await?;
        }
        Ok(())
    }

    /// Persists `record` under the first free slug candidate: the base
    /// slug, then `base-1`, `base-2`, … Each attempt is a conditional
    /// store write, so two writers racing over the same title cannot both
    /// claim a candidate; the loser's retry lands on the next suffix.
    async fn write_with_unique_slug(&self, mut record: Category, update: bool) -> Result<Category> {
        let source = record.title.first().unwrap_or_default().to_string();
        let base = catalog_slug::slug_source(&source);
        if base.is_empty() {
            return Err(TaxonomyError::UnsluggableTitle(source));
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
                    .categories()
                    .update_where(record.clone(), &|c| c.slug == candidate && c.id != self_id)
                    .await
            } else {
                self.store
                    .categories()
                    .insert_where(record.clone(), &|c| c.slug == candidate)
                    .await
            };
            match result {
                Ok(saved) => return Ok(saved),
                Err(StoreError::Conflict) => continue,
                Err(other) => return Err(other.into()),
            }
        }
        Err(TaxonomyError::SlugExhausted(base))
    }

    /// Bulk-fetches all categories into a parent → children adjacency map.
    async fn children_index(&self) -> Result<HashMap<u64, Vec<Category>>> {
        let mut index: HashMap<u64, Vec<Category>> = HashMap::new();
        for category in self.store.categories().list().await? {
            if let Some(parent_id) = category.parent_id {
                index.entry(parent_id).or_default().push(category);
            }
        }
        Ok(index)
    }
}

fn collect_preorder(
    id: u64,
    children: &HashMap<u64, Vec<Category>>,
    visited: &mut HashSet<u64>,
    out: &mut Vec<Category>,
) {
    let Some(kids) = children.get(&id) else {
        return;
    };
    for kid in kids {
        if !visited.insert(kid.id) {
            continue;
        }
        out.push(kid.clone());
        collect_preorder(kid.id, children, visited, out);
    }
}

fn build_node(
    category: Category,
    children: &HashMap<u64, Vec<Category>>,
    visited: &mut HashSet<u64>,
) -> CategoryNode {
    let kids = children
        .get(&category.id)
        .map(|kids| {
            let mut nodes = Vec::new();
            for kid in kids {
                if visited.insert(kid.id) {
                    nodes.push(build_node(kid.clone(), children, visited));
                }
            }
            nodes
        })
        .unwrap_or_default();
    CategoryNode {
        category,
        children: kids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_model::LocalizedText;
    use catalog_store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn localized(en: &str) -> LocalizedText {
        LocalizedText::new().with(Locale::En, en)
    }

    fn manager() -> CategoryManager {
        CategoryManager::new(Arc::new(MemoryStore::new()))
    }

    fn draft(title: &str, parent_id: Option<u64>) -> CategoryDraft {
        CategoryDraft {
            title: localized(title),
            parent_id,
        }
    }

    async fn chain(manager: &CategoryManager) -> (Category, Category, Category) {
        let root = manager.create(draft("Electronics", None)).await.unwrap();
        let mid = manager
            .create(draft("Phones", Some(root.id)))
            .await
            .unwrap();
        let leaf = manager
            .create(draft("Accessories", Some(mid.id)))
            .await
            .unwrap();
        (root, mid, leaf)
    }

    #[tokio::test]
    async fn levels_follow_parents() {
        let manager = manager();
        let (root, mid, leaf) = chain(&manager).await;
        assert_eq!(root.level, 0);
        assert_eq!(mid.level, 1);
        assert_eq!(leaf.level, 2);
    }

    #[tokio::test]
    async fn depth_is_capped_at_three_levels() {
        let manager = manager();
        let (_, _, leaf) = chain(&manager).await;
        let too_deep = manager.create(draft("Cables", Some(leaf.id))).await;
        assert!(matches!(too_deep, Err(TaxonomyError::DepthExceeded(3))));
    }

    #[tokio::test]
    async fn identical_titles_get_suffixed_slugs() {
        let manager = manager();
        let first = manager.create(draft("Phones", None)).await.unwrap();
        let second = manager.create(draft("Phones", None)).await.unwrap();
        let third = manager.create(draft("Phones", None)).await.unwrap();
        assert_eq!(first.slug, "phones");
        assert_eq!(second.slug, "phones-1");
        assert_eq!(third.slug, "phones-2");
    }

    #[tokio::test]
    async fn resaving_same_title_keeps_the_slug() {
        let manager = manager();
        let created = manager.create(draft("Phones", None)).await.unwrap();
        let resaved = manager
            .update(
                created.id,
                CategoryPatch {
                    title: Some(localized("Phones")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(resaved.slug, "phones");
    }

    #[tokio::test]
    async fn cyrillic_titles_transliterate_into_slugs() {
        let manager = manager();
        let created = manager
            .create(CategoryDraft {
                title: LocalizedText::new().with(Locale::Ru, "Телефоны"),
                parent_id: None,
            })
            .await
            .unwrap();
        assert_eq!(created.slug, "telefony");
    }

    #[tokio::test]
    async fn parent_only_update_does_not_touch_the_slug() {
        let manager = manager();
        let root = manager.create(draft("Electronics", None)).await.unwrap();
        let child = manager.create(draft("Phones", None)).await.unwrap();
        let moved = manager
            .update(
                child.id,
                CategoryPatch {
                    parent_id: Some(Some(root.id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.slug, "phones");
        assert_eq!(moved.level, 1);
    }

    #[tokio::test]
    async fn ancestors_run_root_first_and_match_level() {
        let manager = manager();
        let (root, mid, leaf) = chain(&manager).await;
        let ancestors = manager.ancestors(leaf.id).await.unwrap();
        let ids: Vec<u64> = ancestors.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![root.id, mid.id]);
        assert_eq!(ancestors.len(), leaf.level as usize);
        assert!(manager.ancestors(root.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn descendants_cover_the_whole_subtree_preorder() {
        let manager = manager();
        let root = manager.create(draft("Electronics", None)).await.unwrap();
        let phones = manager
            .create(draft("Phones", Some(root.id)))
            .await
            .unwrap();
        let audio = manager.create(draft("Audio", Some(root.id))).await.unwrap();
        let cases = manager
            .create(draft("Cases", Some(phones.id)))
            .await
            .unwrap();

        let ids: Vec<u64> = manager
            .descendants(root.id)
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![phones.id, cases.id, audio.id]);
        assert!(manager.descendants(cases.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn self_parenting_is_rejected() {
        let manager = manager();
        let created = manager.create(draft("Phones", None)).await.unwrap();
        let result = manager
            .update(
                created.id,
                CategoryPatch {
                    parent_id: Some(Some(created.id)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(TaxonomyError::SelfParent)));
    }

    #[tokio::test]
    async fn indirect_cycles_are_rejected() {
        let manager = manager();
        let (root, _, leaf) = chain(&manager).await;
        let result = manager
            .update(
                root.id,
                CategoryPatch {
                    parent_id: Some(Some(leaf.id)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(TaxonomyError::CycleDetected(_))));
    }

    #[tokio::test]
    async fn reparenting_renumbers_descendants() {
        let manager = manager();
        let old_root = manager.create(draft("Old", None)).await.unwrap();
        let mover = manager
            .create(draft("Mover", Some(old_root.id)))
            .await
            .unwrap();
        let child = manager
            .create(draft("Child", Some(mover.id)))
            .await
            .unwrap();

        // Detach the mover; it and its child shift up one level.
        manager
            .update(
                mover.id,
                CategoryPatch {
                    parent_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(manager.get(mover.id).await.unwrap().level, 0);
        assert_eq!(manager.get(child.id).await.unwrap().level, 1);
    }

    #[tokio::test]
    async fn reparenting_rejects_moves_that_overflow_the_cap() {
        let manager = manager();
        let (_, mid, _) = chain(&manager).await;
        // `mid` carries a child at level 2; putting it under another
        // level-1 node would push that child to level 3.
        let other_root = manager.create(draft("Other", None)).await.unwrap();
        let other_mid = manager
            .create(draft("Other Mid", Some(other_root.id)))
            .await
            .unwrap();
        let result = manager
            .update(
                mid.id,
                CategoryPatch {
                    parent_id: Some(Some(other_mid.id)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(TaxonomyError::DepthExceeded(3))));
        // Nothing moved.
        assert_eq!(manager.get(mid.id).await.unwrap().level, 1);
    }

    #[tokio::test]
    async fn tree_nests_children_to_depth_three() {
        let manager = manager();
        let (root, mid, leaf) = chain(&manager).await;
        let tree = manager.tree(None).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].category.id, root.id);
        assert_eq!(tree[0].children[0].category.id, mid.id);
        assert_eq!(tree[0].children[0].children[0].category.id, leaf.id);

        let subtree = manager.tree(Some(mid.id)).await.unwrap();
        assert_eq!(subtree[0].category.id, mid.id);
        assert_eq!(subtree[0].children[0].category.id, leaf.id);
    }

    #[tokio::test]
    async fn roots_leaves_and_predicates() {
        let manager = manager();
        let (root, mid, leaf) = chain(&manager).await;
        let lone = manager.create(draft("Lone", None)).await.unwrap();

        let root_ids: Vec<u64> = manager.roots().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(root_ids, vec![root.id, lone.id]);

        let leaf_ids: Vec<u64> = manager
            .leaves()
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(leaf_ids, vec![leaf.id, lone.id]);

        assert!(!manager.is_leaf(mid.id).await.unwrap());
        assert!(manager.is_leaf(leaf.id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_the_subtree_and_reports_ids() {
        let manager = manager();
        let (root, mid, leaf) = chain(&manager).await;
        let removed = manager.delete(root.id).await.unwrap();
        assert_eq!(removed, vec![root.id, mid.id, leaf.id]);
        assert!(matches!(
            manager.get(mid.id).await,
            Err(TaxonomyError::NotFound)
        ));
    }

    #[tokio::test]
    async fn slug_lookup_and_misses() {
        let manager = manager();
        let created = manager.create(draft("Phones", None)).await.unwrap();
        assert_eq!(manager.get_by_slug("phones").await.unwrap().id, created.id);
        assert!(matches!(
            manager.get_by_slug("missing").await,
            Err(TaxonomyError::NotFound)
        ));
    }

    #[tokio::test]
    async fn list_filters_by_level_and_parent() {
        let manager = manager();
        let (root, mid, _) = chain(&manager).await;

        let level_one = manager
            .list(CategoryFilter {
                level: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(level_one.len(), 1);
        assert_eq!(level_one[0].id, mid.id);

        let children = manager
            .list(CategoryFilter {
                parent_id: Some(Some(root.id)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, mid.id);
    }

    #[tokio::test]
    async fn title_search_is_case_insensitive() {
        let manager = manager();
        chain(&manager).await;
        let hits = manager.search_titles("PHON", Locale::En).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slug, "phones");
        assert!(manager
            .search_titles("  ", Locale::En)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn blank_titles_are_rejected() {
        let manager = manager();
        let result = manager.create(draft("   ", None)).await;
        assert!(matches!(result, Err(TaxonomyError::EmptyTitle)));
    }

    #[tokio::test]
    async fn concurrent_creations_land_on_distinct_slugs() {
        let manager = Arc::new(CategoryManager::new(Arc::new(MemoryStore::new())));
        let a = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move { manager.create(draft("Phones", None)).await }
        });
        let b = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move { manager.create(draft("Phones", None)).await }
        });
        let first = a.await.unwrap().unwrap();
        let second = b.await.unwrap().unwrap();

        let mut slugs = vec![first.slug, second.slug];
        slugs.sort();
        assert_eq!(slugs, vec!["phones".to_string(), "phones-1".to_string()]);
    }
}
