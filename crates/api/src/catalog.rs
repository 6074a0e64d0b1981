use crate::config::CatalogConfig;
use crate::error::ApiResult;
use crate::views::{CategoryDetailView, CategoryTreeNode, CategoryView, ItemView, SearchView};
use catalog_items::{ItemDraft, ItemManager, ItemPatch, KeywordManager};
use catalog_model::{
    Bookmark, Category, Comment, Item, ItemKeyword, Keyword, Like, Locale, Rate, Review,
    SearchQuery,
};
use catalog_reactions::{RatingSummary, ReactionManager};
use catalog_search::{SearchEngine, SearchRequest, TextIndex};
use catalog_store::{CatalogStore, MemoryStore};
use catalog_taxonomy::{CategoryDraft, CategoryFilter, CategoryManager, CategoryNode, CategoryPatch};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// What a cascading delete removed, for audit logging at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CascadeReport {
    pub categories: Vec<u64>,
    pub items: Vec<u64>,
    pub reactions: usize,
}

/// The catalog core behind one handle. Owns every manager over a shared
/// store; all methods are per-request and safe to call concurrently.
pub struct Catalog {
    store: Arc<dyn CatalogStore>,
    config: CatalogConfig,
    categories: CategoryManager,
    items: ItemManager,
    keywords: KeywordManager,
    engine: SearchEngine,
    reactions: ReactionManager,
}

impl Catalog {
    pub fn new(store: Arc<dyn CatalogStore>, config: CatalogConfig) -> Self {
        Self {
            categories: CategoryManager::new(Arc::clone(&store)),
            items: ItemManager::new(Arc::clone(&store)),
            keywords: KeywordManager::new(Arc::clone(&store)),
            engine: SearchEngine::new(Arc::clone(&store)),
            reactions: ReactionManager::new(Arc::clone(&store)),
            store,
            config,
        }
    }

    /// Catalog over a fresh in-memory store.
    pub fn in_memory(config: CatalogConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), config)
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    fn locale(&self, requested: Option<Locale>) -> Locale {
        requested.unwrap_or(self.config.default_locale)
    }

    // -- search -----------------------------------------------------------

    /// Free-text item search. The limit falls back to the configured
    /// default and is clamped to the configured ceiling.
    pub async fn search_items(
        &self,
        query: &str,
        limit: Option<usize>,
        locale: Option<Locale>,
    ) -> ApiResult<SearchView> {
        let limit = self.config.resolve_limit(limit)?;
        let locale = self.locale(locale);
        let request = SearchRequest::new(query)
            .with_limit(limit)
            .with_locale(locale);
        let response = self.engine.search(&request).await?;

        let mut results = Vec::with_capacity(response.results.len());
        for item in &response.results {
            results.push(self.item_view(item, locale).await?);
        }
        Ok(SearchView {
            results,
            query: response.query,
            tokens: response.tokens,
            matched_tokens: response.matched_tokens,
            total_results: response.total_results,
        })
    }

    /// Builds the alternate score-ranked text index from the current
    /// catalog contents.
    pub async fn build_text_index(&self) -> ApiResult<TextIndex> {
        Ok(TextIndex::build(self.store.as_ref()).await?)
    }

    // -- category reads ---------------------------------------------------

    pub async fn category_tree(
        &self,
        root_id: Option<u64>,
        locale: Option<Locale>,
    ) -> ApiResult<Vec<CategoryTreeNode>> {
        let locale = self.locale(locale);
        let nodes = self.categories.tree(root_id).await?;
        Ok(nodes
            .into_iter()
            .map(|node| render_tree_node(node, locale))
            .collect())
    }

    pub async fn category_by_slug(
        &self,
        slug: &str,
        locale: Option<Locale>,
    ) -> ApiResult<CategoryDetailView> {
        let locale = self.locale(locale);
        let category = self.categories.get_by_slug(slug).await?;
        let ancestors = self.categories.ancestors(category.id).await?;
        let parents = self.parent_set().await?;

        let breadcrumb = ancestors
            .iter()
            .chain(std::iter::once(&category))
            .map(|c| c.title.resolve(locale).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" > ");
        Ok(CategoryDetailView {
            category: self.render_category(&category, locale, &parents),
            ancestors: ancestors
                .iter()
                .map(|c| self.render_category(c, locale, &parents))
                .collect(),
            breadcrumb,
        })
    }

    pub async fn category_ancestors(
        &self,
        slug: &str,
        locale: Option<Locale>,
    ) -> ApiResult<Vec<CategoryView>> {
        let locale = self.locale(locale);
        let category = self.categories.get_by_slug(slug).await?;
        let ancestors = self.categories.ancestors(category.id).await?;
        let parents = self.parent_set().await?;
        Ok(ancestors
            .iter()
            .map(|c| self.render_category(c, locale, &parents))
            .collect())
    }

    pub async fn category_children(
        &self,
        slug: &str,
        locale: Option<Locale>,
    ) -> ApiResult<Vec<CategoryView>> {
        let locale = self.locale(locale);
        let category = self.categories.get_by_slug(slug).await?;
        let children = self.categories.children_of(category.id).await?;
        let parents = self.parent_set().await?;
        Ok(children
            .iter()
            .map(|c| self.render_category(c, locale, &parents))
            .collect())
    }

    pub async fn list_categories(
        &self,
        filter: CategoryFilter,
        locale: Option<Locale>,
    ) -> ApiResult<Vec<CategoryView>> {
        let locale = self.locale(locale);
        let categories = self.categories.list(filter).await?;
        let parents = self.parent_set().await?;
        Ok(categories
            .iter()
            .map(|c| self.render_category(c, locale, &parents))
            .collect())
    }

    /// Case-insensitive localized title search.
    pub async fn search_categories(
        &self,
        fragment: &str,
        locale: Option<Locale>,
    ) -> ApiResult<Vec<CategoryView>> {
        let locale = self.locale(locale);
        let hits = self.categories.search_titles(fragment, locale).await?;
        let parents = self.parent_set().await?;
        Ok(hits
            .iter()
            .map(|c| self.render_category(c, locale, &parents))
            .collect())
    }

    // -- category mutations -----------------------------------------------

    pub async fn create_category(&self, draft: CategoryDraft) -> ApiResult<Category> {
        Ok(self.categories.create(draft).await?)
    }

    pub async fn update_category(&self, id: u64, patch: CategoryPatch) -> ApiResult<Category> {
        Ok(self.categories.update(id, patch).await?)
    }

    /// Deletes a category subtree and everything hanging off it: the
    /// categories, their items with keyword edges, and the items' reaction
    /// rows.
    pub async fn delete_category(&self, id: u64) -> ApiResult<CascadeReport> {
        let categories = self.categories.delete(id).await?;
        let items = self.items.delete_in_categories(&categories).await?;
        let mut reactions = 0;
        for item_id in &items {
            reactions += self.reactions.purge_item(*item_id).await?;
        }
        log::info!(
            "category #{} cascade: {} categories, {} items, {} reactions",
            id,
            categories.len(),
            items.len(),
            reactions
        );
        Ok(CascadeReport {
            categories,
            items,
            reactions,
        })
    }

    // -- items ------------------------------------------------------------

    pub async fn create_item(&self, draft: ItemDraft) -> ApiResult<Item> {
        Ok(self.items.create(draft).await?)
    }

    pub async fn update_item(&self, id: u64, patch: ItemPatch) -> ApiResult<Item> {
        Ok(self.items.update(id, patch).await?)
    }

    pub async fn delete_item(&self, id: u64) -> ApiResult<CascadeReport> {
        let item_id = self.items.delete(id).await?;
        let reactions = self.reactions.purge_item(item_id).await?;
        Ok(CascadeReport {
            categories: Vec::new(),
            items: vec![item_id],
            reactions,
        })
    }

    pub async fn item_by_slug(&self, slug: &str, locale: Option<Locale>) -> ApiResult<ItemView> {
        let locale = self.locale(locale);
        let item = self.items.get_by_slug(slug).await?;
        self.item_view(&item, locale).await
    }

    pub async fn items_in_category(
        &self,
        category_id: u64,
        locale: Option<Locale>,
    ) -> ApiResult<Vec<ItemView>> {
        let locale = self.locale(locale);
        let items = self.items.list_in_category(category_id).await?;
        let mut views = Vec::with_capacity(items.len());
        for item in &items {
            views.push(self.item_view(item, locale).await?);
        }
        Ok(views)
    }

    // -- keywords ---------------------------------------------------------

    pub async fn create_keyword(&self, name: &str) -> ApiResult<Keyword> {
        Ok(self.keywords.create(name).await?)
    }

    pub async fn delete_keyword(&self, id: u64) -> ApiResult<()> {
        Ok(self.keywords.delete(id).await?)
    }

    pub async fn attach_keyword(&self, item_id: u64, keyword_id: u64) -> ApiResult<ItemKeyword> {
        Ok(self.items.attach_keyword(item_id, keyword_id).await?)
    }

    pub async fn detach_keyword(&self, item_id: u64, keyword_id: u64) -> ApiResult<()> {
        Ok(self.items.detach_keyword(item_id, keyword_id).await?)
    }

    // -- reactions --------------------------------------------------------

    pub async fn add_comment(
        &self,
        item_id: u64,
        user: Option<u64>,
        text: &str,
        parent_id: Option<u64>,
    ) -> ApiResult<Comment> {
        Ok(self
            .reactions
            .add_comment(item_id, user, text, parent_id)
            .await?)
    }

    pub async fn comments_for(&self, item_id: u64) -> ApiResult<Vec<Comment>> {
        Ok(self.reactions.comments_for(item_id).await?)
    }

    pub async fn delete_comment(&self, id: u64) -> ApiResult<usize> {
        Ok(self.reactions.delete_comment(id).await?)
    }

    pub async fn like_item(&self, item_id: u64, user: Option<u64>) -> ApiResult<Like> {
        Ok(self.reactions.like(item_id, user).await?)
    }

    pub async fn unlike_item(&self, item_id: u64, user: u64) -> ApiResult<bool> {
        Ok(self.reactions.unlike(item_id, user).await?)
    }

    pub async fn like_count(&self, item_id: u64) -> ApiResult<usize> {
        Ok(self.reactions.like_count(item_id).await?)
    }

    pub async fn rate_item(&self, item_id: u64, user: Option<u64>, rating: u8) -> ApiResult<Rate> {
        Ok(self.reactions.rate(item_id, user, rating).await?)
    }

    pub async fn rating_summary(&self, item_id: u64) -> ApiResult<RatingSummary> {
        Ok(self.reactions.rating_summary(item_id).await?)
    }

    pub async fn add_review(
        &self,
        item_id: u64,
        user: Option<u64>,
        text: &str,
    ) -> ApiResult<Review> {
        Ok(self.reactions.add_review(item_id, user, text).await?)
    }

    pub async fn reviews_for(&self, item_id: u64) -> ApiResult<Vec<Review>> {
        Ok(self.reactions.reviews_for(item_id).await?)
    }

    pub async fn bookmark_item(&self, item_id: u64, user: u64) -> ApiResult<Bookmark> {
        Ok(self.reactions.bookmark(item_id, user).await?)
    }

    pub async fn remove_bookmark(&self, item_id: u64, user: u64) -> ApiResult<bool> {
        Ok(self.reactions.remove_bookmark(item_id, user).await?)
    }

    pub async fn bookmarks_for_user(&self, user: u64) -> ApiResult<Vec<Bookmark>> {
        Ok(self.reactions.bookmarks_for_user(user).await?)
    }

    pub async fn record_view(&self, item_id: u64, user: Option<u64>) -> ApiResult<()> {
        self.reactions.record_view(item_id, user).await?;
        Ok(())
    }

    pub async fn view_count(&self, item_id: u64) -> ApiResult<usize> {
        Ok(self.reactions.view_count(item_id).await?)
    }

    pub async fn record_search(
        &self,
        user: Option<u64>,
        query: &str,
        item_id: Option<u64>,
    ) -> ApiResult<SearchQuery> {
        Ok(self.reactions.record_search(user, query, item_id).await?)
    }

    pub async fn search_history(&self, user: u64) -> ApiResult<Vec<SearchQuery>> {
        Ok(self.reactions.search_history(user).await?)
    }

    pub async fn clear_search_history(&self, user: u64) -> ApiResult<usize> {
        Ok(self.reactions.clear_search_history(user).await?)
    }

    // -- rendering helpers ------------------------------------------------

    async fn item_view(&self, item: &Item, locale: Locale) -> ApiResult<ItemView> {
        let keywords = self
            .items
            .keywords_for(item.id)
            .await?
            .into_iter()
            .map(|k| k.name)
            .collect();
        Ok(ItemView::render(item, locale, keywords))
    }

    fn render_category(
        &self,
        category: &Category,
        locale: Locale,
        parents: &HashSet<u64>,
    ) -> CategoryView {
        CategoryView::render(category, locale, !parents.contains(&category.id))
    }

    /// Ids that appear as someone's parent, for O(1) leaf checks while
    /// rendering lists.
    async fn parent_set(&self) -> ApiResult<HashSet<u64>> {
        Ok(self
            .categories
            .list(CategoryFilter::default())
            .await?
            .iter()
            .filter_map(|c| c.parent_id)
            .collect())
    }
}

fn render_tree_node(node: CategoryNode, locale: Locale) -> CategoryTreeNode {
    let is_leaf = node.children.is_empty();
    CategoryTreeNode {
        category: CategoryView::render(&node.category, locale, is_leaf),
        children: node
            .children
            .into_iter()
            .map(|child| render_tree_node(child, locale))
            .collect(),
    }
}
