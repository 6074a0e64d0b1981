use crate::error::{Result, SearchError};
use crate::tokenizer::tokenize;
use crate::types::{ItemSearcher, SearchRequest, SearchResponse};
use async_trait::async_trait;
use catalog_model::Item;
use catalog_store::CatalogStore;
use std::collections::HashMap;

/// Field weight for terms drawn from item titles.
const TITLE_WEIGHT: f32 = 1.0;
/// Field weight for terms drawn from linked keyword names.
const KEYWORD_WEIGHT: f32 = 0.4;

/// Alternate search backend: an in-memory inverted index over localized
/// titles and linked keyword names, ranked by a weighted term-frequency
/// score summed across matched tokens. Built once from a store snapshot;
/// rebuild after catalog edits.
///
/// This is the accelerated path for callers that want relevance scores;
/// [`crate::SearchEngine`] remains the reference behavior.
pub struct TextIndex {
    postings: HashMap<String, HashMap<u64, f32>>,
    items: HashMap<u64, Item>,
}

impl TextIndex {
    /// Indexes every item currently in the store.
    pub async fn build(store: &dyn CatalogStore) -> Result<Self> {
        let items = store.items().list().await?;
        let keyword_names: HashMap<u64, String> = store
            .keywords()
            .list()
            .await?
            .into_iter()
            .map(|k| (k.id, k.name))
            .collect();

        let mut postings: HashMap<String, HashMap<u64, f32>> = HashMap::new();
        let mut bump = |term: String, item_id: u64, weight: f32| {
            *postings.entry(term).or_default().entry(item_id).or_default() += weight;
        };

        for item in &items {
            for (_, title) in item.title.values() {
                for term in tokenize(title) {
                    bump(term, item.id, TITLE_WEIGHT);
                }
            }
        }
        for edge in store.item_keywords().list().await? {
            if let Some(name) = keyword_names.get(&edge.keyword_id) {
                for term in tokenize(name) {
                    bump(term, edge.item_id, KEYWORD_WEIGHT);
                }
            }
        }

        log::info!(
            "text index built: {} items, {} terms",
            items.len(),
            postings.len()
        );
        Ok(Self {
            postings,
            items: items.into_iter().map(|item| (item.id, item)).collect(),
        })
    }

    /// Scores every item touching any query token and returns the top
    /// `limit` by descending score. Ties fall back to the resolved title,
    /// then id, so the ordering is deterministic.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        if request.query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let tokens = tokenize(&request.query);
        if tokens.is_empty() {
            return Ok(SearchResponse::empty(request.query.clone(), tokens));
        }

        let mut scores: HashMap<u64, f32> = HashMap::new();
        let mut matched_tokens = Vec::new();
        for token in &tokens {
            if let Some(per_item) = self.postings.get(token) {
                matched_tokens.push(token.clone());
                for (item_id, weight) in per_item {
                    *scores.entry(*item_id).or_default() += weight;
                }
            }
        }

        let mut ranked: Vec<(u64, f32)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    let title_a = self.resolved_title(a.0, request);
                    let title_b = self.resolved_title(b.0, request);
                    title_a.cmp(&title_b)
                })
                .then(a.0.cmp(&b.0))
        });
        ranked.truncate(request.limit);

        let results: Vec<Item> = ranked
            .iter()
            .filter_map(|(item_id, _)| self.items.get(item_id).cloned())
            .collect();
        let total_results = results.len();
        log::debug!(
            "text index search '{}': {} results",
            request.query,
            total_results
        );
        Ok(SearchResponse {
            results,
            query: request.query.clone(),
            tokens,
            matched_tokens,
            total_results,
        })
    }

    fn resolved_title(&self, item_id: u64, request: &SearchRequest) -> String {
        self.items
            .get(&item_id)
            .and_then(|item| item.title.resolve(request.locale))
            .unwrap_or_default()
            .to_string()
    }
}

#[async_trait]
impl ItemSearcher for TextIndex {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        TextIndex::search(self, request)
    }
}
