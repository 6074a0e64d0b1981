use crate::error::{Result, SearchError};
use crate::tokenizer::tokenize;
use crate::types::{ItemSearcher, SearchRequest, SearchResponse};
use async_trait::async_trait;
use catalog_model::Item;
use catalog_store::CatalogStore;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Reference search implementation: exact token-to-keyword matching with
/// composite-key ranking over the full candidate set.
pub struct SearchEngine {
    store: Arc<dyn CatalogStore>,
}

struct Ranked {
    item: Item,
    matched_terms: usize,
    exact_title: bool,
    total_keywords: usize,
    title: String,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        if request.query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let tokens = tokenize(&request.query);
        log::debug!("search '{}': {} tokens", request.query, tokens.len());
        if tokens.is_empty() {
            return Ok(SearchResponse::empty(request.query.clone(), tokens));
        }

        // Exact match of tokens against the (lowercased) keyword vocabulary.
        let token_set: HashSet<String> = tokens.iter().cloned().collect();
        let keywords = {
            let token_set = token_set.clone();
            self.store
                .keywords()
                .find(&move |k| token_set.contains(&k.name))
                .await?
        };
        if keywords.is_empty() {
            log::debug!("search '{}': no keyword matches", request.query);
            return Ok(SearchResponse::empty(request.query.clone(), tokens));
        }
        let keyword_ids: HashSet<u64> = keywords.iter().map(|k| k.id).collect();
        let matched_names: HashSet<&str> = keywords.iter().map(|k| k.name.as_str()).collect();
        let matched_tokens: Vec<String> = tokens
            .iter()
            .filter(|token| matched_names.contains(token.as_str()))
            .cloned()
            .collect();

        // One pass over the edge table yields both ranking counters: the
        // distinct matched keywords and the total links per item.
        let mut matched_per_item: HashMap<u64, HashSet<u64>> = HashMap::new();
        let mut total_per_item: HashMap<u64, usize> = HashMap::new();
        for edge in self.store.item_keywords().list().await? {
            *total_per_item.entry(edge.item_id).or_default() += 1;
            if keyword_ids.contains(&edge.keyword_id) {
                matched_per_item
                    .entry(edge.item_id)
                    .or_default()
                    .insert(edge.keyword_id);
            }
        }

        let candidates = {
            let candidate_ids: HashSet<u64> = matched_per_item.keys().copied().collect();
            self.store
                .items()
                .find(&move |item| candidate_ids.contains(&item.id))
                .await?
        };
        log::debug!(
            "search '{}': {} keywords matched, {} candidate items",
            request.query,
            keyword_ids.len(),
            candidates.len()
        );

        let mut ranked: Vec<Ranked> = candidates
            .into_iter()
            .map(|item| {
                let matched_terms = matched_per_item.get(&item.id).map_or(0, HashSet::len);
                let exact_title = title_contains_any(&item, &tokens);
                let total_keywords = total_per_item.get(&item.id).copied().unwrap_or(0);
                let title = item
                    .title
                    .resolve(request.locale)
                    .unwrap_or_default()
                    .to_string();
                Ranked {
                    item,
                    matched_terms,
                    exact_title,
                    total_keywords,
                    title,
                }
            })
            .collect();

        // Rank everything, then truncate. Truncating earlier would let an
        // arbitrary window beat a better-matching item.
        ranked.sort_by(|a, b| {
            b.matched_terms
                .cmp(&a.matched_terms)
                .then(b.exact_title.cmp(&a.exact_title))
                .then(b.total_keywords.cmp(&a.total_keywords))
                .then_with(|| a.title.cmp(&b.title))
        });
        ranked.truncate(request.limit);

        let results: Vec<Item> = ranked.into_iter().map(|r| r.item).collect();
        let total_results = results.len();
        Ok(SearchResponse {
            results,
            query: request.query.clone(),
            tokens,
            matched_tokens,
            total_results,
        })
    }
}

/// True when any query token appears as a case-insensitive substring of any
/// localized title value.
fn title_contains_any(item: &Item, tokens: &[String]) -> bool {
    item.title.values().any(|(_, title)| {
        let lowered = title.to_lowercase();
        tokens.iter().any(|token| lowered.contains(token.as_str()))
    })
}

#[async_trait]
impl ItemSearcher for SearchEngine {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        SearchEngine::search(self, request).await
    }
}
