//! Search contract through the facade: ranking, the empty-vs-error
//! distinction, limit handling and the alternate text index.

use catalog_api::{
    Catalog, CatalogConfig, CategoryDraft, ErrorKind, ItemDraft, Locale, LocalizedText,
    SearchConfig,
};
use catalog_search::{ItemSearcher, SearchRequest};
use std::collections::HashMap;

async fn seeded(config: CatalogConfig) -> Catalog {
    let catalog = Catalog::in_memory(config);
    let category = catalog
        .create_category(CategoryDraft {
            title: LocalizedText::new().with(Locale::En, "Accessories"),
            parent_id: None,
        })
        .await
        .unwrap();

    let mut keyword_ids: HashMap<&str, u64> = HashMap::new();
    for name in ["iphone", "case", "accessories", "popular"] {
        keyword_ids.insert(name, catalog.create_keyword(name).await.unwrap().id);
    }

    // Item A: {iphone, case}; B: {iphone}; C: {case, accessories, popular}.
    let specs: [(&str, &[&str]); 3] = [
        ("Alpha", &["iphone", "case"]),
        ("Bravo", &["iphone"]),
        ("Charlie", &["case", "accessories", "popular"]),
    ];
    for (item_title, keywords) in specs {
        let item = catalog
            .create_item(ItemDraft {
                title: LocalizedText::new().with(Locale::En, item_title),
                category_id: category.id,
                ..Default::default()
            })
            .await
            .unwrap();
        for name in keywords {
            catalog
                .attach_keyword(item.id, keyword_ids[name])
                .await
                .unwrap();
        }
    }
    catalog
}

#[tokio::test]
async fn ranking_follows_the_composite_key() {
    let catalog = seeded(CatalogConfig::default()).await;
    let view = catalog
        .search_items("iphone case", None, Some(Locale::En))
        .await
        .unwrap();
    let titles: Vec<&str> = view.results.iter().map(|r| r.title.as_str()).collect();
    // Alpha covers both terms; Charlie's richer keyword set beats Bravo.
    assert_eq!(titles, ["Alpha", "Charlie", "Bravo"]);
    assert_eq!(view.tokens, ["iphone", "case"]);
    assert_eq!(view.matched_tokens, ["iphone", "case"]);
    assert_eq!(view.total_results, 3);
    // Keyword names ride along on each result.
    assert!(view.results[0].keywords.contains(&"iphone".to_string()));
}

#[tokio::test]
async fn empty_query_is_an_error_but_stopwords_are_not() {
    let catalog = seeded(CatalogConfig::default()).await;

    let blank = catalog.search_items("   ", None, None).await.unwrap_err();
    assert_eq!(blank.kind(), ErrorKind::Validation);
    assert_eq!(blank.status_hint(), 400);

    // Stopword-only queries succeed with nothing matched.
    let stopwords = catalog.search_items("the a is", None, None).await.unwrap();
    assert!(stopwords.results.is_empty());
    assert!(stopwords.tokens.is_empty());
    assert_eq!(stopwords.query, "the a is");

    // Unmatched vocabulary also succeeds, with the tokens echoed.
    let unmatched = catalog
        .search_items("quantum flux", None, None)
        .await
        .unwrap();
    assert!(unmatched.results.is_empty());
    assert_eq!(unmatched.tokens, ["quantum", "flux"]);
}

#[tokio::test]
async fn limits_clamp_to_configuration() {
    let config = CatalogConfig {
        search: SearchConfig {
            default_limit: 2,
            max_limit: 2,
        },
        ..Default::default()
    };
    let catalog = seeded(config).await;

    // Default limit applies when none is given.
    let defaulted = catalog
        .search_items("iphone case", None, Some(Locale::En))
        .await
        .unwrap();
    assert_eq!(defaulted.total_results, 2);
    assert_eq!(defaulted.results[0].title, "Alpha");

    // Oversized limits clamp to the ceiling instead of erroring.
    let clamped = catalog
        .search_items("iphone case", Some(500), Some(Locale::En))
        .await
        .unwrap();
    assert_eq!(clamped.total_results, 2);

    // Zero is rejected.
    let zero = catalog
        .search_items("iphone", Some(0), None)
        .await
        .unwrap_err();
    assert_eq!(zero.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn text_index_serves_the_same_trait() {
    let catalog = seeded(CatalogConfig::default()).await;
    let index = catalog.build_text_index().await.unwrap();

    let response = ItemSearcher::search(
        &index,
        &SearchRequest::new("alpha").with_locale(Locale::En),
    )
    .await
    .unwrap();
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].title.resolve(Locale::En), Some("Alpha"));
    assert_eq!(response.matched_tokens, ["alpha"]);
}
