//! Seeds a small catalog and runs a search against it.
//!
//! ```sh
//! RUST_LOG=debug cargo run -p catalog-api --example demo
//! ```

use catalog_api::{Catalog, CatalogConfig, CategoryDraft, ItemDraft, Locale, LocalizedText};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let catalog = Catalog::in_memory(CatalogConfig::default());
    let phones = catalog
        .create_category(CategoryDraft {
            title: LocalizedText::new()
                .with(Locale::Uz, "Telefonlar")
                .with(Locale::Ru, "Телефоны"),
            parent_id: None,
        })
        .await?;

    let item = catalog
        .create_item(ItemDraft {
            title: LocalizedText::new()
                .with(Locale::Uz, "G'ilof")
                .with(Locale::Ru, "Чехол"),
            category_id: phones.id,
            ..Default::default()
        })
        .await?;
    for name in ["чехол", "аксессуар"] {
        let keyword = catalog.create_keyword(name).await?;
        catalog.attach_keyword(item.id, keyword.id).await?;
    }

    let results = catalog
        .search_items("чехол", None, Some(Locale::Ru))
        .await?;
    println!("{}", serde_json::to_string_pretty(&results)?);

    let tree = catalog.category_tree(None, Some(Locale::Ru)).await?;
    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}
