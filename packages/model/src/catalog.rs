use crate::component::CatalogItem;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Product/collection lookup used to populate catalog nodes
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<CatalogItem>, CatalogError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<CatalogItem>, CatalogError>;
}

/// Fixed in-memory catalog. Matches on a case-insensitive title substring.
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    items: Vec<CatalogItem>,
}

impl MockCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    /// Small demo catalog
    pub fn sample() -> Self {
        let item = |id: &str, title: &str, price: Option<&str>| CatalogItem {
            id: id.to_string(),
            title: title.to_string(),
            image: format!("https://picsum.photos/seed/{}/400/300", id),
            price: price.map(str::to_string),
            cta_text: "Shop now".to_string(),
            cta_url: format!("/products/{}", id),
        };

        Self::new(vec![
            item("linen-shirt", "Linen Shirt", Some("$49.00")),
            item("canvas-tote", "Canvas Tote", Some("$24.00")),
            item("wool-scarf", "Wool Scarf", Some("$35.00")),
            item("summer-edit", "Summer Collection", None),
            item("winter-edit", "Winter Collection", None),
        ])
    }
}

#[async_trait]
impl CatalogSource for MockCatalog {
    async fn search(&self, query: &str) -> Result<Vec<CatalogItem>, CatalogError> {
        let query = query.trim().to_lowercase();
        Ok(self
            .items
            .iter()
            .filter(|item| query.is_empty() || item.title.to_lowercase().contains(&query))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<CatalogItem>, CatalogError> {
        Ok(self.items.iter().find(|item| item.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let catalog = MockCatalog::sample();
        let results = catalog.search("COLLECTION").await.unwrap();
        assert_eq!(results.len(), 2);

        let all = catalog.search("").await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let catalog = MockCatalog::sample();
        let item = catalog.get_by_id("canvas-tote").await.unwrap().unwrap();
        assert_eq!(item.price.as_deref(), Some("$24.00"));
        assert!(catalog.get_by_id("missing").await.unwrap().is_none());
    }
}
