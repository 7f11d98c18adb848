//! Document synchronizer.
//!
//! Invoked by the catalog store's create/update/delete hooks after a catalog
//! write commits. Projects catalog records into search documents and keeps
//! the index in step with the catalog. The index is a best-effort cache:
//! failures are reported, never retried here; a periodic caller-side re-sync
//! job retries using the failed ids from the bulk summary.

use tracing::{debug, instrument, warn};

use catalog_search_repository::{BulkIndexSummary, CatalogSearchService, SearchIndexError};
use catalog_search_shared::{CatalogProduct, ProductDocument};

/// Synchronizes catalog records into the search index.
pub struct DocumentSynchronizer {
    service: CatalogSearchService,
}

impl DocumentSynchronizer {
    /// Create a new synchronizer over the given service.
    pub fn new(service: CatalogSearchService) -> Self {
        Self { service }
    }

    /// Upsert the document for one catalog record.
    ///
    /// Returns the indexing outcome; no internal retry.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn index_one(&self, product: &CatalogProduct) -> Result<(), SearchIndexError> {
        let document = ProductDocument::project(product);
        self.service.index(&document).await?;
        debug!("Catalog record synchronized");
        Ok(())
    }

    /// Index a batch of catalog records in one batched round trip.
    ///
    /// A failure in any individual item yields a partial-failure summary
    /// without rolling back successes.
    #[instrument(skip(self, products), fields(count = products.len()))]
    pub async fn bulk_index(
        &self,
        products: &[CatalogProduct],
    ) -> Result<BulkIndexSummary, SearchIndexError> {
        let documents: Vec<ProductDocument> =
            products.iter().map(ProductDocument::project).collect();

        let summary = self.service.bulk_index(&documents).await?;
        if !summary.all_succeeded() {
            warn!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                failed_ids = ?summary.failed_ids,
                "Bulk synchronization completed with failures"
            );
        }
        Ok(summary)
    }

    /// Remove the document for a deleted catalog record.
    ///
    /// Idempotent: deleting a non-existent id is success.
    #[instrument(skip(self))]
    pub async fn delete_one(&self, product_id: &str) -> Result<(), SearchIndexError> {
        self.service.delete(product_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    use catalog_search_repository::{HealthReport, SearchIndexProvider};
    use catalog_search_shared::{
        AttributeValue, SearchLogEntry, SearchQuery, SearchResponse, Suggestion, TrendingTerm,
    };

    /// Mock provider that captures indexed documents and deleted ids.
    struct CapturingProvider {
        indexed: Mutex<Vec<ProductDocument>>,
        deleted: Mutex<Vec<String>>,
        fail_ids: Vec<String>,
    }

    impl CapturingProvider {
        fn new() -> Self {
            Self {
                indexed: Mutex::new(Vec::new()),
                deleted: Mutex::new(Vec::new()),
                fail_ids: Vec::new(),
            }
        }

        fn failing_ids(ids: &[&str]) -> Self {
            Self {
                fail_ids: ids.iter().map(|s| s.to_string()).collect(),
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl SearchIndexProvider for CapturingProvider {
        async fn ensure_indices(&self) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn index_document(&self, document: &ProductDocument) -> Result<(), SearchIndexError> {
            self.indexed.lock().await.push(document.clone());
            Ok(())
        }

        async fn bulk_index_documents(
            &self,
            documents: &[ProductDocument],
        ) -> Result<BulkIndexSummary, SearchIndexError> {
            let mut failed_ids = Vec::new();
            for document in documents {
                if self.fail_ids.contains(&document.id) {
                    failed_ids.push(document.id.clone());
                } else {
                    self.indexed.lock().await.push(document.clone());
                }
            }
            let failed = failed_ids.len();
            Ok(BulkIndexSummary {
                total: documents.len(),
                succeeded: documents.len() - failed,
                failed,
                failed_ids,
            })
        }

        async fn delete_document(&self, product_id: &str) -> Result<(), SearchIndexError> {
            // Deleting a non-existent id succeeds, mirroring the backend.
            self.deleted.lock().await.push(product_id.to_string());
            Ok(())
        }

        async fn search(&self, _: &SearchQuery) -> Result<SearchResponse, SearchIndexError> {
            Ok(SearchResponse::empty())
        }

        async fn autocomplete(
            &self,
            _: &str,
            _: Option<&str>,
            _: usize,
        ) -> Result<Vec<Suggestion>, SearchIndexError> {
            Ok(Vec::new())
        }

        async fn find_similar(
            &self,
            _: &str,
            _: usize,
        ) -> Result<Vec<ProductDocument>, SearchIndexError> {
            Ok(Vec::new())
        }

        async fn log_search(&self, _: &SearchLogEntry) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn trending_searches(
            &self,
            _: usize,
            _: Duration,
        ) -> Result<Vec<TrendingTerm>, SearchIndexError> {
            Ok(Vec::new())
        }

        async fn health(&self) -> Result<HealthReport, SearchIndexError> {
            Ok(HealthReport::disconnected())
        }

        async fn refresh_indices(&self) -> Result<(), SearchIndexError> {
            Ok(())
        }
    }

    fn sample_product(id: &str) -> CatalogProduct {
        CatalogProduct {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: None,
            category: "Electronics".to_string(),
            brand: None,
            price: 99.0,
            original_price: None,
            discount: None,
            rating: 4.0,
            num_reviews: 5,
            stock: 3,
            tags: vec!["gadget".to_string()],
            attributes: BTreeMap::from([
                ("color".to_string(), AttributeValue::Text("red".to_string())),
                (
                    "warehouse_zone".to_string(),
                    AttributeValue::Text("B4".to_string()),
                ),
            ]),
            images: vec!["https://cdn.example.com/x.jpg".to_string()],
            seller_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            views: 0,
            sales: 0,
        }
    }

    fn synchronizer(provider: Arc<CapturingProvider>) -> DocumentSynchronizer {
        DocumentSynchronizer::new(CatalogSearchService::new(provider))
    }

    #[tokio::test]
    async fn test_index_one_projects_the_record() {
        let provider = Arc::new(CapturingProvider::new());
        let sync = synchronizer(provider.clone());

        sync.index_one(&sample_product("p1")).await.unwrap();

        let indexed = provider.indexed.lock().await;
        assert_eq!(indexed.len(), 1);
        let document = &indexed[0];
        assert_eq!(document.id, "p1");
        // allow-listed attribute kept, unknown key dropped
        assert!(document.attributes.contains_key("color"));
        assert!(!document.attributes.contains_key("warehouse_zone"));
    }

    #[tokio::test]
    async fn test_index_one_twice_targets_same_document_id() {
        let provider = Arc::new(CapturingProvider::new());
        let sync = synchronizer(provider.clone());

        let product = sample_product("p1");
        sync.index_one(&product).await.unwrap();
        sync.index_one(&product).await.unwrap();

        let indexed = provider.indexed.lock().await;
        assert_eq!(indexed.len(), 2);
        // Both writes upsert the same id; the backend keeps one document.
        assert_eq!(indexed[0].id, indexed[1].id);
    }

    #[tokio::test]
    async fn test_bulk_index_reports_failed_ids() {
        let provider = Arc::new(CapturingProvider::failing_ids(&["p2"]));
        let sync = synchronizer(provider.clone());

        let products = vec![
            sample_product("p1"),
            sample_product("p2"),
            sample_product("p3"),
        ];
        let summary = sync.bulk_index(&products).await.unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failed_ids, vec!["p2".to_string()]);
        // Successes are not rolled back.
        assert_eq!(provider.indexed.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_one_is_idempotent() {
        let provider = Arc::new(CapturingProvider::new());
        let sync = synchronizer(provider.clone());

        sync.delete_one("p1").await.unwrap();
        sync.delete_one("p1").await.unwrap();

        assert_eq!(provider.deleted.lock().await.len(), 2);
    }
}
