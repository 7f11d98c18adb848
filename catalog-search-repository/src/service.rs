//! Catalog search service implementation.
//!
//! This module provides the validating layer between application code and a
//! `SearchIndexProvider`. It performs input validation, clamps fan-out sizes,
//! and enforces batch limits before delegating to the backend.

use std::sync::Arc;
use std::time::Duration;

use catalog_search_shared::{
    ProductDocument, SearchLogEntry, SearchQuery, SearchResponse, Suggestion, TrendingTerm,
};

use crate::config::CatalogSearchServiceConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BulkIndexSummary, HealthReport};

/// The validating service over a search index provider.
///
/// Malformed input from the caller fails fast and synchronously here;
/// operational failures from the backend pass through untouched so the engine
/// facade can apply its degradation policy.
///
/// The service is cheap to clone; clones share the same provider handle.
#[derive(Clone)]
pub struct CatalogSearchService {
    provider: Arc<dyn SearchIndexProvider>,
    config: CatalogSearchServiceConfig,
}

impl CatalogSearchService {
    /// Create a new service with default configuration.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: CatalogSearchServiceConfig::default(),
        }
    }

    /// Create a new service with custom configuration.
    pub fn with_config(
        provider: Arc<dyn SearchIndexProvider>,
        config: CatalogSearchServiceConfig,
    ) -> Self {
        Self { provider, config }
    }

    /// The provider handle this service delegates to.
    pub fn provider(&self) -> Arc<dyn SearchIndexProvider> {
        Arc::clone(&self.provider)
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), SearchIndexError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchIndexError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Clamp a caller-requested fan-out to the configured ceiling.
    fn clamp_fanout(&self, limit: usize) -> usize {
        limit.clamp(1, self.config.max_fanout)
    }

    /// Ensure the indices exist. Idempotent; called once at startup.
    pub async fn ensure_indices(&self) -> Result<(), SearchIndexError> {
        self.provider.ensure_indices().await
    }

    /// Upsert one product document.
    pub async fn index(&self, document: &ProductDocument) -> Result<(), SearchIndexError> {
        document.validate().map_err(SearchIndexError::validation)?;
        self.provider.index_document(document).await
    }

    /// Index a batch of documents in one round trip.
    ///
    /// Individual failures are reported in the summary rather than failing
    /// the whole batch; the failed ids are available for selective retry.
    pub async fn bulk_index(
        &self,
        documents: &[ProductDocument],
    ) -> Result<BulkIndexSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BulkIndexSummary::empty());
        }
        self.validate_batch_size(documents.len())?;
        for document in documents {
            document.validate().map_err(SearchIndexError::validation)?;
        }
        self.provider.bulk_index_documents(documents).await
    }

    /// Delete a product document. Deleting a non-existent id is success.
    pub async fn delete(&self, product_id: &str) -> Result<(), SearchIndexError> {
        if product_id.trim().is_empty() {
            return Err(SearchIndexError::validation("Product id is required"));
        }
        self.provider.delete_document(product_id).await
    }

    /// Execute a search query.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchIndexError> {
        query.validate().map_err(SearchIndexError::validation)?;
        self.provider.search(query).await
    }

    /// Query the completion structure for prefix suggestions.
    pub async fn autocomplete(
        &self,
        prefix: &str,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Suggestion>, SearchIndexError> {
        if prefix.trim().is_empty() {
            return Err(SearchIndexError::validation("Prefix is required"));
        }
        self.provider
            .autocomplete(prefix, category, self.clamp_fanout(limit))
            .await
    }

    /// Retrieve documents similar to the seed product.
    pub async fn find_similar(
        &self,
        product_id: &str,
        limit: usize,
    ) -> Result<Vec<ProductDocument>, SearchIndexError> {
        if product_id.trim().is_empty() {
            return Err(SearchIndexError::validation("Product id is required"));
        }
        self.provider
            .find_similar(product_id, self.clamp_fanout(limit))
            .await
    }

    /// Append one entry to the analytics log.
    pub async fn log_search(&self, entry: &SearchLogEntry) -> Result<(), SearchIndexError> {
        self.provider.log_search(entry).await
    }

    /// Aggregate trending search terms within the trailing window.
    pub async fn trending_searches(
        &self,
        limit: usize,
        window: Duration,
    ) -> Result<Vec<TrendingTerm>, SearchIndexError> {
        self.provider
            .trending_searches(self.clamp_fanout(limit), window)
            .await
    }

    /// Report backend health and index size.
    pub async fn health(&self) -> Result<HealthReport, SearchIndexError> {
        self.provider.health().await
    }

    /// Force a synchronous refresh. Test-only escape hatch.
    pub async fn refresh_indices(&self) -> Result<(), SearchIndexError> {
        self.provider.refresh_indices().await
    }
}
