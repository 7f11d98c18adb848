//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch,
//! etc.).

use std::time::Duration;

use async_trait::async_trait;

use catalog_search_shared::{
    ProductDocument, SearchLogEntry, SearchQuery, SearchResponse, Suggestion, TrendingTerm,
};

use crate::errors::SearchIndexError;
use crate::types::{BulkIndexSummary, HealthReport};

/// Abstracts the underlying search index implementation.
///
/// Implementations are injected into `CatalogSearchService` and the engine to
/// enable dependency injection and easy testing with mock implementations.
///
/// All methods return `Result<T, SearchIndexError>` for consistent error
/// handling across backends. Every operation is an independent round trip;
/// none holds state across calls.
///
/// # Index Initialization
///
/// Implementations should have `ensure_indices` called during application
/// startup, before any document operation. The call is idempotent.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Ensure the products and search-log indices exist, creating them with
    /// their settings and mappings if necessary.
    async fn ensure_indices(&self) -> Result<(), SearchIndexError>;

    /// Upsert a single product document, keyed by its catalog product id.
    ///
    /// Indexing the same id twice yields exactly one stored document.
    async fn index_document(&self, document: &ProductDocument) -> Result<(), SearchIndexError>;

    /// Index multiple documents in one batched round trip.
    ///
    /// A failure in any individual item yields a partial-failure summary
    /// without rolling back successes.
    async fn bulk_index_documents(
        &self,
        documents: &[ProductDocument],
    ) -> Result<BulkIndexSummary, SearchIndexError>;

    /// Delete a product document from the index.
    ///
    /// Deleting a non-existent id is success, not an error.
    async fn delete_document(&self, product_id: &str) -> Result<(), SearchIndexError>;

    /// Execute a ranked, filtered, faceted search in one round trip.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchIndexError>;

    /// Query the completion structure for prefix suggestions, optionally
    /// scoped by category context.
    async fn autocomplete(
        &self,
        prefix: &str,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Suggestion>, SearchIndexError>;

    /// Find documents with significant term overlap with the seed document.
    ///
    /// The seed itself is excluded from the results.
    async fn find_similar(
        &self,
        product_id: &str,
        limit: usize,
    ) -> Result<Vec<ProductDocument>, SearchIndexError>;

    /// Append one entry to the search analytics log.
    async fn log_search(&self, entry: &SearchLogEntry) -> Result<(), SearchIndexError>;

    /// Aggregate logged query text by frequency within the trailing window.
    async fn trending_searches(
        &self,
        limit: usize,
        window: Duration,
    ) -> Result<Vec<TrendingTerm>, SearchIndexError>;

    /// Report backend reachability, cluster health, and indexed-document count.
    async fn health(&self) -> Result<HealthReport, SearchIndexError>;

    /// Force a synchronous refresh of both indices.
    ///
    /// Write visibility is near-real-time by default; this escape hatch is
    /// used only by tests that need read-after-write.
    async fn refresh_indices(&self) -> Result<(), SearchIndexError>;
}
