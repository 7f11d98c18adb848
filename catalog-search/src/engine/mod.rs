//! The engine facade exposed to the web/API layer.
//!
//! Coordinates the validated search service, the analytics logger, and the
//! availability flag. Search is an enhancement, not a catalog-availability
//! dependency: when the backend is unreachable the engine answers with empty
//! defaults instead of propagating errors upward.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use catalog_search_repository::{
    CatalogSearchService, HealthReport, HealthState, SearchIndexError, SearchIndexProvider,
};
use catalog_search_shared::{
    ProductDocument, SearchLogEntry, SearchQuery, SearchResponse, Suggestion, TrendingTerm,
};

use crate::analytics::AnalyticsLogger;

/// Default trailing window for trending-term aggregation.
const DEFAULT_TRENDING_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// The catalog search engine.
///
/// One instance serves all concurrent request-handling workers; the
/// underlying client's pooling manages concurrency, so no locking happens
/// here. Expected operational failures (backend down, timeout) are converted
/// into default values; malformed caller input fails fast.
pub struct CatalogSearchEngine {
    service: CatalogSearchService,
    analytics: AnalyticsLogger,
    available: Arc<AtomicBool>,
}

impl CatalogSearchEngine {
    /// Create an engine over a provider with default configuration.
    ///
    /// Must be called from within a tokio runtime (the analytics worker is
    /// spawned here).
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self::with_service(CatalogSearchService::new(provider))
    }

    /// Create an engine over an already-configured service.
    pub fn with_service(service: CatalogSearchService) -> Self {
        let analytics = AnalyticsLogger::new(service.provider());
        Self {
            service,
            analytics,
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Whether the engine currently considers the backend reachable.
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Flip the engine into unavailable mode.
    pub(crate) fn mark_unavailable(&self) {
        self.available.store(false, Ordering::SeqCst);
    }

    /// Convert a connectivity failure into unavailable mode.
    ///
    /// Returns true when the error was absorbed.
    fn absorb_connectivity(&self, error: &SearchIndexError, operation: &str) -> bool {
        if error.is_connectivity() {
            warn!(error = %error, operation, "Search backend unreachable; entering unavailable mode");
            self.mark_unavailable();
            return true;
        }
        false
    }

    /// Execute a ranked, filtered, faceted search.
    ///
    /// Returns an empty response when the backend is unavailable; malformed
    /// queries fail fast with a validation error.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchIndexError> {
        query.validate().map_err(SearchIndexError::validation)?;

        if !self.is_available() {
            return Ok(SearchResponse::empty());
        }

        match self.service.search(query).await {
            Ok(response) => Ok(response),
            Err(e) if self.absorb_connectivity(&e, "search") => Ok(SearchResponse::empty()),
            Err(e) => Err(e),
        }
    }

    /// Prefix suggestions from the completion structure, optionally scoped by
    /// category.
    pub async fn autocomplete(
        &self,
        prefix: &str,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Suggestion>, SearchIndexError> {
        if prefix.trim().is_empty() {
            return Err(SearchIndexError::validation("Prefix is required"));
        }

        if !self.is_available() {
            return Ok(Vec::new());
        }

        match self.service.autocomplete(prefix, category, limit).await {
            Ok(suggestions) => Ok(suggestions),
            Err(e) if self.absorb_connectivity(&e, "autocomplete") => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Documents similar to the seed product, the seed excluded.
    pub async fn find_similar(
        &self,
        product_id: &str,
        limit: usize,
    ) -> Result<Vec<ProductDocument>, SearchIndexError> {
        if product_id.trim().is_empty() {
            return Err(SearchIndexError::validation("Product id is required"));
        }

        if !self.is_available() {
            return Ok(Vec::new());
        }

        match self.service.find_similar(product_id, limit).await {
            Ok(documents) => Ok(documents),
            Err(e) if self.absorb_connectivity(&e, "find_similar") => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Record a query execution. Fire-and-forget: never blocks, never fails.
    pub fn log_search(&self, entry: SearchLogEntry) {
        self.analytics.log(entry);
    }

    /// Top trending search terms over the default 24h window.
    pub async fn get_trending_searches(
        &self,
        limit: usize,
    ) -> Result<Vec<TrendingTerm>, SearchIndexError> {
        self.get_trending_searches_within(limit, DEFAULT_TRENDING_WINDOW)
            .await
    }

    /// Top trending search terms over a custom trailing window.
    pub async fn get_trending_searches_within(
        &self,
        limit: usize,
        window: Duration,
    ) -> Result<Vec<TrendingTerm>, SearchIndexError> {
        if !self.is_available() {
            return Ok(Vec::new());
        }

        match self.service.trending_searches(limit, window).await {
            Ok(terms) => Ok(terms),
            Err(e) if self.absorb_connectivity(&e, "trending") => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Report backend connectivity and index size. Never errors.
    ///
    /// This is also the availability re-probe: a reachable backend flips the
    /// engine back to available without a restart.
    pub async fn health_check(&self) -> HealthReport {
        match self.service.health().await {
            Ok(report) => {
                let reachable = report.status != HealthState::Disconnected;
                if reachable && !self.is_available() {
                    info!("Search backend reachable again; leaving unavailable mode");
                }
                self.available.store(reachable, Ordering::SeqCst);
                report
            }
            Err(e) => {
                warn!(error = %e, "Health check failed");
                self.mark_unavailable();
                HealthReport::disconnected()
            }
        }
    }

    /// Force a synchronous refresh of the indices. Test-only escape hatch.
    pub async fn refresh_indices(&self) -> Result<(), SearchIndexError> {
        self.service.refresh_indices().await
    }

    /// Number of analytics entries dropped or failed, for diagnostics.
    pub fn analytics_loss(&self) -> (u64, u64) {
        (
            self.analytics.dropped_count(),
            self.analytics.failed_count(),
        )
    }

    /// Drain the analytics channel and stop the worker.
    pub async fn shutdown(self) {
        self.analytics.shutdown().await;
    }
}
