//! Search analytics logging.
//!
//! Query executions are recorded through a background worker so that logging
//! latency or failure can never affect the search path. `log` is a
//! non-blocking enqueue; the worker owns the only awaited write.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use catalog_search_repository::SearchIndexProvider;
use catalog_search_shared::SearchLogEntry;

/// Configuration for the analytics logger.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Capacity of the log-entry channel. Entries beyond a full channel are
    /// dropped, not awaited.
    pub channel_capacity: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// Fire-and-forget search analytics logger.
///
/// Holds a bounded channel to a background worker that appends entries to the
/// search-log index. Failures are swallowed and surfaced only through the
/// internal drop/failure counters and warn-level logs.
pub struct AnalyticsLogger {
    sender: mpsc::Sender<SearchLogEntry>,
    dropped: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
    worker: JoinHandle<()>,
}

impl AnalyticsLogger {
    /// Create a logger with default configuration and spawn its worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self::with_config(provider, AnalyticsConfig::default())
    }

    /// Create a logger with custom configuration and spawn its worker.
    pub fn with_config(provider: Arc<dyn SearchIndexProvider>, config: AnalyticsConfig) -> Self {
        let (sender, mut receiver) = mpsc::channel::<SearchLogEntry>(config.channel_capacity);
        let failed = Arc::new(AtomicU64::new(0));

        let worker_failed = Arc::clone(&failed);
        let worker = tokio::spawn(async move {
            while let Some(entry) = receiver.recv().await {
                if let Err(e) = provider.log_search(&entry).await {
                    worker_failed.fetch_add(1, Ordering::Relaxed);
                    warn!(error = %e, query = %entry.query, "Failed to append search log entry");
                }
            }
            debug!("Analytics worker stopped");
        });

        Self {
            sender,
            dropped: Arc::new(AtomicU64::new(0)),
            failed,
            worker,
        }
    }

    /// Enqueue a log entry without blocking.
    ///
    /// If the channel is full or the worker is gone, the entry is dropped and
    /// counted; the caller never observes an error.
    pub fn log(&self, entry: SearchLogEntry) {
        if self.sender.try_send(entry).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            warn!("Analytics channel full or closed; dropping search log entry");
        }
    }

    /// Number of entries dropped before reaching the worker.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Number of entries the worker failed to write.
    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Drain the channel and stop the worker.
    pub async fn shutdown(self) {
        drop(self.sender);
        if let Err(e) = self.worker.await {
            warn!(error = %e, "Analytics worker did not shut down cleanly");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::{Notify, Semaphore};

    use catalog_search_repository::{
        BulkIndexSummary, HealthReport, SearchIndexError,
    };
    use catalog_search_shared::{
        ProductDocument, SearchQuery, SearchResponse, Suggestion, TrendingTerm,
    };

    /// Mock provider that records log entries; other operations are unused.
    struct RecordingProvider {
        entries: tokio::sync::Mutex<Vec<SearchLogEntry>>,
        /// Notified when the worker enters log_search.
        started: Arc<Notify>,
        /// Permits gating log_search completion.
        gate: Arc<Semaphore>,
        fail: bool,
    }

    impl RecordingProvider {
        fn new() -> Self {
            Self {
                entries: tokio::sync::Mutex::new(Vec::new()),
                started: Arc::new(Notify::new()),
                gate: Arc::new(Semaphore::new(Semaphore::MAX_PERMITS)),
                fail: false,
            }
        }

        fn gated() -> Self {
            Self {
                gate: Arc::new(Semaphore::new(0)),
                ..Self::new()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl SearchIndexProvider for RecordingProvider {
        async fn ensure_indices(&self) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn index_document(&self, _: &ProductDocument) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn bulk_index_documents(
            &self,
            documents: &[ProductDocument],
        ) -> Result<BulkIndexSummary, SearchIndexError> {
            Ok(BulkIndexSummary {
                total: documents.len(),
                succeeded: documents.len(),
                failed: 0,
                failed_ids: Vec::new(),
            })
        }

        async fn delete_document(&self, _: &str) -> Result<(), SearchIndexError> {
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

        async fn log_search(&self, entry: &SearchLogEntry) -> Result<(), SearchIndexError> {
            self.started.notify_one();
            let _permit = self.gate.acquire().await.map_err(|_| {
                SearchIndexError::unknown("gate closed")
            })?;
            if self.fail {
                return Err(SearchIndexError::connection("log backend down"));
            }
            self.entries.lock().await.push(entry.clone());
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

    #[tokio::test]
    async fn test_log_entries_reach_the_worker() {
        let provider = Arc::new(RecordingProvider::new());
        let logger = AnalyticsLogger::new(provider.clone());

        logger.log(SearchLogEntry::new("headphones", 12));
        logger.log(SearchLogEntry::new("laptop", 3));
        logger.shutdown().await;

        let entries = provider.entries.lock().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].query, "headphones");
        assert_eq!(entries[1].query, "laptop");
    }

    #[tokio::test]
    async fn test_worker_failures_are_counted_not_raised() {
        let provider = Arc::new(RecordingProvider::failing());
        let logger = AnalyticsLogger::new(provider.clone());

        logger.log(SearchLogEntry::new("headphones", 12));

        // The failure stays internal; log() itself never errors.
        assert_eq!(logger.dropped_count(), 0);
        let failed = Arc::clone(&logger.failed);
        logger.shutdown().await;
        assert_eq!(failed.load(Ordering::Relaxed), 1);
        assert!(provider.entries.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_full_channel_drops_without_blocking() {
        let provider = Arc::new(RecordingProvider::gated());
        let logger = AnalyticsLogger::with_config(
            provider.clone(),
            AnalyticsConfig { channel_capacity: 1 },
        );

        // First entry: wait until the worker holds it inside log_search,
        // leaving the channel empty.
        logger.log(SearchLogEntry::new("one", 1));
        provider.started.notified().await;

        // Second entry fills the channel; third has nowhere to go.
        logger.log(SearchLogEntry::new("two", 2));
        logger.log(SearchLogEntry::new("three", 3));
        assert_eq!(logger.dropped_count(), 1);

        provider.gate.add_permits(2);
        logger.shutdown().await;

        let entries = provider.entries.lock().await;
        assert_eq!(entries.len(), 2);
    }
}
