//! # Catalog Search
//!
//! The catalog search & discovery engine. It maintains a searchable index
//! derived from the product catalog and answers ranked, filtered, faceted,
//! autocomplete, and similarity queries, plus logs query analytics.
//!
//! ## Architecture
//!
//! 1. **Synchronizer**: Projects catalog records into search documents and
//!    indexes them (invoked by the catalog store's write hooks)
//! 2. **Engine**: The facade the web layer calls; degrades to empty results
//!    when the backend is unavailable instead of failing the site
//! 3. **Analytics**: Fire-and-forget query logging and trend aggregation
//! 4. **Config**: Environment-driven dependency wiring
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`synchronizer`]: Projects and indexes catalog records
//! - [`engine`]: Query facade with unavailable-mode degradation
//! - [`analytics`]: Background search-log worker and trending terms

pub mod analytics;
pub mod config;
pub mod engine;
pub mod synchronizer;

pub use analytics::AnalyticsLogger;
pub use config::{ConnectionMode, Dependencies, SearchConfig};
pub use engine::CatalogSearchEngine;
pub use synchronizer::DocumentSynchronizer;

use catalog_search_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur during engine initialization or execution.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search index error.
    #[error("Search index error: {0}")]
    SearchIndex(#[from] SearchIndexError),
}

impl EngineError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
