//! # Catalog Search Repository
//!
//! This crate provides traits and implementations for interacting with the
//! catalog search index. It includes definitions for errors, interfaces, and a
//! concrete implementation for OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod service;
pub mod types;

pub use config::CatalogSearchServiceConfig;
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::OpenSearchProvider;
pub use service::CatalogSearchService;
pub use types::{BulkIndexSummary, HealthReport, HealthState};
