//! # Catalog Search Shared
//!
//! This crate defines shared data structures and types used across the catalog
//! search ecosystem: the indexed product document, search queries and results,
//! autocomplete suggestions, and search analytics log entries.

pub mod types;

pub use types::product_document::{
    is_indexed_attribute, AttributeValue, CatalogProduct, ProductDocument,
};
pub use types::search_log::{SearchLogEntry, TrendingTerm};
pub use types::search_query::{SearchFilters, SearchQuery, SortOrder};
pub use types::search_result::{
    page_count, FacetBucket, Facets, PriceBucket, SearchHit, SearchResponse,
};
pub use types::suggestion::Suggestion;
