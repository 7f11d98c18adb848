//! This module defines the core data structures and types used across the
//! catalog search engine.

pub mod product_document;
pub mod search_log;
pub mod search_query;
pub mod search_result;
pub mod suggestion;

pub use product_document::{CatalogProduct, ProductDocument};
pub use search_log::SearchLogEntry;
pub use search_query::SearchQuery;
pub use search_result::SearchResponse;
pub use suggestion::Suggestion;
