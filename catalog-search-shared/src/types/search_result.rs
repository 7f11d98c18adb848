//! Search result types for the catalog search engine.
//!
//! This module defines the response structures returned from search
//! operations, including facet buckets computed alongside the primary query.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::product_document::ProductDocument;

/// A single search hit.
///
/// Relevance scores are only a total order within one result set; they must
/// never be compared across distinct queries or index versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub document: ProductDocument,

    /// Relevance score from the search engine. Higher is better.
    pub score: f64,

    /// Highlighted fragments per field, with match markers.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub highlights: HashMap<String, Vec<String>>,
}

/// An aggregated per-value count for one facet field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacetBucket {
    pub value: String,
    pub count: u64,
}

/// A fixed price-range bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBucket {
    /// Range key, e.g. "<50" or "100-500".
    pub key: String,
    pub count: u64,
}

/// Facets computed alongside the primary query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Facets {
    pub categories: Vec<FacetBucket>,
    pub brands: Vec<FacetBucket>,
    pub price_ranges: Vec<PriceBucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_rating: Option<f64>,
}

/// Complete search response with ranked hits, facets, and pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    /// The hits for the requested page, ordered by the requested sort.
    pub hits: Vec<SearchHit>,

    /// Total number of matching documents across all pages.
    pub total: u64,

    /// The 1-based page this response covers.
    pub page: usize,

    /// Total page count: ceil(total / page_size).
    pub pages: u64,

    #[serde(default)]
    pub facets: Facets,

    /// Time taken to execute the search in milliseconds.
    pub took_ms: u64,
}

impl SearchResponse {
    /// Create an empty search response, used when the engine is unavailable.
    pub fn empty() -> Self {
        Self {
            hits: Vec::new(),
            total: 0,
            page: 1,
            pages: 0,
            facets: Facets::default(),
            took_ms: 0,
        }
    }

    /// Returns true if there are no hits.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Returns the number of hits in this page.
    pub fn len(&self) -> usize {
        self.hits.len()
    }
}

/// Total page count for a result set: ceil(total / page_size).
pub fn page_count(total: u64, page_size: usize) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size as u64)
}
