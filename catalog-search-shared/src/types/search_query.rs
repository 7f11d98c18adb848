//! Search query types for the catalog search engine.
//!
//! This module defines the query structure used to search the product index.

use serde::{Deserialize, Serialize};

/// Default page size for search results.
const DEFAULT_PAGE_SIZE: usize = 20;

/// Maximum page size for search results.
const MAX_PAGE_SIZE: usize = 100;

/// Sort order for search results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Rank by text relevance. This is the default.
    #[default]
    Relevance,
    /// Price, low to high.
    PriceAsc,
    /// Price, high to low.
    PriceDesc,
    /// Customer rating, best first.
    Rating,
    /// Newest arrivals first.
    Newest,
    /// Sales count, views as tie-break.
    Popularity,
}

impl SortOrder {
    pub fn from_str(s: &str) -> Self {
        match s {
            "price_asc" => Self::PriceAsc,
            "price_desc" => Self::PriceDesc,
            "rating" => Self::Rating,
            "newest" => Self::Newest,
            "popularity" => Self::Popularity,
            _ => Self::Relevance,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Rating => "rating",
            Self::Newest => "newest",
            Self::Popularity => "popularity",
        }
    }
}

/// Non-scoring, exact filters applied to a search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Inclusive lower price bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    /// Inclusive upper price bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
    /// Minimum rating threshold (rating >= value).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f32>,
    /// Only return documents with stock > 0.
    #[serde(default)]
    pub in_stock_only: bool,
}

impl SearchFilters {
    /// Returns true if no filter is set.
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.brand.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.min_rating.is_none()
            && !self.in_stock_only
    }
}

/// Search query parameters.
///
/// A query with neither text nor filters is browse mode and matches every
/// document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchQuery {
    /// The free-text query. Supports fuzzy matching; `None` means browse mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default)]
    pub filters: SearchFilters,

    #[serde(default)]
    pub sort: SortOrder,

    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: usize,

    /// Number of results per page. Capped at 100.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::browse()
    }
}

impl SearchQuery {
    /// Create a browse-mode query (no text, no filters).
    pub fn browse() -> Self {
        Self {
            text: None,
            filters: SearchFilters::default(),
            sort: SortOrder::default(),
            page: default_page(),
            page_size: default_page_size(),
        }
    }

    /// Create a free-text query.
    ///
    /// # Example
    ///
    /// ```
    /// use catalog_search_shared::SearchQuery;
    ///
    /// let query = SearchQuery::text("wireless headphones");
    /// ```
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::browse()
        }
    }

    /// Set the filters.
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Set the sort order.
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Set the 1-based page number.
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Set the page size. Capped at 100.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.min(MAX_PAGE_SIZE);
        self
    }

    /// Offset of the first result for the requested page.
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    /// Returns the trimmed query text, if any non-whitespace text was given.
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Validate the query parameters.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.page < 1 {
            return Err("Page must be >= 1".to_string());
        }
        if self.page_size < 1 {
            return Err("Page size must be >= 1".to_string());
        }
        if self.page_size > MAX_PAGE_SIZE {
            return Err(format!("Page size cannot exceed {}", MAX_PAGE_SIZE));
        }
        if let Some(min) = self.filters.price_min {
            if min < 0.0 {
                return Err("price_min cannot be negative".to_string());
            }
        }
        if let Some(max) = self.filters.price_max {
            if max < 0.0 {
                return Err("price_max cannot be negative".to_string());
            }
        }
        if let (Some(min), Some(max)) = (self.filters.price_min, self.filters.price_max) {
            if min > max {
                return Err("price_min cannot exceed price_max".to_string());
            }
        }
        if let Some(rating) = self.filters.min_rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err("min_rating must be between 0 and 5".to_string());
            }
        }
        Ok(())
    }
}
