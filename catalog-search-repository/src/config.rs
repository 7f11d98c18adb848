//! Configuration types for the CatalogSearchService.

/// Configuration for the CatalogSearchService.
///
/// Controls resource usage around batch operations and suggestion sizes so
/// that a misbehaving caller cannot send overly large requests to the search
/// backend.
#[derive(Debug, Clone)]
pub struct CatalogSearchServiceConfig {
    /// Maximum number of documents allowed in a single bulk operation.
    ///
    /// Set to `None` to disable the limit (not recommended for production).
    /// Defaults to 1000 if not specified.
    pub max_batch_size: Option<usize>,

    /// Maximum number of suggestions or similar documents per request.
    /// Requests above this are clamped, not rejected.
    pub max_fanout: usize,
}

impl Default for CatalogSearchServiceConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(1000),
            max_fanout: 50,
        }
    }
}

impl CatalogSearchServiceConfig {
    /// Create a config with no batch size limit.
    ///
    /// # Warning
    ///
    /// Use with caution. Removing batch size limits can lead to memory issues
    /// and timeouts when processing very large batches.
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
            ..Self::default()
        }
    }

    /// Create a config with a custom batch size limit.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
            ..Self::default()
        }
    }
}
