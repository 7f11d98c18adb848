//! Request and response types for search index operations.

use serde::{Deserialize, Serialize};

/// Summary of a bulk indexing operation.
///
/// A failure in any individual item does not roll back successes; the index is
/// a best-effort cache, not a transactional store. The ids that failed are
/// captured so a caller-side re-sync job can retry selectively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkIndexSummary {
    /// Total number of documents in the batch.
    pub total: usize,
    /// Number of documents indexed successfully.
    pub succeeded: usize,
    /// Number of documents that failed.
    pub failed: usize,
    /// Ids of the documents that failed.
    pub failed_ids: Vec<String>,
}

impl BulkIndexSummary {
    /// Summary for an empty batch.
    pub fn empty() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            failed_ids: Vec::new(),
        }
    }

    /// True if every document in the batch was indexed.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Coarse cluster-health classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Green,
    Yellow,
    Red,
    /// The backend could not be reached.
    Disconnected,
}

impl HealthState {
    /// Parse the backend's cluster status string. Unknown values map to `Red`.
    pub fn from_status(status: &str) -> Self {
        match status {
            "green" => Self::Green,
            "yellow" => Self::Yellow,
            _ => Self::Red,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Engine connectivity and index-size report, consumed by operational tooling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthReport {
    pub status: HealthState,
    pub node_count: u64,
    pub active_shards: u64,
    /// Number of documents currently in the products index.
    pub document_count: u64,
}

impl HealthReport {
    /// Report for an unreachable backend.
    pub fn disconnected() -> Self {
        Self {
            status: HealthState::Disconnected,
            node_count: 0,
            active_shards: 0,
            document_count: 0,
        }
    }
}
