//! Search analytics log types.
//!
//! Log entries are append-only: they are written once per executed query and
//! read back only for trend aggregation over a trailing window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::search_query::SearchFilters;

/// One executed search query, as recorded in the analytics log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchLogEntry {
    /// The raw query text as the user typed it.
    pub query: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Number of results the query returned.
    pub results_count: u64,

    /// Product the user clicked from the result list, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clicked_product: Option<String>,

    /// Snapshot of the filters active at query time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchFilters>,

    pub timestamp: DateTime<Utc>,
}

impl SearchLogEntry {
    /// Create a log entry for an executed query, stamped now.
    pub fn new(query: impl Into<String>, results_count: u64) -> Self {
        Self {
            query: query.into(),
            user_id: None,
            session_id: None,
            results_count,
            clicked_product: None,
            filters: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = Some(filters);
        self
    }
}

/// An aggregated trending search term.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendingTerm {
    pub term: String,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stamps_timestamp() {
        let entry = SearchLogEntry::new("headphones", 12);
        assert_eq!(entry.query, "headphones");
        assert_eq!(entry.results_count, 12);
        assert!(entry.user_id.is_none());
        assert!((Utc::now() - entry.timestamp).num_seconds() < 5);
    }

    #[test]
    fn test_builders() {
        let filters = SearchFilters {
            category: Some("Electronics".to_string()),
            ..Default::default()
        };
        let entry = SearchLogEntry::new("tv", 3)
            .with_user("u1")
            .with_session("s1")
            .with_filters(filters.clone());

        assert_eq!(entry.user_id.as_deref(), Some("u1"));
        assert_eq!(entry.session_id.as_deref(), Some("s1"));
        assert_eq!(entry.filters, Some(filters));
    }

    #[test]
    fn test_serialization_round_trip() {
        let entry = SearchLogEntry::new("laptop stand", 0).with_session("s9");
        let json = serde_json::to_string(&entry).unwrap();
        let deserialized: SearchLogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, deserialized);
    }
}
