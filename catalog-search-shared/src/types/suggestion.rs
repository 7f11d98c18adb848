//! Autocomplete suggestion types.

use serde::{Deserialize, Serialize};

/// A ranked autocomplete suggestion.
///
/// Suggestions come from the dedicated completion structure, not the
/// relevance pipeline; scores are comparable only within one suggest call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub text: String,
    pub score: f64,
    /// Category context the suggestion was indexed under, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}
