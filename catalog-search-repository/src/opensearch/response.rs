//! Response parsing for OpenSearch request bodies.
//!
//! Pure functions that turn raw backend JSON into the shared result types,
//! testable against canned responses.

use std::collections::HashMap;

use serde_json::Value;

use catalog_search_shared::{
    page_count, FacetBucket, Facets, PriceBucket, ProductDocument, SearchHit, SearchResponse,
    Suggestion, TrendingTerm,
};

use crate::errors::SearchIndexError;
use crate::types::{BulkIndexSummary, HealthReport, HealthState};

use super::index_config::SUGGEST_CONTEXT_ALL;

/// Parse a full search response: ranked hits with highlights, facets, total
/// count, and the derived page count.
pub(crate) fn parse_search_response(
    body: &Value,
    page: usize,
    page_size: usize,
) -> Result<SearchResponse, SearchIndexError> {
    let total = body["hits"]["total"]["value"].as_u64().unwrap_or(0);
    let took_ms = body["took"].as_u64().unwrap_or(0);

    let mut hits = Vec::new();
    if let Some(raw_hits) = body["hits"]["hits"].as_array() {
        for raw in raw_hits {
            let document: ProductDocument = serde_json::from_value(raw["_source"].clone())
                .map_err(|e| SearchIndexError::parse(format!("Invalid hit source: {}", e)))?;
            // _score is null when sorting by a field instead of relevance
            let score = raw["_score"].as_f64().unwrap_or(0.0);
            hits.push(SearchHit {
                document,
                score,
                highlights: parse_highlights(&raw["highlight"]),
            });
        }
    }

    Ok(SearchResponse {
        hits,
        total,
        page,
        pages: page_count(total, page_size),
        facets: parse_facets(&body["aggregations"]),
        took_ms,
    })
}

fn parse_highlights(highlight: &Value) -> HashMap<String, Vec<String>> {
    let mut highlights = HashMap::new();
    if let Some(fields) = highlight.as_object() {
        for (field, fragments) in fields {
            let fragments: Vec<String> = fragments
                .as_array()
                .map(|frags| {
                    frags
                        .iter()
                        .filter_map(|f| f.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            if !fragments.is_empty() {
                highlights.insert(field.clone(), fragments);
            }
        }
    }
    highlights
}

/// Parse the facet aggregations computed alongside the primary query.
pub(crate) fn parse_facets(aggregations: &Value) -> Facets {
    Facets {
        categories: parse_terms_buckets(&aggregations["categories"]),
        brands: parse_terms_buckets(&aggregations["brands"]),
        price_ranges: parse_range_buckets(&aggregations["price_ranges"]),
        avg_price: aggregations["avg_price"]["value"].as_f64(),
        avg_rating: aggregations["avg_rating"]["value"].as_f64(),
    }
}

fn parse_terms_buckets(aggregation: &Value) -> Vec<FacetBucket> {
    aggregation["buckets"]
        .as_array()
        .map(|buckets| {
            buckets
                .iter()
                .filter_map(|bucket| {
                    Some(FacetBucket {
                        value: bucket["key"].as_str()?.to_string(),
                        count: bucket["doc_count"].as_u64().unwrap_or(0),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_range_buckets(aggregation: &Value) -> Vec<PriceBucket> {
    aggregation["buckets"]
        .as_array()
        .map(|buckets| {
            buckets
                .iter()
                .filter_map(|bucket| {
                    Some(PriceBucket {
                        key: bucket["key"].as_str()?.to_string(),
                        count: bucket["doc_count"].as_u64().unwrap_or(0),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Parse completion-suggest options into ranked suggestions, de-duplicating
/// repeated texts case-insensitively.
pub(crate) fn parse_suggestions(body: &Value) -> Vec<Suggestion> {
    let mut seen: Vec<String> = Vec::new();
    let mut suggestions = Vec::new();

    let entries = body["suggest"]["product_suggest"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    for entry in &entries {
        let options = match entry["options"].as_array() {
            Some(options) => options,
            None => continue,
        };
        for option in options {
            let text = match option["text"].as_str() {
                Some(text) => text,
                None => continue,
            };
            let folded = text.to_lowercase();
            if seen.contains(&folded) {
                continue;
            }
            seen.push(folded);
            suggestions.push(Suggestion {
                text: text.to_string(),
                score: option["_score"].as_f64().unwrap_or(0.0),
                category: suggestion_category(option),
            });
        }
    }

    suggestions
}

/// The category context of a suggest option: the source document's category
/// when returned, otherwise the first non-"all" query context.
fn suggestion_category(option: &Value) -> Option<String> {
    if let Some(category) = option["_source"]["category"].as_str() {
        return Some(category.to_string());
    }
    option["contexts"]["category"]
        .as_array()?
        .iter()
        .filter_map(|c| c.as_str())
        .find(|c| *c != SUGGEST_CONTEXT_ALL)
        .map(str::to_string)
}

/// Parse plain document hits (no scores or highlights), as returned by
/// more-like-this retrieval.
pub(crate) fn parse_documents(body: &Value) -> Result<Vec<ProductDocument>, SearchIndexError> {
    let mut documents = Vec::new();
    if let Some(raw_hits) = body["hits"]["hits"].as_array() {
        for raw in raw_hits {
            let document: ProductDocument = serde_json::from_value(raw["_source"].clone())
                .map_err(|e| SearchIndexError::parse(format!("Invalid hit source: {}", e)))?;
            documents.push(document);
        }
    }
    Ok(documents)
}

/// Parse the trending-terms aggregation buckets.
pub(crate) fn parse_trending(body: &Value) -> Vec<TrendingTerm> {
    body["aggregations"]["trending"]["buckets"]
        .as_array()
        .map(|buckets| {
            buckets
                .iter()
                .filter_map(|bucket| {
                    Some(TrendingTerm {
                        term: bucket["key"].as_str()?.to_string(),
                        count: bucket["doc_count"].as_u64().unwrap_or(0),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Parse a `_bulk` response into a partial-failure summary.
///
/// Each item reports its own status; failed ids are collected so the caller
/// can retry selectively. Successes are never rolled back.
pub(crate) fn parse_bulk_summary(body: &Value, total: usize) -> BulkIndexSummary {
    if body["errors"].as_bool() != Some(true) {
        return BulkIndexSummary {
            total,
            succeeded: total,
            failed: 0,
            failed_ids: Vec::new(),
        };
    }

    let mut failed_ids = Vec::new();
    if let Some(items) = body["items"].as_array() {
        for item in items {
            // each item is keyed by its action, e.g. {"index": {...}}
            let result = item
                .as_object()
                .and_then(|obj| obj.values().next())
                .cloned()
                .unwrap_or(Value::Null);
            if !result["error"].is_null() {
                if let Some(id) = result["_id"].as_str() {
                    failed_ids.push(id.to_string());
                }
            }
        }
    }

    let failed = failed_ids.len();
    BulkIndexSummary {
        total,
        succeeded: total.saturating_sub(failed),
        failed,
        failed_ids,
    }
}

/// Parse the cluster-health body into a health report.
pub(crate) fn parse_health(body: &Value, document_count: u64) -> HealthReport {
    let status = body["status"]
        .as_str()
        .map(HealthState::from_status)
        .unwrap_or(HealthState::Red);
    HealthReport {
        status,
        node_count: body["number_of_nodes"].as_u64().unwrap_or(0),
        active_shards: body["active_shards"].as_u64().unwrap_or(0),
        document_count,
    }
}
