//! Query DSL construction.
//!
//! Pure functions that turn search requests into OpenSearch request bodies.
//! Keeping them free of the client makes the ranking and filtering logic
//! directly testable.

use std::time::Duration;

use serde_json::{json, Value};

use catalog_search_shared::{SearchQuery, SortOrder};

use super::index_config::SUGGEST_CONTEXT_ALL;

/// Weighted relevance fields for the multi-field match.
const RELEVANCE_FIELDS: [&str; 5] = [
    "name^3",
    "name.autocomplete^2",
    "description",
    "brand^2",
    "tags^1.5",
];

/// Boost for the exact-phrase match on name, so exact title hits outrank
/// token-fuzzy matches.
const PHRASE_BOOST: f64 = 5.0;

/// Number of leading characters exempt from fuzzy matching, to suppress noisy
/// fuzzy hits on short prefixes.
const FUZZY_PREFIX_LENGTH: u32 = 2;

/// Maximum number of terms extracted from the seed document for
/// more-like-this retrieval.
const MLT_MAX_QUERY_TERMS: u32 = 25;

/// Build the complete search request body: relevance/browse query, exact
/// filters, sort, facet aggregations, pagination, and highlighting, all in
/// one round trip.
pub(crate) fn build_search_body(query: &SearchQuery) -> Value {
    json!({
        "from": query.offset(),
        "size": query.page_size,
        "track_total_hits": true,
        "query": {
            "bool": {
                "must": [relevance_clause(query)],
                "filter": filter_clauses(query)
            }
        },
        "sort": sort_clauses(query.sort),
        "aggs": facet_aggregations(),
        "highlight": {
            "fields": {
                "name": { "number_of_fragments": 0 },
                "description": { "fragment_size": 150, "number_of_fragments": 1 }
            }
        }
    })
}

/// The scoring clause: weighted multi-field match with fuzziness plus an
/// exact-phrase boost when text is present; match-all in browse mode.
fn relevance_clause(query: &SearchQuery) -> Value {
    match query.trimmed_text() {
        Some(text) => json!({
            "bool": {
                "should": [
                    {
                        "multi_match": {
                            "query": text,
                            "fields": RELEVANCE_FIELDS,
                            "fuzziness": "AUTO",
                            "prefix_length": FUZZY_PREFIX_LENGTH
                        }
                    },
                    {
                        "match_phrase": {
                            "name": {
                                "query": text,
                                "boost": PHRASE_BOOST
                            }
                        }
                    }
                ],
                "minimum_should_match": 1
            }
        }),
        None => json!({ "match_all": {} }),
    }
}

/// Non-scoring exact filter clauses.
fn filter_clauses(query: &SearchQuery) -> Vec<Value> {
    let filters = &query.filters;
    let mut clauses = Vec::new();

    if let Some(ref category) = filters.category {
        clauses.push(json!({ "term": { "category": category } }));
    }
    if let Some(ref brand) = filters.brand {
        clauses.push(json!({ "term": { "brand.raw": brand } }));
    }
    if filters.price_min.is_some() || filters.price_max.is_some() {
        let mut range = serde_json::Map::new();
        if let Some(min) = filters.price_min {
            range.insert("gte".to_string(), json!(min));
        }
        if let Some(max) = filters.price_max {
            range.insert("lte".to_string(), json!(max));
        }
        clauses.push(json!({ "range": { "price": range } }));
    }
    if let Some(min_rating) = filters.min_rating {
        clauses.push(json!({ "range": { "rating": { "gte": min_rating } } }));
    }
    if filters.in_stock_only {
        clauses.push(json!({ "range": { "stock": { "gt": 0 } } }));
    }

    clauses
}

fn sort_clauses(sort: SortOrder) -> Value {
    match sort {
        SortOrder::Relevance => json!([{ "_score": { "order": "desc" } }]),
        SortOrder::PriceAsc => json!([{ "price": { "order": "asc" } }]),
        SortOrder::PriceDesc => json!([{ "price": { "order": "desc" } }]),
        SortOrder::Rating => json!([{ "rating": { "order": "desc" } }]),
        SortOrder::Newest => json!([{ "created_at": { "order": "desc" } }]),
        SortOrder::Popularity => json!([
            { "sales": { "order": "desc" } },
            { "views": { "order": "desc" } }
        ]),
    }
}

/// Facet aggregations computed alongside the primary query: category and
/// brand counts, four fixed price buckets, and price/rating averages.
fn facet_aggregations() -> Value {
    json!({
        "categories": { "terms": { "field": "category", "size": 20 } },
        "brands": { "terms": { "field": "brand.raw", "size": 20 } },
        "price_ranges": {
            "range": {
                "field": "price",
                "ranges": [
                    { "key": "<50", "to": 50.0 },
                    { "key": "50-100", "from": 50.0, "to": 100.0 },
                    { "key": "100-500", "from": 100.0, "to": 500.0 },
                    { "key": ">500", "from": 500.0 }
                ]
            }
        },
        "avg_price": { "avg": { "field": "price" } },
        "avg_rating": { "avg": { "field": "rating" } }
    })
}

/// Build a completion-suggest request with fuzzy prefix matching.
///
/// The completion field defines a category context, which makes contexts
/// mandatory at query time; unscoped requests query the "all" context every
/// entry is indexed under.
pub(crate) fn build_autocomplete_body(prefix: &str, category: Option<&str>, limit: usize) -> Value {
    let context = category.unwrap_or(SUGGEST_CONTEXT_ALL);
    json!({
        "suggest": {
            "product_suggest": {
                "prefix": prefix,
                "completion": {
                    "field": "suggest",
                    "size": limit,
                    "skip_duplicates": true,
                    "fuzzy": { "fuzziness": "AUTO" },
                    "contexts": {
                        "category": [context]
                    }
                }
            }
        }
    })
}

/// Build a more-like-this request seeded by an already-indexed document.
///
/// Term-frequency and document-frequency thresholds plus the query-term cap
/// bound cost and filter noise words. The seed is excluded via `must_not`.
pub(crate) fn build_similar_body(products_index: &str, product_id: &str, limit: usize) -> Value {
    json!({
        "size": limit,
        "query": {
            "bool": {
                "must": [
                    {
                        "more_like_this": {
                            "fields": ["name", "description", "category", "tags"],
                            "like": [
                                { "_index": products_index, "_id": product_id }
                            ],
                            "min_term_freq": 1,
                            "min_doc_freq": 1,
                            "max_query_terms": MLT_MAX_QUERY_TERMS
                        }
                    }
                ],
                "must_not": [
                    { "ids": { "values": [product_id] } }
                ]
            }
        }
    })
}

/// Build the trending-terms aggregation over the trailing window.
///
/// Empty query strings are excluded; browse-mode executions carry no text
/// worth trending.
pub(crate) fn build_trending_body(limit: usize, window: Duration) -> Value {
    json!({
        "size": 0,
        "query": {
            "bool": {
                "filter": [
                    { "range": { "timestamp": { "gte": format!("now-{}s", window.as_secs()) } } }
                ],
                "must_not": [
                    { "term": { "query.raw": "" } }
                ]
            }
        },
        "aggs": {
            "trending": {
                "terms": { "field": "query.raw", "size": limit }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_search_shared::SearchFilters;

    #[test]
    fn test_browse_mode_is_match_all() {
        let body = build_search_body(&SearchQuery::browse());
        assert_eq!(body["query"]["bool"]["must"][0], json!({ "match_all": {} }));
        assert_eq!(body["query"]["bool"]["filter"], json!([]));
    }

    #[test]
    fn test_text_query_has_weighted_fields_and_phrase_boost() {
        let body = build_search_body(&SearchQuery::text("wireless headphones"));
        let should = &body["query"]["bool"]["must"][0]["bool"]["should"];

        let multi_match = &should[0]["multi_match"];
        assert_eq!(multi_match["query"], "wireless headphones");
        assert_eq!(
            multi_match["fields"],
            json!(["name^3", "name.autocomplete^2", "description", "brand^2", "tags^1.5"])
        );
        assert_eq!(multi_match["fuzziness"], "AUTO");
        assert_eq!(multi_match["prefix_length"], 2);

        let phrase = &should[1]["match_phrase"]["name"];
        assert_eq!(phrase["query"], "wireless headphones");
        assert_eq!(phrase["boost"], 5.0);

        assert_eq!(
            body["query"]["bool"]["must"][0]["bool"]["minimum_should_match"],
            1
        );
    }

    #[test]
    fn test_whitespace_text_falls_back_to_match_all() {
        let body = build_search_body(&SearchQuery::text("   "));
        assert_eq!(body["query"]["bool"]["must"][0], json!({ "match_all": {} }));
    }

    #[test]
    fn test_filter_clauses() {
        let filters = SearchFilters {
            category: Some("Electronics".to_string()),
            brand: Some("Acme".to_string()),
            price_min: Some(25.0),
            price_max: Some(100.0),
            min_rating: Some(4.0),
            in_stock_only: true,
        };
        let query = SearchQuery::text("tv").with_filters(filters);
        let body = build_search_body(&query);
        let clauses = body["query"]["bool"]["filter"].as_array().unwrap();

        assert_eq!(clauses.len(), 5);
        assert_eq!(clauses[0], json!({ "term": { "category": "Electronics" } }));
        assert_eq!(clauses[1], json!({ "term": { "brand.raw": "Acme" } }));
        assert_eq!(
            clauses[2],
            json!({ "range": { "price": { "gte": 25.0, "lte": 100.0 } } })
        );
        assert_eq!(clauses[3], json!({ "range": { "rating": { "gte": 4.0 } } }));
        assert_eq!(clauses[4], json!({ "range": { "stock": { "gt": 0 } } }));
    }

    #[test]
    fn test_price_range_with_only_upper_bound() {
        let filters = SearchFilters {
            price_max: Some(100.0),
            ..Default::default()
        };
        let query = SearchQuery::browse().with_filters(filters);
        let body = build_search_body(&query);
        let clauses = body["query"]["bool"]["filter"].as_array().unwrap();

        assert_eq!(clauses[0], json!({ "range": { "price": { "lte": 100.0 } } }));
    }

    #[test]
    fn test_pagination_offsets() {
        let body = build_search_body(&SearchQuery::browse().with_page(3).with_page_size(25));
        assert_eq!(body["from"], 50);
        assert_eq!(body["size"], 25);
        assert_eq!(body["track_total_hits"], true);
    }

    #[test]
    fn test_sort_clauses() {
        let sorts = [
            (SortOrder::Relevance, json!([{ "_score": { "order": "desc" } }])),
            (SortOrder::PriceAsc, json!([{ "price": { "order": "asc" } }])),
            (SortOrder::PriceDesc, json!([{ "price": { "order": "desc" } }])),
            (SortOrder::Rating, json!([{ "rating": { "order": "desc" } }])),
            (SortOrder::Newest, json!([{ "created_at": { "order": "desc" } }])),
            (
                SortOrder::Popularity,
                json!([
                    { "sales": { "order": "desc" } },
                    { "views": { "order": "desc" } }
                ]),
            ),
        ];
        for (sort, expected) in sorts {
            let body = build_search_body(&SearchQuery::browse().with_sort(sort));
            assert_eq!(body["sort"], expected, "sort clause for {:?}", sort);
        }
    }

    #[test]
    fn test_facet_aggregations_present() {
        let body = build_search_body(&SearchQuery::browse());
        let aggs = &body["aggs"];

        assert_eq!(aggs["categories"]["terms"]["field"], "category");
        assert_eq!(aggs["brands"]["terms"]["field"], "brand.raw");
        assert_eq!(aggs["avg_price"]["avg"]["field"], "price");
        assert_eq!(aggs["avg_rating"]["avg"]["field"], "rating");

        let ranges = aggs["price_ranges"]["range"]["ranges"].as_array().unwrap();
        assert_eq!(ranges.len(), 4);
        assert_eq!(ranges[0], json!({ "key": "<50", "to": 50.0 }));
        assert_eq!(ranges[3], json!({ "key": ">500", "from": 500.0 }));
    }

    #[test]
    fn test_highlight_windows() {
        let body = build_search_body(&SearchQuery::text("tv"));
        assert_eq!(body["highlight"]["fields"]["name"]["number_of_fragments"], 0);
        assert_eq!(
            body["highlight"]["fields"]["description"]["fragment_size"],
            150
        );
    }

    #[test]
    fn test_autocomplete_body() {
        let body = build_autocomplete_body("wire", Some("Electronics"), 10);
        let completion = &body["suggest"]["product_suggest"]["completion"];

        assert_eq!(body["suggest"]["product_suggest"]["prefix"], "wire");
        assert_eq!(completion["field"], "suggest");
        assert_eq!(completion["size"], 10);
        assert_eq!(completion["fuzzy"]["fuzziness"], "AUTO");
        assert_eq!(completion["contexts"]["category"], json!(["Electronics"]));
    }

    #[test]
    fn test_autocomplete_unscoped_uses_all_context() {
        let body = build_autocomplete_body("wire", None, 5);
        assert_eq!(
            body["suggest"]["product_suggest"]["completion"]["contexts"]["category"],
            json!(["all"])
        );
    }

    #[test]
    fn test_similar_body_excludes_seed() {
        let body = build_similar_body("products_v0", "p1", 6);
        let mlt = &body["query"]["bool"]["must"][0]["more_like_this"];

        assert_eq!(body["size"], 6);
        assert_eq!(
            mlt["fields"],
            json!(["name", "description", "category", "tags"])
        );
        assert_eq!(mlt["like"][0]["_index"], "products_v0");
        assert_eq!(mlt["like"][0]["_id"], "p1");
        assert_eq!(mlt["min_term_freq"], 1);
        assert_eq!(mlt["min_doc_freq"], 1);
        assert_eq!(mlt["max_query_terms"], 25);
        assert_eq!(
            body["query"]["bool"]["must_not"][0],
            json!({ "ids": { "values": ["p1"] } })
        );
    }

    #[test]
    fn test_trending_body() {
        let body = build_trending_body(10, Duration::from_secs(24 * 60 * 60));

        assert_eq!(body["size"], 0);
        assert_eq!(
            body["query"]["bool"]["filter"][0]["range"]["timestamp"]["gte"],
            "now-86400s"
        );
        assert_eq!(body["aggs"]["trending"]["terms"]["field"], "query.raw");
        assert_eq!(body["aggs"]["trending"]["terms"]["size"], 10);
    }
}
