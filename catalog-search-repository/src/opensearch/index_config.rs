//! OpenSearch index configuration and mappings.
//!
//! This module defines the settings and mappings for the two logical indices:
//! the product catalog index and the append-only search-log index.

use serde_json::{json, Value};

/// Configuration for the search indices.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Name prefix applied to every index owned by this component.
    pub prefix: String,
    /// The version number for the indices (e.g., 0 for "products_v0").
    pub version: u32,
}

impl IndexConfig {
    /// Create a new index configuration.
    pub fn new(prefix: impl Into<String>, version: u32) -> Self {
        Self {
            prefix: prefix.into(),
            version,
        }
    }

    /// Versioned name of the product catalog index.
    pub fn products_index(&self) -> String {
        format!("{}{}_v{}", self.prefix, PRODUCTS_INDEX, self.version)
    }

    /// Versioned name of the search-log index.
    pub fn logs_index(&self) -> String {
        format!("{}{}_v{}", self.prefix, LOGS_INDEX, self.version)
    }
}

/// Base name of the product catalog index (without prefix/version).
pub const PRODUCTS_INDEX: &str = "products";

/// Base name of the search-log index (without prefix/version).
pub const LOGS_INDEX: &str = "search_logs";

/// Category context that every completion entry carries in addition to its
/// own category. Contexts are mandatory at query time once defined in the
/// mapping, so unscoped suggest queries ask for this context instead.
pub const SUGGEST_CONTEXT_ALL: &str = "all";

/// Settings and mappings for the product catalog index.
///
/// The configuration includes:
/// - **product_text**: primary relevance analyzer (lowercase, english
///   stemming, word delimiting) for name/description/brand/tags
/// - **autocomplete_index**: edge-n-gram analyzer (min 1 / max 20 chars)
///   enabling prefix matching inside full-text fields, with a plain
///   lowercase search analyzer
/// - **suggest**: a dedicated completion field with a `category` context,
///   independent of the relevance analyzers
/// - keyword fields for filtering and faceting
///
/// Dynamic mapping is disabled so stray fields can never mutate the schema.
pub fn products_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1,
            "analysis": {
                "filter": {
                    "english_stemmer": {
                        "type": "stemmer",
                        "language": "english"
                    },
                    "delimiter": {
                        "type": "word_delimiter_graph",
                        "preserve_original": true
                    },
                    "autocomplete_edge": {
                        "type": "edge_ngram",
                        "min_gram": 1,
                        "max_gram": 20
                    }
                },
                "analyzer": {
                    "product_text": {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase", "english_stemmer", "delimiter"]
                    },
                    "autocomplete_index": {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase", "autocomplete_edge"]
                    },
                    "autocomplete_search": {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase"]
                    }
                }
            }
        },
        "mappings": {
            "dynamic": "false",
            "properties": {
                "id": { "type": "keyword" },
                "name": {
                    "type": "text",
                    "analyzer": "product_text",
                    "fields": {
                        "autocomplete": {
                            "type": "text",
                            "analyzer": "autocomplete_index",
                            "search_analyzer": "autocomplete_search"
                        },
                        "raw": { "type": "keyword" }
                    }
                },
                "description": {
                    "type": "text",
                    "analyzer": "product_text"
                },
                "category": { "type": "keyword" },
                "brand": {
                    "type": "text",
                    "analyzer": "product_text",
                    "fields": {
                        "raw": { "type": "keyword" }
                    }
                },
                "price": { "type": "double" },
                "original_price": { "type": "double" },
                "discount": { "type": "double" },
                "rating": { "type": "float" },
                "num_reviews": { "type": "integer" },
                "stock": { "type": "integer" },
                "tags": {
                    "type": "text",
                    "analyzer": "product_text",
                    "fields": {
                        "raw": { "type": "keyword" }
                    }
                },
                "attributes": {
                    "type": "object",
                    "dynamic": false
                },
                "seller_id": { "type": "keyword" },
                "created_at": { "type": "date" },
                "updated_at": { "type": "date" },
                "views": { "type": "long" },
                "sales": { "type": "long" },
                "suggest": {
                    "type": "completion",
                    "contexts": [
                        {
                            "name": "category",
                            "type": "category"
                        }
                    ]
                }
            }
        }
    })
}

/// Settings and mappings for the append-only search-log index.
///
/// `query` carries a `raw` keyword subfield for the trending-terms
/// aggregation; the filters snapshot is stored but not indexed.
pub fn logs_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "dynamic": "false",
            "properties": {
                "query": {
                    "type": "text",
                    "fields": {
                        "raw": { "type": "keyword" }
                    }
                },
                "user_id": { "type": "keyword" },
                "session_id": { "type": "keyword" },
                "results_count": { "type": "integer" },
                "clicked_product": { "type": "keyword" },
                "filters": {
                    "type": "object",
                    "enabled": false
                },
                "timestamp": { "type": "date" }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_names() {
        let config = IndexConfig::new("shop_", 0);
        assert_eq!(config.products_index(), "shop_products_v0");
        assert_eq!(config.logs_index(), "shop_search_logs_v0");

        let config = IndexConfig::new("", 3);
        assert_eq!(config.products_index(), "products_v3");
        assert_eq!(config.logs_index(), "search_logs_v3");
    }

    #[test]
    fn test_products_settings_structure() {
        let settings = products_index_settings();

        assert!(settings["settings"]["number_of_shards"].is_number());
        assert_eq!(
            settings["settings"]["analysis"]["filter"]["autocomplete_edge"]["min_gram"],
            1
        );
        assert_eq!(
            settings["settings"]["analysis"]["filter"]["autocomplete_edge"]["max_gram"],
            20
        );

        let analyzer = &settings["settings"]["analysis"]["analyzer"]["product_text"];
        assert_eq!(
            analyzer["filter"],
            serde_json::json!(["lowercase", "english_stemmer", "delimiter"])
        );
    }

    #[test]
    fn test_products_mapping_fields() {
        let settings = products_index_settings();
        let properties = &settings["mappings"]["properties"];

        assert_eq!(properties["id"]["type"], "keyword");
        assert_eq!(properties["name"]["analyzer"], "product_text");
        assert_eq!(
            properties["name"]["fields"]["autocomplete"]["analyzer"],
            "autocomplete_index"
        );
        assert_eq!(
            properties["name"]["fields"]["autocomplete"]["search_analyzer"],
            "autocomplete_search"
        );
        assert_eq!(properties["category"]["type"], "keyword");
        assert_eq!(properties["brand"]["fields"]["raw"]["type"], "keyword");
        assert_eq!(properties["attributes"]["dynamic"], false);
        assert_eq!(settings["mappings"]["dynamic"], "false");
    }

    #[test]
    fn test_completion_field_has_category_context() {
        let settings = products_index_settings();
        let suggest = &settings["mappings"]["properties"]["suggest"];

        assert_eq!(suggest["type"], "completion");
        assert_eq!(suggest["contexts"][0]["name"], "category");
        assert_eq!(suggest["contexts"][0]["type"], "category");
    }

    #[test]
    fn test_logs_mapping_fields() {
        let settings = logs_index_settings();
        let properties = &settings["mappings"]["properties"];

        assert_eq!(properties["query"]["fields"]["raw"]["type"], "keyword");
        assert_eq!(properties["timestamp"]["type"], "date");
        assert_eq!(properties["filters"]["enabled"], false);
    }
}
