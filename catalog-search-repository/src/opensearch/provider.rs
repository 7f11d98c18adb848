//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use std::time::Duration;

use async_trait::async_trait;
use opensearch::auth::Credentials;
use opensearch::cluster::ClusterHealthParts;
use opensearch::http::request::JsonBody;
use opensearch::http::response::Response;
use opensearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use opensearch::indices::{IndicesCreateParts, IndicesExistsParts, IndicesRefreshParts};
use opensearch::{BulkParts, CountParts, DeleteParts, IndexParts, OpenSearch, SearchParts};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use catalog_search_shared::{
    ProductDocument, SearchLogEntry, SearchQuery, SearchResponse, Suggestion, TrendingTerm,
};

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config::{
    logs_index_settings, products_index_settings, IndexConfig, SUGGEST_CONTEXT_ALL,
};
use crate::opensearch::{query, response};
use crate::types::{BulkIndexSummary, HealthReport};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenSearch provider implementation.
///
/// One provider instance holds one reusable client whose connection pool
/// serves all concurrent callers; no manual locking is performed here.
///
/// # Example
///
/// ```ignore
/// use catalog_search_repository::opensearch::{IndexConfig, OpenSearchProvider};
///
/// let config = IndexConfig::new("shop_", 0);
/// let provider = OpenSearchProvider::new("http://localhost:9200", None, config).await?;
/// provider.ensure_indices().await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL, with
    /// the default request timeout.
    pub async fn new(
        url: &str,
        credentials: Option<(String, String)>,
        index_config: IndexConfig,
    ) -> Result<Self, SearchIndexError> {
        Self::with_timeout(url, credentials, index_config, DEFAULT_TIMEOUT).await
    }

    /// Create a new OpenSearch provider with a custom per-request timeout.
    ///
    /// Every round trip through this provider is bounded by the timeout; an
    /// expired call surfaces as a connection error, which the engine treats
    /// as unavailability.
    pub async fn with_timeout(
        url: &str,
        credentials: Option<(String, String)>,
        index_config: IndexConfig,
        timeout: Duration,
    ) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(timeout);

        if let Some((username, password)) = credentials {
            builder = builder.auth(Credentials::Basic(username, password));
        }

        let transport = builder
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            prefix = %index_config.prefix,
            version = index_config.version,
            "Created OpenSearch provider"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    /// Build the index body for a product document: the serialized document
    /// plus the derived completion entry.
    ///
    /// Every entry carries the "all" context in addition to its own category,
    /// because contexts are mandatory at query time once defined in the
    /// mapping.
    fn document_body(document: &ProductDocument) -> Result<Value, SearchIndexError> {
        let mut body = serde_json::to_value(document)
            .map_err(|e| SearchIndexError::serialization(e.to_string()))?;

        let suggest = json!({
            "input": document.suggest_input(),
            "weight": document.sales.min(i32::MAX as u64),
            "contexts": {
                "category": [document.category.as_str(), SUGGEST_CONTEXT_ALL]
            }
        });

        body.as_object_mut()
            .ok_or_else(|| SearchIndexError::serialization("Document is not a JSON object"))?
            .insert("suggest".to_string(), suggest);

        Ok(body)
    }

    /// Check one index for existence and create it if absent.
    async fn ensure_index(&self, name: &str, settings: Value) -> Result<(), SearchIndexError> {
        let exists = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[name]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if exists.status_code().is_success() {
            debug!(index = %name, "Index already exists");
            return Ok(());
        }
        if exists.status_code().as_u16() != 404 {
            return Err(SearchIndexError::schema(format!(
                "Unexpected status {} checking index {}",
                exists.status_code(),
                name
            )));
        }

        let created = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(name))
            .body(settings)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if !created.status_code().is_success() {
            let error_body = created.text().await.unwrap_or_default();
            error!(index = %name, body = %error_body, "Index creation failed");
            return Err(SearchIndexError::schema(format!(
                "Failed to create index {}: {}",
                name, error_body
            )));
        }

        info!(index = %name, "Created index");
        Ok(())
    }

    /// Read the response body as JSON.
    async fn read_json(response: Response) -> Result<Value, SearchIndexError> {
        response
            .json::<Value>()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))
    }

    /// Current document count of the products index; 0 when unavailable.
    async fn document_count(&self, index: &str) -> u64 {
        let response = match self
            .client
            .count(CountParts::Index(&[index]))
            .send()
            .await
        {
            Ok(response) if response.status_code().is_success() => response,
            _ => return 0,
        };
        match response.json::<Value>().await {
            Ok(body) => body["count"].as_u64().unwrap_or(0),
            Err(_) => 0,
        }
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    async fn ensure_indices(&self) -> Result<(), SearchIndexError> {
        self.ensure_index(&self.index_config.products_index(), products_index_settings())
            .await?;
        self.ensure_index(&self.index_config.logs_index(), logs_index_settings())
            .await?;
        Ok(())
    }

    async fn index_document(&self, document: &ProductDocument) -> Result<(), SearchIndexError> {
        let index = self.index_config.products_index();
        let body = Self::document_body(document)?;

        let response = self
            .client
            .index(IndexParts::IndexId(&index, &document.id))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(product_id = %document.id, status = %status, body = %error_body, "Index request failed");
            return Err(SearchIndexError::index(format!(
                "Index failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(product_id = %document.id, "Document indexed");
        Ok(())
    }

    async fn bulk_index_documents(
        &self,
        documents: &[ProductDocument],
    ) -> Result<BulkIndexSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BulkIndexSummary::empty());
        }

        let index = self.index_config.products_index();
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
        for document in documents {
            body.push(json!({ "index": { "_id": document.id } }).into());
            body.push(Self::document_body(document)?.into());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(&index))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::bulk_index(format!(
                "Bulk failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body = Self::read_json(response).await?;
        let summary = response::parse_bulk_summary(&response_body, documents.len());
        if !summary.all_succeeded() {
            error!(
                failed = summary.failed,
                failed_ids = ?summary.failed_ids,
                "Bulk indexing completed with failures"
            );
        } else {
            debug!(count = summary.succeeded, "Bulk indexed documents");
        }
        Ok(summary)
    }

    async fn delete_document(&self, product_id: &str) -> Result<(), SearchIndexError> {
        let index = self.index_config.products_index();

        let response = self
            .client
            .delete(DeleteParts::IndexId(&index, product_id))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - document may not exist
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            error!(product_id = %product_id, status = %status, body = %error_body, "Delete request failed");
            return Err(SearchIndexError::delete(format!(
                "Delete failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(product_id = %product_id, "Document deleted");
        Ok(())
    }

    async fn search(&self, search_query: &SearchQuery) -> Result<SearchResponse, SearchIndexError> {
        let index = self.index_config.products_index();
        let body = query::build_search_body(search_query);

        let response = self
            .client
            .search(SearchParts::Index(&[index.as_str()]))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Search request failed");
            return Err(SearchIndexError::search(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body = Self::read_json(response).await?;
        response::parse_search_response(&response_body, search_query.page, search_query.page_size)
    }

    async fn autocomplete(
        &self,
        prefix: &str,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Suggestion>, SearchIndexError> {
        let index = self.index_config.products_index();
        let body = query::build_autocomplete_body(prefix, category, limit);

        let response = self
            .client
            .search(SearchParts::Index(&[index.as_str()]))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Suggest request failed");
            return Err(SearchIndexError::search(format!(
                "Suggest failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body = Self::read_json(response).await?;
        Ok(response::parse_suggestions(&response_body))
    }

    async fn find_similar(
        &self,
        product_id: &str,
        limit: usize,
    ) -> Result<Vec<ProductDocument>, SearchIndexError> {
        let index = self.index_config.products_index();
        let body = query::build_similar_body(&index, product_id, limit);

        let response = self
            .client
            .search(SearchParts::Index(&[index.as_str()]))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(product_id = %product_id, status = %status, body = %error_body, "More-like-this request failed");
            return Err(SearchIndexError::search(format!(
                "More-like-this failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body = Self::read_json(response).await?;
        response::parse_documents(&response_body)
    }

    async fn log_search(&self, entry: &SearchLogEntry) -> Result<(), SearchIndexError> {
        let index = self.index_config.logs_index();
        let body =
            serde_json::to_value(entry).map_err(|e| SearchIndexError::serialization(e.to_string()))?;

        let response = self
            .client
            .index(IndexParts::Index(&index))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SearchIndexError::index(format!(
                "Log append failed with status {}: {}",
                status, error_body
            )));
        }

        Ok(())
    }

    async fn trending_searches(
        &self,
        limit: usize,
        window: Duration,
    ) -> Result<Vec<TrendingTerm>, SearchIndexError> {
        let index = self.index_config.logs_index();
        let body = query::build_trending_body(limit, window);

        let response = self
            .client
            .search(SearchParts::Index(&[index.as_str()]))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Trending request failed");
            return Err(SearchIndexError::search(format!(
                "Trending failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body = Self::read_json(response).await?;
        Ok(response::parse_trending(&response_body))
    }

    async fn health(&self) -> Result<HealthReport, SearchIndexError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(SearchIndexError::connection(format!(
                "Cluster health returned status {}",
                status
            )));
        }

        let body = Self::read_json(response).await?;
        let document_count = self
            .document_count(&self.index_config.products_index())
            .await;
        Ok(response::parse_health(&body, document_count))
    }

    async fn refresh_indices(&self) -> Result<(), SearchIndexError> {
        let products = self.index_config.products_index();
        let logs = self.index_config.logs_index();

        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[products.as_str(), logs.as_str()]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(SearchIndexError::unknown(format!(
                "Refresh returned status {}",
                status
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn sample_document() -> ProductDocument {
        ProductDocument {
            id: "p1".to_string(),
            name: "Wireless Headphones".to_string(),
            description: Some("Over-ear".to_string()),
            category: "Electronics".to_string(),
            brand: Some("Acme".to_string()),
            price: 149.99,
            original_price: None,
            discount: None,
            rating: 4.5,
            num_reviews: 10,
            stock: 10,
            tags: vec!["audio".to_string(), "wireless".to_string()],
            attributes: BTreeMap::new(),
            seller_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            views: 5,
            sales: 87,
        }
    }

    #[test]
    fn test_document_body_injects_suggest() {
        let body = OpenSearchProvider::document_body(&sample_document()).unwrap();

        assert_eq!(body["id"], "p1");
        assert_eq!(
            body["suggest"]["input"],
            serde_json::json!(["Wireless Headphones", "audio", "wireless"])
        );
        assert_eq!(body["suggest"]["weight"], 87);
        assert_eq!(
            body["suggest"]["contexts"]["category"],
            serde_json::json!(["Electronics", "all"])
        );
    }

    #[test]
    fn test_document_body_weight_saturates() {
        let mut document = sample_document();
        document.sales = u64::MAX;
        let body = OpenSearchProvider::document_body(&document).unwrap();

        assert_eq!(body["suggest"]["weight"], i32::MAX as u64);
    }
}
