//! Dependency initialization and wiring for the catalog search engine.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use catalog_search_repository::opensearch::IndexConfig;
use catalog_search_repository::{CatalogSearchService, OpenSearchProvider, SearchIndexProvider};

use crate::engine::CatalogSearchEngine;
use crate::synchronizer::DocumentSynchronizer;
use crate::EngineError;

/// Default search engine URL.
const DEFAULT_SEARCH_ENGINE_URL: &str = "http://localhost:9200";

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Behavior when the search backend is unreachable at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Abort startup if the backend cannot be reached.
    FailFast,
    /// Start in unavailable mode; the health loop keeps probing.
    /// This is the default: search is an enhancement, not a dependency
    /// of catalog availability.
    Degraded,
}

impl ConnectionMode {
    /// Parse connection mode from environment variable.
    ///
    /// Valid values: "fail-fast" or "degraded" (case-insensitive).
    /// Defaults to "degraded" if not set or invalid.
    fn from_env() -> Self {
        match env::var("SEARCH_CONNECTION_MODE")
            .unwrap_or_else(|_| "degraded".to_string())
            .to_lowercase()
            .as_str()
        {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "degraded" => Self::Degraded,
            _ => {
                warn!("Invalid SEARCH_CONNECTION_MODE, defaulting to 'degraded'");
                Self::Degraded
            }
        }
    }
}

/// Engine configuration, normally read from the environment at process start.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Search backend URL.
    pub url: String,
    /// Optional basic-auth credentials.
    pub credentials: Option<(String, String)>,
    /// Prefix applied to every index name.
    pub index_prefix: String,
    /// Index schema version.
    pub index_version: u32,
    /// Bound on every backend round trip.
    pub timeout: Duration,
    pub connection_mode: ConnectionMode,
}

impl SearchConfig {
    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_ENGINE_URL`: backend URL (default: http://localhost:9200)
    /// - `SEARCH_USERNAME` / `SEARCH_PASSWORD`: basic-auth credentials
    /// - `INDEX_PREFIX`: index name prefix (default: empty)
    /// - `INDEX_VERSION`: index schema version (default: 0)
    /// - `SEARCH_TIMEOUT_SECS`: per-request timeout (default: 10)
    /// - `SEARCH_CONNECTION_MODE`: "fail-fast" or "degraded" (default: degraded)
    pub fn from_env() -> Self {
        let url =
            env::var("SEARCH_ENGINE_URL").unwrap_or_else(|_| DEFAULT_SEARCH_ENGINE_URL.to_string());
        let credentials = match (env::var("SEARCH_USERNAME"), env::var("SEARCH_PASSWORD")) {
            (Ok(username), Ok(password)) if !username.is_empty() => Some((username, password)),
            _ => None,
        };
        let index_prefix = env::var("INDEX_PREFIX").unwrap_or_default();
        let index_version = env::var("INDEX_VERSION")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);
        let timeout_secs = env::var("SEARCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            url,
            credentials,
            index_prefix,
            index_version,
            timeout: Duration::from_secs(timeout_secs),
            connection_mode: ConnectionMode::from_env(),
        }
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The query facade exposed to the web layer.
    pub engine: CatalogSearchEngine,
    /// The write path invoked by catalog store hooks.
    pub synchronizer: DocumentSynchronizer,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    pub async fn new() -> Result<Self, EngineError> {
        Self::with_config(SearchConfig::from_env()).await
    }

    /// Initialize all dependencies from an explicit configuration.
    ///
    /// Builds the provider, verifies the index schemas, and wires the engine
    /// and synchronizer. A malformed configuration (e.g. an unparseable URL)
    /// always fails fast; an unreachable backend aborts startup only in
    /// fail-fast mode, otherwise the engine starts unavailable and the
    /// health loop keeps probing.
    pub async fn with_config(config: SearchConfig) -> Result<Self, EngineError> {
        info!(
            url = %config.url,
            index_prefix = %config.index_prefix,
            index_version = config.index_version,
            timeout_secs = config.timeout.as_secs(),
            connection_mode = ?config.connection_mode,
            "Initializing catalog search dependencies"
        );

        let index_config = IndexConfig::new(config.index_prefix.clone(), config.index_version);
        let provider = OpenSearchProvider::with_timeout(
            &config.url,
            config.credentials.clone(),
            index_config,
            config.timeout,
        )
        .await
        .map_err(|e| EngineError::config(format!("Failed to create search provider: {}", e)))?;

        let provider: Arc<dyn SearchIndexProvider> = Arc::new(provider);
        let service = CatalogSearchService::new(provider);
        let engine = CatalogSearchEngine::with_service(service.clone());

        // Verify index schemas; idempotent. A schema conflict or unreachable
        // backend disables search rather than aborting the host.
        match service.ensure_indices().await {
            Ok(()) => info!("Search indices ready"),
            Err(e) => match config.connection_mode {
                ConnectionMode::FailFast => {
                    return Err(EngineError::config(format!(
                        "Failed to ensure search indices: {}",
                        e
                    )));
                }
                ConnectionMode::Degraded => {
                    warn!(
                        error = %e,
                        "Search backend not ready at startup; starting in unavailable mode"
                    );
                    engine.mark_unavailable();
                }
            },
        }

        let synchronizer = DocumentSynchronizer::new(service);

        Ok(Self {
            engine,
            synchronizer,
        })
    }
}
