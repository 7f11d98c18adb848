//! Catalog Search Status Runner
//!
//! Operational entry point for the catalog search engine. Boots the engine,
//! verifies the index schemas, and reports backend health on an interval
//! until interrupted. In the default degraded connection mode an unreachable
//! backend does not abort startup; the health loop keeps probing and the
//! engine re-enables itself when the backend comes back.

use std::env;
use std::time::Duration;

use dotenv::dotenv;
use tokio::time::interval;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog_search::{Dependencies, EngineError};

/// Default interval between health reports, in seconds.
const DEFAULT_HEALTH_INTERVAL_SECS: u64 = 60;

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("catalog_search=info,catalog_search_repository=info"));

    if env::var("LOG_JSON").is_ok() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();
    }

    info!(
        service_name = "catalog-search",
        service_version = env!("CARGO_PKG_VERSION"),
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    info!("Starting catalog search engine");

    let deps = match Dependencies::new().await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let health_interval = env::var("HEALTH_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_HEALTH_INTERVAL_SECS);
    let mut ticker = interval(Duration::from_secs(health_interval));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = deps.engine.health_check().await;
                let (dropped, failed) = deps.engine.analytics_loss();
                info!(
                    status = report.status.as_str(),
                    nodes = report.node_count,
                    active_shards = report.active_shards,
                    documents = report.document_count,
                    analytics_dropped = dropped,
                    analytics_failed = failed,
                    "Search engine health"
                );
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    error!(error = %e, "Failed to listen for shutdown signal");
                }
                info!("Shutting down");
                break;
            }
        }
    }

    deps.engine.shutdown().await;
    Ok(())
}
