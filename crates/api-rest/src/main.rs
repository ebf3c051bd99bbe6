//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the analysis REST server on its own.
//!
//! ## Intended use
//! This binary is useful for development and debugging. The workspace's main
//! `npay-run` binary is the deployment entry point and serves the same router.

use npay_api_rest::AppState;
use npay_core::{CoreConfig, DatasetRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Entry point for the standalone REST server
///
/// Resolves configuration from the environment, loads both datasets (a missing
/// public dataset is fatal; a missing crawled dataset only disables its entry),
/// then serves the router.
///
/// # Environment Variables
/// - `NPAY_REST_ADDR`: server address (default: "0.0.0.0:3000")
/// - `NPAY_DATA_FILE`, `NPAY_CRAWLED_DATA_FILE`, `NPAY_FEEDBACK_FILE`,
///   `NPAY_OUR_HOSPITAL`, `NPAY_DOCUMENT_FONT`: see `CoreConfig::from_env`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("npay=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_env()?;
    let registry = DatasetRegistry::load(&cfg)?;
    for entry in registry.entries() {
        match &entry.dataset {
            Some(dataset) => {
                tracing::info!(id = %entry.id, rows = dataset.len(), "dataset loaded")
            }
            None => tracing::warn!(id = %entry.id, "dataset disabled"),
        }
    }

    let addr = std::env::var("NPAY_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let app = npay_api_rest::router(AppState::new(registry, cfg));

    tracing::info!("REST server listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
