//! Main entry point for the npay analysis service.
//!
//! Loads both price datasets once, then serves the REST API (with
//! OpenAPI/Swagger UI) until the process is stopped. Dataset loading policy:
//! the public dataset is required and a missing file halts startup with the
//! error on screen; the crawled dataset is optional and a missing file only
//! disables its entry, with a warning carried to the client.

use npay_api_rest::AppState;
use npay_core::{CoreConfig, DatasetRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the npay application
///
/// # Environment Variables
/// - `NPAY_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `NPAY_DATA_FILE`: public dataset path (default: "data.csv")
/// - `NPAY_CRAWLED_DATA_FILE`: crawled dataset path (default: "crawled_data.csv")
/// - `NPAY_FEEDBACK_FILE`: feedback log path (default: "feedback.csv")
/// - `NPAY_OUR_HOSPITAL`: distinguished hospital name (default: "삼성서울병원")
/// - `NPAY_DOCUMENT_FONT`: Hangul-capable font for the PDF report
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, dataset loading, or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("npay=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_env()?;
    let registry = match DatasetRegistry::load(&cfg) {
        Ok(registry) => registry,
        Err(error) => {
            tracing::error!("{error}");
            eprintln!(
                "'{}' 파일을 찾을 수 없습니다. 앱과 같은 폴더에 파일을 넣어주세요.",
                cfg.public_dataset_path().display()
            );
            return Err(error.into());
        }
    };

    for entry in registry.entries() {
        match &entry.dataset {
            Some(dataset) => {
                tracing::info!(id = %entry.id, rows = dataset.len(), "dataset loaded")
            }
            None => tracing::warn!(id = %entry.id, "dataset disabled"),
        }
    }
    if npay_export::document_export_available() {
        tracing::info!("document export enabled");
    } else {
        tracing::info!("document export not compiled in; endpoint disabled");
    }

    let addr = std::env::var("NPAY_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let app = npay_api_rest::router(AppState::new(registry, cfg));

    tracing::info!("npay analysis service listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
