use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use triage_core::config::{patient_data_dir_from_env_value, vital_catalog_from_env_value};
use triage_core::{CoreConfig, YamlStore};

/// Main entry point for the triage intake service
///
/// Resolves configuration once, seeds the vital catalog if the data directory has none, and
/// serves the REST API until the process is stopped.
///
/// # Environment Variables
/// - `TRIAGE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PATIENT_DATA_DIR`: Directory for patient data storage (default: "patient_data")
/// - `TRIAGE_VITAL_CATALOG`: Optional path to the vital catalog file
/// - `API_KEY`: API key every triage request must present (required)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("triage=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("TRIAGE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let api_key = std::env::var("API_KEY").context("API_KEY must be set")?;

    let patient_data_dir: PathBuf =
        patient_data_dir_from_env_value(std::env::var("PATIENT_DATA_DIR").ok());
    let vital_catalog = vital_catalog_from_env_value(std::env::var("TRIAGE_VITAL_CATALOG").ok());
    let cfg = Arc::new(CoreConfig::new(patient_data_dir, vital_catalog)?);

    let store = Arc::new(YamlStore::new(cfg.clone()));
    store.seed_catalog()?;

    tracing::info!("++ Starting triage REST on {}", rest_addr);
    tracing::info!("++ Patient data in {}", cfg.patient_data_dir().display());

    let app = router(AppState::new(store, api_key));
    let listener = tokio::net::TcpListener::bind(&rest_addr)
        .await
        .with_context(|| format!("failed to bind {rest_addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
