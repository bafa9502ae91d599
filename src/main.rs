//! `paylog` service binary.
//!
//! Loads configuration, opens the SQLite store, makes the period containing
//! today current, and serves the HTTP API.

use std::path::Path;

use chrono::Local;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paylog_engine::api::{AppState, create_router};
use paylog_engine::config::{ConfigLoader, EngineConfig};
use paylog_engine::error::EngineResult;
use paylog_engine::ledger::PayLedger;
use paylog_engine::store::SqliteStore;

const CONFIG_ENV: &str = "PAYLOG_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "paylog.yaml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = load_config()?;
    info!(
        anchor_date = %config.anchor_date,
        database_path = %config.database_path,
        "Configuration loaded"
    );

    let store = SqliteStore::open(&config.database_path)?;
    let mut ledger = PayLedger::from_config(store, &config);
    ledger.reconcile_current(Local::now().date_naive())?;

    let router = create_router(AppState::new(ledger));
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(bind_address = %config.bind_address, "Pay log service listening");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Reads the config file named by `PAYLOG_CONFIG`, or defaults when it is absent.
fn load_config() -> EngineResult<EngineConfig> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        warn!(path = %path, "Configuration file not found, using defaults");
        return Ok(EngineConfig::default());
    }
    Ok(ConfigLoader::load(&path)?.into_config())
}
