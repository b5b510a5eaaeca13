//! SharePoint content export — Binary Entrypoint
//! Boots the Axum HTTP server with the Graph connector, site list and `/metrics`.

use shuttle_axum::ShuttleAxum;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sharepoint_content_export::api;
use sharepoint_content_export::config::AppConfig;

/// Compact logs by default, JSON with LOG_FORMAT=json. Filter via RUST_LOG.
/// The hosting runtime may already own the global subscriber; that's fine.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sharepoint_content_export=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
            .ok();
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = AppConfig::from_env()?;
    info!(
        sites = config.sites.len(),
        policy = ?config.failure_policy,
        max_depth = config.max_depth,
        downloads = config.download_dir.is_some(),
        graph = %config.graph.base_url,
        "configuration loaded"
    );

    let router = api::router_from_config(&config)?;
    Ok(router.into())
}
