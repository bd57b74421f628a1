//! WhyLayer Core — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the source manager, shared log store,
//! and the Prometheus exporter.

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use whylayer::api::{self, AppState};
use whylayer::config::AppConfig;
use whylayer::metrics::Metrics;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("whylayer=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = AppConfig::load().context("loading configuration")?;
    let metrics = Metrics::init();

    let state = AppState::from_config(&cfg)?;
    let router = api::create_router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    tracing::info!(addr = %cfg.bind_addr, "whylayer core listening");

    axum::serve(listener, router).await?;
    Ok(())
}
