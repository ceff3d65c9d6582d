use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = subfuse::config::Cli::parse();
    run_server(cli.config).await
}

async fn run_server(config: subfuse::config::Config) -> Result<()> {
    if config.subscription_urls().is_empty() {
        warn!("no subscription URLs configured; requests will fail until SUBFUSE_SUB_URLS is set");
    }
    if config.access_token.is_empty() {
        warn!("no access token configured; the subscription endpoint is open to anyone");
    }

    let fetcher = subfuse::fetch::Fetcher::new(
        &config.user_agent,
        Duration::from_secs(config.fetch_timeout_secs),
    )?;

    let bind = config.bind;
    let app = subfuse::http::build_router(subfuse::http::AppState {
        config: Arc::new(config),
        fetcher,
    })
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive());

    info!(bind = %bind, "starting subfuse");
    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).compact().init();
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
