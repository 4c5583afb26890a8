use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use wxp_db::DbClient;
use wxp_pipeline::WeatherPipeline;
use wxp_upstream::{LocationRequest, OpenMeteoClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Observability
    wxp_obs::init("wxpd");

    // Config
    let cfg = wxp_config::AppConfig::load().unwrap_or_default();

    // Store is constructed once here and injected everywhere else
    let db = DbClient::open(cfg.database_path())
        .await
        .context("failed to open weather store")?;
    db.ping().await.context("weather store ping failed")?;

    let provider = OpenMeteoClient::new(cfg.upstream_base_url(), cfg.upstream_timeout())
        .context("failed to build upstream client")?;

    let pipeline =
        WeatherPipeline::new(Arc::new(provider), db).with_max_points(cfg.max_points());

    // Age out stale rows from previous runs
    match pipeline.prune_retention(cfg.retention_days()).await {
        Ok(deleted) if deleted > 0 => tracing::info!(deleted, "startup retention prune"),
        Ok(_) => {}
        Err(err) => tracing::warn!(error = %err, "startup retention prune failed"),
    }

    // Prime the store with the configured default location; the service
    // still comes up when the provider is unreachable
    let (latitude, longitude, name) = cfg.default_location();
    let location = LocationRequest::named(latitude, longitude, name);
    match pipeline.ingest(&location, 24).await {
        Ok(report) => tracing::info!(stored = report.stored, "initial ingest complete"),
        Err(err) => tracing::warn!(error = %err, "initial ingest skipped"),
    }

    let (app, _state) = wxp_server::build_app(pipeline);

    let addr: SocketAddr = cfg
        .http_bind()
        .parse()
        .context("invalid HTTP bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind TCP listener")?;

    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
