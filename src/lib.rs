use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use media_relay_core::models::settings::RelaySettings;

pub mod core;
pub mod platforms;
pub mod routes;
pub mod storage;

pub const DEFAULT_LOG_FILTER: &str = "media_relay=info,tower_http=info";

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<RelaySettings>,
    pub registry: Arc<core::registry::PlatformRegistry>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(settings: RelaySettings) -> anyhow::Result<Self> {
        let upstream = Arc::new(
            core::upstream::UpstreamClient::new(&settings.upstream)
                .context("building upstream client")?,
        );

        let mut registry = core::registry::PlatformRegistry::new();
        registry.register(Arc::new(platforms::youtube::YouTubeRelay::new(
            upstream.clone(),
        )));
        registry.register(Arc::new(platforms::aio::AioRelay::new(upstream)));

        Ok(Self {
            settings: Arc::new(settings),
            registry: Arc::new(registry),
            started_at: Instant::now(),
        })
    }
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let settings = storage::config::load_settings();
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    tracing::info!(
        "upstream {} (probe {:?}, fetch {:?}, detailed errors: {})",
        settings.upstream.base_url,
        settings.upstream.probe_timeout,
        settings.upstream.fetch_timeout,
        settings.upstream.detailed_errors
    );

    let state = AppState::new(settings)?;
    let app = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {}", addr))?;
    tracing::info!("media relay listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running HTTP server")?;

    tracing::info!("media relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {}", err);
    }
}
