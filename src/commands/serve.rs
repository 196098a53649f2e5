//! HTTP server command implementation.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use health_connect::analysis::AnalysisService;
use health_connect::background::BackgroundTasks;
use health_connect::cache::ResponseCache;
use health_connect::config::{API_KEY_ENV, Config};
use health_connect::llm::{GeminiProvider, GenerationGateway};
use health_connect::server::{self, AppState};
use health_connect::session::SessionManager;
use health_connect::store::FileSessionStore;

pub async fn run(
    config_path: &str,
    host_override: Option<IpAddr>,
    port_override: Option<u16>,
) -> Result<()> {
    let mut config = Config::load(config_path)
        .await
        .with_context(|| format!("Failed to load config from {config_path}"))?;

    // CLI overrides config
    if let Some(host) = host_override {
        config.server.host = host.to_string();
    }
    if let Some(port) = port_override {
        config.server.port = port;
    }

    let api_key = config.gemini.resolve_api_key().with_context(|| {
        format!("No Gemini API key configured; set gemini.api_key or {API_KEY_ENV}")
    })?;

    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")?;
    let provider = GeminiProvider::new(client, api_key, config.gemini.base_url.clone());
    let gateway = GenerationGateway::new(Arc::new(provider), config.gemini.gateway_config());

    let shutdown = CancellationToken::new();
    let background_tasks = BackgroundTasks::new();

    // Response cache
    let cache = ResponseCache::new(Duration::from_secs(config.cache.ttl_seconds));
    cache.spawn_purge_task(
        Duration::from_secs(config.cache.purge_interval_seconds.max(1)),
        shutdown.clone(),
    );

    // Session store
    let sessions_dir = config.sessions_dir(Path::new(config_path));
    tokio::fs::create_dir_all(&sessions_dir)
        .await
        .with_context(|| format!("Failed to create {}", sessions_dir.display()))?;
    info!(path = %sessions_dir.display(), "Using session directory");
    let store = Arc::new(FileSessionStore::new(&sessions_dir, config.sessions.ttl()));
    let sessions = SessionManager::new(store, gateway.clone(), background_tasks.clone());
    sessions.spawn_purge_task(
        Duration::from_secs(config.sessions.purge_interval_seconds.max(1)),
        shutdown.clone(),
    );

    let state = AppState {
        sessions,
        analysis: AnalysisService::new(cache, gateway),
        max_connections: config.server.max_connections,
    };
    let app = server::build_app(state, config.server.request_timeout_seconds);

    let ip: IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid host '{}'", config.server.host))?;
    let addr = SocketAddr::new(ip, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(addr = %addr, "Starting server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown.cancel();

    // Let interrupted replies finish recording
    background_tasks.drain().await;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
