use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tba_api::config::{ServerConfig, StoreBackend};
use tba_api::geocode::Geocoder;
use tba_api::router::build_app_router;
use tba_api::state::AppState;
use tba_db::{DynStore, MemoryStore, RestStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tba_api=debug,tba_db=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Row store ---
    let store = build_store(&config.store.backend);
    match tba_db::health_check(store.as_ref()).await {
        Ok(()) => tracing::info!("Row store health check passed"),
        // Pages still render their error states; keep serving.
        Err(e) => tracing::warn!(error = %e, "Row store health check failed"),
    }

    // --- Geocoder ---
    let geocoder = Geocoder::new(&config.geocode).expect("Failed to build geocoding client");

    // --- App state ---
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        geocoder: Arc::new(geocoder),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // In-flight requests get `shutdown_timeout_secs` to finish once a
    // signal arrives.
    let stopping = Arc::new(Notify::new());
    let signal = {
        let stopping = Arc::clone(&stopping);
        async move {
            shutdown_signal().await;
            stopping.notify_one();
        }
    };
    let server = axum::serve(listener, app).with_graceful_shutdown(signal);
    let drain_deadline = async {
        stopping.notified().await;
        tokio::time::sleep(Duration::from_secs(config.shutdown_timeout_secs)).await;
    };

    tokio::select! {
        result = async { server.await } => {
            result.expect("Server error");
            tracing::info!("Graceful shutdown complete");
        }
        () = drain_deadline => {
            tracing::warn!(
                timeout_secs = config.shutdown_timeout_secs,
                "Shutdown timeout elapsed, dropping open connections"
            );
        }
    }
}

/// Build the configured row store.
///
/// Panics at startup if a memory seed file cannot be read or parsed.
fn build_store(backend: &StoreBackend) -> DynStore {
    match backend {
        StoreBackend::Rest { base_url, anon_key } => {
            tracing::info!(%base_url, "Using hosted row store");
            Arc::new(RestStore::new(base_url, anon_key.clone()))
        }
        StoreBackend::Memory { seed_path: None } => {
            tracing::info!("Using empty in-memory row store");
            Arc::new(MemoryStore::catalog())
        }
        StoreBackend::Memory {
            seed_path: Some(path),
        } => {
            let raw = std::fs::read_to_string(path)
                .unwrap_or_else(|e| panic!("Failed to read MEMORY_SEED_PATH '{path}': {e}"));
            let seed: serde_json::Value = serde_json::from_str(&raw)
                .unwrap_or_else(|e| panic!("MEMORY_SEED_PATH '{path}' is not valid JSON: {e}"));
            let store = MemoryStore::catalog()
                .seeded(seed)
                .unwrap_or_else(|e| panic!("Invalid seed in '{path}': {e}"));
            tracing::info!(%path, "Using seeded in-memory row store");
            Arc::new(store)
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
