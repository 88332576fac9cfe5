//! Game Review API server
//!
//! Serves the single-function handler over HTTP. Storage is PostgreSQL
//! unless `STORAGE=memory` is set.

use game_review_api::config::{Settings, StorageBackend};
use game_review_api::db::{create_pool, MemoryStore, PgStore, Store};
use game_review_api::routes::create_router;
use game_review_api::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the log filter is read
    let _ = dotenvy::dotenv();
    init_tracing();

    info!("🚀 Starting Game Review API...");

    // Load configuration
    let settings = Settings::load()?;
    info!(
        storage = ?settings.storage,
        admin_flag = %settings.security.admin_flag,
        "📋 Configuration loaded successfully"
    );

    let store: Arc<dyn Store> = match settings.storage {
        StorageBackend::Postgres => {
            let db = settings
                .database
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set for postgres storage"))?;
            let pool = create_pool(db)?;
            Arc::new(PgStore::connect(pool).await?)
        }
        StorageBackend::Memory => {
            warn!("⚠️  Using in-memory storage; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let state = Arc::new(AppState::new(store, settings.security));
    let app = create_router(state);

    let addr = SocketAddr::from((settings.server.host, settings.server.port));
    info!("🌐 Server listening on http://{}", addr);
    info!("   ANY  /?action=...   - Single-function endpoint");
    info!("   ANY  /api?action=... - Same, under /api");
    info!("   POST /invoke        - Raw event invocation");
    info!("   GET  /health        - Health check");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging. `LOG_FORMAT=json` switches to
/// JSON lines.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,game_review_api=debug,tower_http=debug"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .compact(),
            )
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
