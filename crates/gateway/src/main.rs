//! Inkpress API Gateway
//!
//! HTTP entry point for the blog backend.
//! Handles:
//! - Request routing and response envelopes
//! - Administrator authentication for write routes
//! - Storage backend selection
//! - Observability (logging, metrics, request ids)

mod handlers;
mod response;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use inkpress_common::{
    config::AppConfig,
    db::{DbPool, SqlStore},
    errors::Result,
    metrics::{BACKUP_BUCKETS, METRICS_PREFIX},
    services::AuthService,
    Services,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::{signal, sync::oneshot};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Storage backend behind the services, kept for readiness checks
#[derive(Clone)]
pub enum Storage {
    Database(DbPool),
    Memory,
}

impl Storage {
    pub async fn ping(&self) -> Result<()> {
        match self {
            Storage::Database(pool) => pool.ping().await,
            Storage::Memory => Ok(()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Storage::Database(_) => "database",
            Storage::Memory => "memory",
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Services,
    pub storage: Storage,
    pub metrics: Option<PrometheusHandle>,
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.services.auth.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    init_tracing(&config);
    info!("Starting Inkpress API Gateway v{}", inkpress_common::VERSION);

    // Initialize metrics
    let metrics = if config.observability.metrics_enabled {
        let handle = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(format!("{}_backup_duration_seconds", METRICS_PREFIX)),
                BACKUP_BUCKETS,
            )?
            .install_recorder()?;
        inkpress_common::metrics::register_metrics();
        Some(handle)
    } else {
        None
    };

    // Select the storage backend
    let (services, storage) = if config.uses_memory_store() {
        info!("Using in-memory store; content is lost on shutdown");
        (Services::in_memory(&config), Storage::Memory)
    } else {
        info!("Connecting to database...");
        let db = DbPool::new(&config.database).await?;
        if config.database.auto_migrate {
            db.ensure_schema().await?;
        }
        (
            Services::with_sql(SqlStore::new(db.clone()), &config),
            Storage::Database(db),
        )
    };

    let state = AppState {
        config: config.clone(),
        services,
        storage,
        metrics,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let (signalled_tx, signalled_rx) = oneshot::channel();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();

    drain_with_timeout(server, signalled_rx, config.shutdown_timeout()).await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let timeout = TimeoutLayer::new(state.config.request_timeout());

    // Write routes authenticate through the `AdminUser` extractor
    let api_routes = Router::new()
        // Articles
        .route(
            "/articles",
            get(handlers::articles::list_articles).post(handlers::articles::create_article),
        )
        .route("/articles/backup", get(handlers::articles::backup_articles))
        .route(
            "/articles/{id}",
            get(handlers::articles::get_article)
                .put(handlers::articles::update_article)
                .delete(handlers::articles::delete_article),
        )
        .route(
            "/articles/category/{category_id}",
            get(handlers::articles::list_by_category),
        )
        .route("/articles/tag/{tag_id}", get(handlers::articles::list_by_tag))
        // Categories
        .route(
            "/categories",
            get(handlers::categories::list_categories)
                .post(handlers::categories::create_category),
        )
        .route(
            "/categories/{id}",
            get(handlers::categories::get_category)
                .put(handlers::categories::update_category)
                .delete(handlers::categories::delete_category),
        )
        // Tags
        .route(
            "/tags",
            get(handlers::tags::list_tags).post(handlers::tags::create_tag),
        )
        .route(
            "/tags/{id}",
            get(handlers::tags::get_tag)
                .put(handlers::tags::update_tag)
                .delete(handlers::tags::delete_tag),
        )
        // Authentication
        .route("/auth/login", post(handlers::auth::login));

    // Compose the app
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/metrics", get(handlers::health::metrics))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(timeout)
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Run `server` to completion, giving in-flight requests at most `limit`
/// once `signalled` fires
async fn drain_with_timeout<F>(
    server: F,
    signalled: oneshot::Receiver<()>,
    limit: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result,
        Ok(()) = signalled => {}
    }

    match tokio::time::timeout(limit, &mut server).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                timeout_secs = limit.as_secs(),
                "Shutdown timeout elapsed, dropping open connections"
            );
            Ok(())
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
