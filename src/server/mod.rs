//! HTTP server: routing, shared state, startup, graceful shutdown.
//!
//! The router is a plain function over [`AppState`] so tests can drive the
//! whole API in-process without binding a socket. [`serve`] owns the
//! production path: config validation, store/processor construction, CORS,
//! and SIGINT/SIGTERM handling.

pub mod error;
mod handlers;
pub mod types;

pub use error::ApiError;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::config::Config;
use crate::constants;
use crate::imaging::UploadProcessor;
use crate::store::ImageStore;

/// Shared per-request context. Cheap to clone; immutable after startup.
/// The single store and processor handles are injected here rather than
/// living in module globals, and drop on shutdown with the server task.
#[derive(Clone)]
pub struct AppState {
    pub store: ImageStore,
    pub processor: UploadProcessor,
}

/// Build the application router: the `/api` surface plus static serving of
/// the derived files under `/uploads`.
pub fn router(state: AppState) -> Router {
    let uploads_dir = state.processor.uploads_dir().to_path_buf();

    let api = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/images",
            get(handlers::list_images).post(handlers::upload_image),
        )
        .route("/images/trending", get(handlers::trending_images))
        .route("/images/layout", get(handlers::layout_images))
        .route(
            "/images/positions/bulk",
            put(handlers::bulk_update_positions),
        )
        .route(
            "/images/{id}",
            get(handlers::get_image)
                .put(handlers::update_image)
                .delete(handlers::delete_image),
        )
        .route("/images/{id}/like", post(handlers::toggle_like))
        .layer(DefaultBodyLimit::max(constants::MAX_UPLOAD_BYTES));

    Router::new()
        .nest("/api", api)
        .nest_service(constants::UPLOADS_PREFIX, ServeDir::new(uploads_dir))
        .with_state(state)
}

/// Run the server until SIGINT/SIGTERM.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the store or uploads
/// directory cannot be opened, or the listener cannot bind.
pub async fn serve(config: Config) -> Result<()> {
    let validation = config.validate()?;
    for warning in &validation.warnings {
        warn!("{warning}");
    }

    let store = ImageStore::file(&config.storage.db_path)?;
    std::fs::create_dir_all(&config.storage.uploads_dir).with_context(|| {
        format!(
            "Failed to create uploads directory: {}",
            config.storage.uploads_dir.display()
        )
    })?;
    let processor = UploadProcessor::new(&config.storage.uploads_dir);

    let cors = match &config.server.cors_origin {
        Some(origin) => {
            let origin = origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {origin}"))?;
            CorsLayer::new().allow_origin(origin)
        },
        None => CorsLayer::permissive(),
    };

    let app = router(AppState { store, processor }).layer(cors);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(
        %addr,
        db = %config.storage.db_path.display(),
        uploads = %config.storage.uploads_dir.display(),
        "Gallery server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on the first termination signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("SIGINT received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
