//! HTTP surface of the DGC bulletin manuals service.
//!
//! # Routes
//! All manual routes are mounted under `/api/manuals`:
//! - `GET /recommended`: this week's rotating shortlist.
//! - `GET /month/{month}`: one month, any letter case.
//! - `GET /all`: every manual grouped under the 12 months.
//! - `POST /create`, `PUT /update/{id}`, `DELETE /delete/{id}`,
//!   `DELETE /clear/all`: administrative writes.
//! - `GET /edit/{key}`: month listing or single manual for editors.
//!
//! `GET /api/health` reports liveness and `/public` serves static assets such
//! as manual cover images.
//!
//! # Configuration
//! | Variable | Default |
//! |---|---|
//! | `DGC_PORT` | `5000` |
//! | `DGC_DB_PATH` | `dgc.sqlite3` |
//! | `DGC_LOG_LEVEL` | `debug` (debug builds), `info` (release) |
//! | `DGC_LOG_DIR` | unset, logs go to stderr |
//! | `DGC_PUBLIC_DIR` | `public` |
//! | `DGC_FIXED_DATE` | unset, rotation follows the local date |
//!
//! ```sh
//! DGC_PORT=8080 cargo run -p dgc_server
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use dgc_core::{
    db::{open_db, DbError},
    init_logging, LogTarget, LoggingError,
};
use log::{error, info};
use thiserror::Error;
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::{Config, ConfigError};
use routes::{health_handler, manual_routes};
use state::AppState;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the full router for `state`.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .nest("/api/manuals", manual_routes())
        .route("/api/health", get(health_handler))
        .nest_service("/public", ServeDir::new(&state.config.public_dir))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> Result<(), ServerError> {
    let config = Config::load()?;

    let log_target = match &config.log_dir {
        Some(dir) => LogTarget::Directory(dir.clone()),
        None => LogTarget::Stderr,
    };
    init_logging(&config.log_level, log_target)?;
    info!(
        "event=config_loaded module=server status=ok port={} db_path={} public_dir={} fixed_date={:?}",
        config.port,
        config.db_path.display(),
        config.public_dir.display(),
        config.fixed_date
    );

    info!("Initializing state...");
    let conn = open_db(&config.db_path)?;
    let address = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config, conn);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    let served = axum::serve(listener, app(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("Server shutting down...");
    state.close()?;
    served?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                error!("event=signal_install module=server status=error signal=ctrl_c error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!("event=signal_install module=server status=error signal=terminate error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
