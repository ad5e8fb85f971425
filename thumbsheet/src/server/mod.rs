//! HTTP surface.
//!
//! | Route           | Purpose                                         |
//! |-----------------|-------------------------------------------------|
//! | `/`             | Lists the routes                                |
//! | `/healthz`      | Liveness                                        |
//! | `/update_sheet` | Rebuilds the sheet for `q`, `cols`, `rows`, `page` |
//! | `/sheet.png`    | Latest sheet, or a 1×1 transparent PNG           |
//!
//! Every response carries `Cache-Control: no-store`.

mod handlers;

pub use handlers::{
    ErrorResponse, HealthResponse, IndexResponse, UpdateSheetParams, UpdateSheetResponse,
    ENDPOINTS, HEADER_SHEET_COLS, HEADER_SHEET_GENERATED_AT, HEADER_SHEET_QUERY,
    HEADER_SHEET_ROWS,
};

use crate::fetch::TileSource;
use crate::service::SheetService;
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Server startup and runtime errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// Builds the router around a shared service.
pub fn router<S>(service: Arc<SheetService<S>>) -> Router
where
    S: TileSource + 'static,
{
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::healthz))
        .route("/update_sheet", get(handlers::update_sheet::<S>))
        .route("/sheet.png", get(handlers::sheet_png::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Binds `addr` and serves until `shutdown` resolves.
pub async fn serve<S, F>(
    service: Arc<SheetService<S>>,
    addr: SocketAddr,
    shutdown: F,
) -> Result<(), ServerError>
where
    S: TileSource + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    serve_on(service, listener, shutdown).await
}

/// Serves on an already-bound listener until `shutdown` resolves.
pub async fn serve_on<S, F>(
    service: Arc<SheetService<S>>,
    listener: TcpListener,
    shutdown: F,
) -> Result<(), ServerError>
where
    S: TileSource + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(local) = listener.local_addr() {
        info!(addr = %local, "Sheet server listening");
    }

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)?;

    info!("Sheet server stopped");
    Ok(())
}
