//! HTTP server
//!
//! Builds the axum application around a shared `Dashboard` and serves it.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing::info;

use bhyve_core::{Config, Dashboard};

use crate::routes::routes;

/// Dashboard page served at `/`
pub const DASHBOARD_FILE: &str = "bhyve_dashboard_v1.0.html";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard: Arc::new(dashboard),
        }
    }
}

/// Build the full application: API routes plus the dashboard page
pub fn app(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .merge(routes())
        .route_service("/", ServeFile::new(static_dir.join(DASHBOARD_FILE)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve `app` on an already bound listener until ctrl-c
pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!("Dashboard server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Dashboard server stopped");
    Ok(())
}

/// Bind the configured address and serve
pub async fn start_server(config: &Config, state: AppState) -> Result<()> {
    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    serve(listener, app(state, &config.static_dir)).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
