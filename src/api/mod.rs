//! HTTP layer - axum router, request identity and JSON views.
//!
//! Handlers resolve the caller, call into [`crate::core`] and shape the
//! result; no ledger rule lives here.

/// Response bodies and query parameters
pub mod dto;
/// `IntoResponse` for the crate error
pub mod error;
/// Caller identity extractor
pub mod extract;
/// Route handlers grouped by area
pub mod handlers;

use crate::core::LedgerPolicy;
use crate::errors::Result;
use axum::{
    Router,
    body::Body,
    http::Request,
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Span, info};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub policy: Arc<LedgerPolicy>,
}

impl AppState {
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, policy: LedgerPolicy) -> Self {
        Self {
            db,
            policy: Arc::new(policy),
        }
    }
}

/// Span for one HTTP request. `account_id` is filled in once the caller
/// has been resolved.
pub fn request_span<B>(request: &Request<B>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        account_id = tracing::field::Empty,
    )
}

/// Builds the full route table.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/me", get(handlers::accounts::me))
        .route("/accounts/recipients", get(handlers::accounts::recipients))
        .route(
            "/transfers",
            get(handlers::transfers::list_transfers).post(handlers::transfers::create_transfer),
        )
        .route("/transfers/recent", get(handlers::transfers::recent_transfers))
        .route("/profile/transfers", get(handlers::transfers::profile_transfers))
        .route("/leaderboard", get(handlers::feed::leaderboard))
        .route("/notifications", get(handlers::feed::notifications))
        .route("/notifications/read", post(handlers::feed::mark_notifications_read))
        .route("/news", get(handlers::feed::news))
        .route("/admin/stats", get(handlers::admin::stats))
        .route("/admin/transfers", get(handlers::admin::transfers))
        .route(
            "/admin/transfers/:id/reverse",
            post(handlers::admin::reverse_transfer),
        )
        .route("/admin/news", post(handlers::admin::publish_news))
        .route(
            "/admin/staff",
            get(handlers::admin::list_staff).post(handlers::admin::add_staff),
        )
        .route("/admin/staff/:id", delete(handlers::admin::remove_staff))
        .layer(TraceLayer::new_for_http().make_span_with(request_span::<Body>))
        .with_state(state)
}

/// Binds `bind_address` and serves until Ctrl-C.
pub async fn serve(bind_address: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(bind_address).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
