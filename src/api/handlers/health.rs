use crate::api::AppState;
use crate::errors::Result;
use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

/// Liveness check that also pings the database.
pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse> {
    state.db.ping().await?;

    Ok(Json(json!({
        "status": "ok",
        "service": "bonus-ledger",
        "version": env!("CARGO_PKG_VERSION")
    })))
}
