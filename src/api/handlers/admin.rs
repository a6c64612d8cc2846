//! Administrator routes. Reads check the role here; writes are checked again
//! by the core operation they call.

use crate::api::{
    AppState,
    dto::{NewsRequest, ReversalView, TransferView, transfer_views},
    extract::Actor,
};
use crate::core::{
    news as posts,
    staff::{self, AdminStats, NewStaffMember},
    transfer::{self, TransferFilter},
};
use crate::entities::{news, staff_member};
use crate::errors::{Error, Result};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

pub async fn stats(State(state): State<AppState>, Actor(caller): Actor) -> Result<Json<AdminStats>> {
    state.policy.roles.require_administrator(&caller)?;
    Ok(Json(staff::admin_stats(&state.db).await?))
}

/// Every non-deleted transfer, newest first.
pub async fn transfers(
    State(state): State<AppState>,
    Actor(caller): Actor,
) -> Result<Json<Vec<TransferView>>> {
    state.policy.roles.require_administrator(&caller)?;
    let transfers = transfer::list_transfers(&state.db, &TransferFilter::default()).await?;
    Ok(Json(transfer_views(&state.db, transfers).await?))
}

pub async fn reverse_transfer(
    State(state): State<AppState>,
    Actor(caller): Actor,
    Path(transfer_id): Path<i64>,
) -> Result<Json<ReversalView>> {
    let receipt = transfer::reverse_transfer(&state.db, &state.policy, &caller, transfer_id).await?;

    let view = transfer_views(&state.db, vec![receipt.transfer])
        .await?
        .pop()
        .ok_or(Error::TransferNotFound { id: transfer_id })?;

    Ok(Json(ReversalView {
        transfer: view,
        sender_allowance: receipt.sender.allowance_points(),
        recipient_received_total: receipt.recipient.received_points(),
    }))
}

pub async fn publish_news(
    State(state): State<AppState>,
    Actor(caller): Actor,
    Json(request): Json<NewsRequest>,
) -> Result<(StatusCode, Json<news::Model>)> {
    let post =
        posts::publish_news(&state.db, &state.policy, &caller, &request.title, &request.content)
            .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_staff(
    State(state): State<AppState>,
    Actor(caller): Actor,
) -> Result<Json<Vec<staff_member::Model>>> {
    state.policy.roles.require_administrator(&caller)?;
    Ok(Json(staff::list_staff_members(&state.db).await?))
}

pub async fn add_staff(
    State(state): State<AppState>,
    Actor(caller): Actor,
    Json(request): Json<NewStaffMember>,
) -> Result<(StatusCode, Json<staff_member::Model>)> {
    let created = staff::add_staff_member(&state.db, &state.policy.roles, &caller, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn remove_staff(
    State(state): State<AppState>,
    Actor(caller): Actor,
    Path(staff_member_id): Path<i64>,
) -> Result<StatusCode> {
    staff::remove_staff_member(&state.db, &state.policy.roles, &caller, staff_member_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
