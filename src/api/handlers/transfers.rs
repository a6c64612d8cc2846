use crate::api::{
    AppState,
    dto::{
        CreatedTransfer, LimitQuery, ProfileTransfers, TransferQuery, TransferScope,
        TransferView, transfer_views,
    },
    extract::Actor,
};
use crate::core::{
    month::Month,
    transfer::{self, TransferFilter, TransferRequest},
};
use crate::errors::{Error, Result};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

const DEFAULT_RECENT_LIMIT: u64 = 5;

pub async fn create_transfer(
    State(state): State<AppState>,
    Actor(caller): Actor,
    Json(request): Json<TransferRequest>,
) -> Result<(StatusCode, Json<CreatedTransfer>)> {
    let receipt = transfer::execute_transfer(&state.db, &state.policy, caller.id, &request).await?;

    let monthly_allowance = receipt.sender.allowance_points();
    let id = receipt.transfer.id;
    let transfer = transfer_views(&state.db, vec![receipt.transfer])
        .await?
        .pop()
        .ok_or(Error::TransferNotFound { id })?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedTransfer {
            transfer,
            monthly_allowance,
        }),
    ))
}

/// Non-deleted transfers for a month, optionally only the caller's side.
pub async fn list_transfers(
    State(state): State<AppState>,
    Actor(caller): Actor,
    Query(query): Query<TransferQuery>,
) -> Result<Json<Vec<TransferView>>> {
    let month = Month::parse_or_current(query.month.as_deref())?;
    let mut filter = TransferFilter {
        month: Some(month),
        participant_id: query.employee,
        ..Default::default()
    };
    match query.scope {
        TransferScope::All => {}
        TransferScope::Sent => filter.sender_id = Some(caller.id),
        TransferScope::Received => filter.recipient_id = Some(caller.id),
    }

    let transfers = transfer::list_transfers(&state.db, &filter).await?;
    Ok(Json(transfer_views(&state.db, transfers).await?))
}

pub async fn recent_transfers(
    State(state): State<AppState>,
    _caller: Actor,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<TransferView>>> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let transfers = transfer::recent_transfers(&state.db, limit).await?;
    Ok(Json(transfer_views(&state.db, transfers).await?))
}

/// The caller's full history, reversed transfers included.
pub async fn profile_transfers(
    State(state): State<AppState>,
    Actor(caller): Actor,
) -> Result<Json<ProfileTransfers>> {
    let sent = transfer::list_transfers(
        &state.db,
        &TransferFilter {
            sender_id: Some(caller.id),
            include_deleted: true,
            ..Default::default()
        },
    )
    .await?;
    let received = transfer::list_transfers(
        &state.db,
        &TransferFilter {
            recipient_id: Some(caller.id),
            include_deleted: true,
            ..Default::default()
        },
    )
    .await?;

    Ok(Json(ProfileTransfers {
        sent: transfer_views(&state.db, sent).await?,
        received: transfer_views(&state.db, received).await?,
    }))
}
