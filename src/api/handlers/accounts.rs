use crate::api::{
    AppState,
    dto::{AccountView, RecipientView},
    extract::Actor,
};
use crate::core::account;
use crate::errors::Result;
use axum::{Json, extract::State};

pub async fn me(State(state): State<AppState>, Actor(caller): Actor) -> Json<AccountView> {
    Json(AccountView::new(&caller, &state.policy.roles))
}

/// Accounts the caller may send points to.
pub async fn recipients(
    State(state): State<AppState>,
    Actor(caller): Actor,
) -> Result<Json<Vec<RecipientView>>> {
    let accounts = account::eligible_recipients(&state.db, &state.policy.roles, &caller).await?;
    Ok(Json(accounts.iter().map(RecipientView::from).collect()))
}
