use super::AppState;
use crate::{core::allowance, entities::account, errors::Error};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::Utc;

/// Header carrying the authenticated employee's account ID, set by the
/// trusted front end.
pub const EMPLOYEE_ID_HEADER: &str = "X-Employee-Id";

/// The calling account, loaded with the monthly reset applied.
///
/// Extracting it is the session-start step for every request.
#[derive(Debug, Clone)]
pub struct Actor(pub account::Model);

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let account_id = parts
            .headers
            .get(EMPLOYEE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
            .ok_or(Error::Unauthenticated)?;

        tracing::Span::current().record("account_id", account_id);

        let account = allowance::start_session(
            &state.db,
            account_id,
            state.policy.monthly_allowance,
            Utc::now().date_naive(),
        )
        .await?;

        Ok(Self(account))
    }
}
