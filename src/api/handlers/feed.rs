//! Read-mostly views shared by every employee: leaderboard, inbox, news.

use crate::api::{
    AppState,
    dto::{LeaderboardQuery, LeaderboardView, LimitQuery, MarkedRead, NotificationsView},
    extract::Actor,
};
use crate::core::{leaderboard as ranking, month::Month, news as posts, notification};
use crate::entities::news;
use crate::errors::Result;
use axum::{
    Json,
    extract::{Query, State},
};

const DEFAULT_NEWS_LIMIT: u64 = 5;
const INBOX_LIMIT: u64 = 50;
const LEADERBOARD_MONTHS: usize = 12;

pub async fn leaderboard(
    State(state): State<AppState>,
    _caller: Actor,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardView>> {
    let month = Month::parse_or_current(query.month.as_deref())?;
    let entries = ranking::leaderboard(&state.db, month, query.limit).await?;

    Ok(Json(LeaderboardView {
        month: month.to_string(),
        months: Month::current()
            .recent(LEADERBOARD_MONTHS)
            .iter()
            .map(ToString::to_string)
            .collect(),
        entries,
    }))
}

pub async fn notifications(
    State(state): State<AppState>,
    Actor(caller): Actor,
) -> Result<Json<NotificationsView>> {
    let notifications =
        notification::list_for_account(&state.db, caller.id, Some(INBOX_LIMIT)).await?;
    let unread = notification::unread_count(&state.db, caller.id).await?;

    Ok(Json(NotificationsView {
        unread,
        notifications,
    }))
}

pub async fn mark_notifications_read(
    State(state): State<AppState>,
    Actor(caller): Actor,
) -> Result<Json<MarkedRead>> {
    let marked_read = notification::mark_all_read(&state.db, caller.id).await?;
    Ok(Json(MarkedRead { marked_read }))
}

pub async fn news(
    State(state): State<AppState>,
    _caller: Actor,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<news::Model>>> {
    let limit = query.limit.unwrap_or(DEFAULT_NEWS_LIMIT);
    Ok(Json(posts::latest_news(&state.db, limit).await?))
}
