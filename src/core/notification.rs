//! Notification inbox - append-only entries per account.
//!
//! Entries are only ever created and marked read; the message text is fixed
//! when the triggering event happens.

use crate::{
    entities::{Notification, notification},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Notification categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TransferReceived,
    TransferCancelled,
    News,
    System,
}

impl NotificationKind {
    /// Stored representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TransferReceived => "transfer_received",
            Self::TransferCancelled => "transfer_cancelled",
            Self::News => "news",
            Self::System => "system",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appends a notification to an account's inbox.
pub async fn notify<C>(
    conn: &C,
    account_id: i64,
    kind: NotificationKind,
    title: &str,
    message: &str,
    transfer_id: Option<i64>,
) -> Result<notification::Model>
where
    C: ConnectionTrait,
{
    let model = notification::ActiveModel {
        account_id: Set(account_id),
        kind: Set(kind.as_str().to_string()),
        title: Set(title.to_string()),
        message: Set(message.to_string()),
        is_read: Set(false),
        created_at: Set(Utc::now()),
        transfer_id: Set(transfer_id),
        ..Default::default()
    };

    let created = model.insert(conn).await?;
    tracing::debug!(account_id, %kind, notification_id = created.id, "Notification created");
    Ok(created)
}

/// The account's notifications, newest first.
pub async fn list_for_account(
    db: &DatabaseConnection,
    account_id: i64,
    limit: Option<u64>,
) -> Result<Vec<notification::Model>> {
    let mut query = Notification::find()
        .filter(notification::Column::AccountId.eq(account_id))
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    query
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of unread notifications for the account.
pub async fn unread_count(db: &DatabaseConnection, account_id: i64) -> Result<u64> {
    Notification::find()
        .filter(notification::Column::AccountId.eq(account_id))
        .filter(notification::Column::IsRead.eq(false))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Marks every unread notification of the account as read.
///
/// Returns the number of notifications that changed.
pub async fn mark_all_read(db: &DatabaseConnection, account_id: i64) -> Result<u64> {
    let result = Notification::update_many()
        .col_expr(notification::Column::IsRead, Expr::value(true))
        .filter(notification::Column::AccountId.eq(account_id))
        .filter(notification::Column::IsRead.eq(false))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Notifications attached to a transfer, oldest first.
pub async fn for_transfer(
    db: &DatabaseConnection,
    transfer_id: i64,
) -> Result<Vec<notification::Model>> {
    Notification::find()
        .filter(notification::Column::TransferId.eq(transfer_id))
        .order_by_asc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
