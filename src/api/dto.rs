use crate::{
    core::{account, leaderboard::LeaderboardEntry, points, roles::RolePolicy, transfer::reason_label},
    entities::{account as account_entity, notification, transfer},
    errors::Result,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

/// The caller's own account.
#[derive(Debug, Serialize)]
pub struct AccountView {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub monthly_allowance: Decimal,
    pub received_total: Decimal,
    pub last_reset: NaiveDate,
    pub is_director: bool,
    pub is_administrator: bool,
}

impl AccountView {
    #[must_use]
    pub fn new(account: &account_entity::Model, roles: &RolePolicy) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            display_name: account.display_name(),
            department: account.department.clone(),
            position: account.position.clone(),
            monthly_allowance: account.allowance_points(),
            received_total: account.received_points(),
            last_reset: account.last_reset,
            is_director: roles.is_director(account),
            is_administrator: roles.is_administrator(account),
        }
    }
}

/// A possible transfer recipient.
#[derive(Debug, Serialize)]
pub struct RecipientView {
    pub id: i64,
    pub display_name: String,
    pub department: Option<String>,
    pub position: Option<String>,
}

impl From<&account_entity::Model> for RecipientView {
    fn from(account: &account_entity::Model) -> Self {
        Self {
            id: account.id,
            display_name: account.display_name(),
            department: account.department.clone(),
            position: account.position.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransferView {
    pub id: i64,
    pub sender_id: i64,
    pub sender_name: Option<String>,
    pub recipient_id: i64,
    pub recipient_name: Option<String>,
    pub amount: Decimal,
    pub reason: String,
    pub reason_label: String,
    pub explanation: String,
    pub document: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Builds transfer views with both parties' names resolved.
pub async fn transfer_views(
    db: &DatabaseConnection,
    transfers: Vec<transfer::Model>,
) -> Result<Vec<TransferView>> {
    let mut ids: Vec<i64> = transfers
        .iter()
        .flat_map(|t| [t.sender_id, t.recipient_id])
        .collect();
    ids.sort_unstable();
    ids.dedup();
    let names = account::accounts_by_ids(db, &ids).await?;
    let name_of = |id: i64| names.get(&id).map(account_entity::Model::display_name);

    Ok(transfers
        .into_iter()
        .map(|t| TransferView {
            id: t.id,
            sender_id: t.sender_id,
            sender_name: name_of(t.sender_id),
            recipient_id: t.recipient_id,
            recipient_name: name_of(t.recipient_id),
            amount: points::from_hundredths(t.amount),
            reason_label: reason_label(&t.reason).to_string(),
            reason: t.reason,
            explanation: t.explanation,
            document: t.document,
            created_at: t.created_at,
            is_deleted: t.is_deleted,
            deleted_at: t.deleted_at,
        })
        .collect())
}

/// Response to a created transfer.
#[derive(Debug, Serialize)]
pub struct CreatedTransfer {
    pub transfer: TransferView,
    /// Sender's allowance after the transfer
    pub monthly_allowance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ReversalView {
    pub transfer: TransferView,
    pub sender_allowance: Decimal,
    pub recipient_received_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ProfileTransfers {
    pub sent: Vec<TransferView>,
    pub received: Vec<TransferView>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardView {
    pub month: String,
    /// Months a client can pick from, newest first.
    pub months: Vec<String>,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize)]
pub struct NotificationsView {
    pub unread: u64,
    pub notifications: Vec<notification::Model>,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked_read: u64,
}

/// Which side of the caller's transfers to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferScope {
    #[default]
    All,
    Sent,
    Received,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransferQuery {
    pub month: Option<String>,
    #[serde(default)]
    pub scope: TransferScope,
    /// Only transfers this account sent or received.
    pub employee: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub month: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct NewsRequest {
    pub title: String,
    pub content: String,
}
