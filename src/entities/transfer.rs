//! Transfer entity - a single bonus point recognition between two accounts.
//!
//! Rows are written once and may be soft-deleted once by an administrator
//! (`is_deleted`, `deleted_by`, `deleted_at`). They are never hard-deleted.
//! `reason` holds the snake_case wire value of
//! [`TransferReason`](crate::core::transfer::TransferReason).

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transfer database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Account that gave the points
    pub sender_id: i64,
    /// Account that received the points
    pub recipient_id: i64,
    /// Transferred points, in hundredths
    pub amount: i64,
    /// Reason category, e.g. `"teamwork"`
    pub reason: String,
    /// Free-text justification written by the sender
    pub explanation: String,
    /// Reference to an attached document in the upload store
    pub document: Option<String>,
    pub created_at: DateTimeUtc,
    /// Soft delete flag, set by an administrative reversal
    pub is_deleted: bool,
    /// Administrator who reversed the transfer
    pub deleted_by: Option<i64>,
    pub deleted_at: Option<DateTimeUtc>,
}

/// Defines relationships between Transfer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::SenderId",
        to = "super::account::Column::Id"
    )]
    Sender,
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::RecipientId",
        to = "super::account::Column::Id"
    )]
    Recipient,
    /// Notifications that reference this transfer
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl Model {
    /// Transferred points as a decimal point value.
    #[must_use]
    pub fn amount_points(&self) -> Decimal {
        crate::core::points::from_hundredths(self.amount)
    }
}

impl ActiveModelBehavior for ActiveModel {}
