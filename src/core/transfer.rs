//! Transfer business logic - validation, execution, reversal and history.
//!
//! A transfer debits the sender's monthly allowance, credits the recipient's
//! received total, stores the transfer row and notifies the recipient. A
//! reversal undoes the balance effect, soft-deletes the row and notifies both
//! parties. Each of those is one database transaction; the rules are checked
//! again on rows read inside that transaction, and every contended balance
//! decision is repeated as a guard in the `UPDATE` itself. A guard that
//! misses rolls the transaction back and the operation is retried.

use crate::{
    core::{
        LedgerPolicy, account, allowance,
        month::Month,
        notification::{self, NotificationKind},
        points,
        retry::run_with_retry,
        roles::RolePolicy,
    },
    entities::{Account, Transfer, account as account_entity, transfer},
    errors::{Error, Rejection, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, SimpleExpr},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Why a colleague is being recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferReason {
    ExcellentWork,
    HelpColleague,
    ProjectSuccess,
    Innovation,
    Teamwork,
    ClientSatisfaction,
    Other,
}

impl TransferReason {
    /// Every reason, in the order the transfer form lists them.
    pub const ALL: [Self; 7] = [
        Self::ExcellentWork,
        Self::HelpColleague,
        Self::ProjectSuccess,
        Self::Innovation,
        Self::Teamwork,
        Self::ClientSatisfaction,
        Self::Other,
    ];

    /// Stored representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExcellentWork => "excellent_work",
            Self::HelpColleague => "help_colleague",
            Self::ProjectSuccess => "project_success",
            Self::Innovation => "innovation",
            Self::Teamwork => "teamwork",
            Self::ClientSatisfaction => "client_satisfaction",
            Self::Other => "other",
        }
    }

    /// Human-readable label used in notifications.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ExcellentWork => "Excellent work",
            Self::HelpColleague => "Helping a colleague",
            Self::ProjectSuccess => "Successful project",
            Self::Innovation => "Innovation",
            Self::Teamwork => "Teamwork",
            Self::ClientSatisfaction => "Satisfied client",
            Self::Other => "Other",
        }
    }

    /// Parses the stored representation.
    #[must_use]
    pub fn from_stored(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|reason| reason.as_str() == value)
    }
}

/// Label for a stored reason value, falling back to the raw value.
#[must_use]
pub fn reason_label(stored: &str) -> &str {
    TransferReason::from_stored(stored).map_or(stored, |reason| reason.label())
}

/// A transfer as submitted by the sender.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransferRequest {
    pub recipient_id: i64,
    /// Points to give, at most two decimal places
    pub amount: Decimal,
    pub reason: TransferReason,
    pub explanation: String,
    /// Reference to an already uploaded document
    #[serde(default)]
    pub document: Option<String>,
}

/// Result of a committed transfer: the stored row and both accounts as they
/// were after the commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub transfer: transfer::Model,
    pub sender: account_entity::Model,
    pub recipient: account_entity::Model,
}

/// Result of a committed reversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReversalReceipt {
    pub transfer: transfer::Model,
    pub sender: account_entity::Model,
    pub recipient: account_entity::Model,
}

/// Checks the shape of a submitted request and returns the amount in
/// hundredths. Ledger rules are left to [`validate_transfer`].
pub fn check_request(request: &TransferRequest) -> std::result::Result<i64, Rejection> {
    if request.explanation.trim().is_empty() {
        return Err(Rejection::EmptyExplanation);
    }
    points::to_hundredths(request.amount)
}

/// Applies the ledger rules to a prospective transfer.
///
/// Checks run in a fixed order and the first failure is reported:
/// self-transfer, recipient director, recipient administrator, sender
/// director, sender administrator, non-positive amount, insufficient
/// allowance.
pub fn validate_transfer(
    roles: &RolePolicy,
    sender: &account_entity::Model,
    recipient: &account_entity::Model,
    amount: i64,
) -> std::result::Result<(), Rejection> {
    if sender.id == recipient.id {
        return Err(Rejection::SelfTransfer);
    }
    if roles.is_director(recipient) {
        return Err(Rejection::RecipientIsDirector);
    }
    if roles.is_administrator(recipient) {
        return Err(Rejection::RecipientIsAdministrator);
    }
    if roles.is_director(sender) {
        return Err(Rejection::SenderIsDirector);
    }
    if roles.is_administrator(sender) {
        return Err(Rejection::SenderIsAdministrator);
    }
    if amount <= 0 {
        return Err(Rejection::NonPositiveAmount {
            amount: points::from_hundredths(amount),
        });
    }
    if amount > sender.monthly_allowance {
        return Err(Rejection::InsufficientAllowance {
            available: sender.allowance_points(),
            requested: points::from_hundredths(amount),
        });
    }
    Ok(())
}

/// Executes a transfer from `sender_id`.
///
/// The sender's monthly reset is applied first, then the rules are checked on
/// freshly locked rows, then the debit, credit, transfer row and recipient
/// notification are written in one transaction.
pub async fn execute_transfer(
    db: &DatabaseConnection,
    policy: &LedgerPolicy,
    sender_id: i64,
    request: &TransferRequest,
) -> Result<TransferReceipt> {
    let amount = check_request(request).inspect_err(|rejection| {
        warn!(sender_id, %rejection, "Transfer request rejected");
    })?;

    run_with_retry(&policy.retry, "execute_transfer", || {
        execute_once(db, policy, sender_id, request, amount)
    })
    .await
}

async fn execute_once(
    db: &DatabaseConnection,
    policy: &LedgerPolicy,
    sender_id: i64,
    request: &TransferRequest,
    amount: i64,
) -> Result<TransferReceipt> {
    let now = Utc::now();
    let txn = db.begin().await?;

    let sender = account::lock_account(&txn, sender_id).await?;
    let sender =
        allowance::reset_if_needed(&txn, sender, policy.monthly_allowance, now.date_naive())
            .await?;
    let recipient = account::lock_account(&txn, request.recipient_id).await?;

    if let Err(rejection) = validate_transfer(&policy.roles, &sender, &recipient, amount) {
        warn!(
            sender_id,
            recipient_id = recipient.id,
            %rejection,
            "Transfer rejected"
        );
        return Err(rejection.into());
    }

    let debit = Account::update_many()
        .col_expr(
            account_entity::Column::MonthlyAllowance,
            Expr::col(account_entity::Column::MonthlyAllowance).sub(amount),
        )
        .filter(account_entity::Column::Id.eq(sender.id))
        .filter(account_entity::Column::MonthlyAllowance.gte(amount))
        .exec(&txn)
        .await?;
    if debit.rows_affected != 1 {
        return Err(Error::conflict(format!(
            "allowance of account {} changed during transfer",
            sender.id
        )));
    }

    Account::update_many()
        .col_expr(
            account_entity::Column::ReceivedTotal,
            Expr::col(account_entity::Column::ReceivedTotal).add(amount),
        )
        .filter(account_entity::Column::Id.eq(recipient.id))
        .exec(&txn)
        .await?;

    let stored = transfer::ActiveModel {
        sender_id: Set(sender.id),
        recipient_id: Set(recipient.id),
        amount: Set(amount),
        reason: Set(request.reason.as_str().to_string()),
        explanation: Set(request.explanation.trim().to_string()),
        document: Set(account::clean_optional(request.document.clone())),
        created_at: Set(now),
        is_deleted: Set(false),
        deleted_by: Set(None),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    notification::notify(
        &txn,
        recipient.id,
        NotificationKind::TransferReceived,
        "Bonus points received",
        &format!(
            "You received {} points from {}. Reason: {}",
            stored.amount_points(),
            sender.display_name(),
            request.reason.label()
        ),
        Some(stored.id),
    )
    .await?;

    let sender = account::require_account(&txn, sender.id).await?;
    let recipient = account::require_account(&txn, recipient.id).await?;
    txn.commit().await?;

    info!(
        transfer_id = stored.id,
        sender_id = sender.id,
        recipient_id = recipient.id,
        amount = %stored.amount_points(),
        reason = %stored.reason,
        "Transfer executed"
    );

    Ok(TransferReceipt {
        transfer: stored,
        sender,
        recipient,
    })
}

/// Reverses a transfer on behalf of an administrator.
///
/// The sender's allowance is restored in full, the recipient's received total
/// is reduced but never below zero, the row is soft-deleted and both parties
/// are notified. A transfer that is already reversed is rejected with
/// [`Error::AlreadyReversed`] and nothing changes.
pub async fn reverse_transfer(
    db: &DatabaseConnection,
    policy: &LedgerPolicy,
    admin: &account_entity::Model,
    transfer_id: i64,
) -> Result<ReversalReceipt> {
    policy.roles.require_administrator(admin)?;

    run_with_retry(&policy.retry, "reverse_transfer", || {
        reverse_once(db, &policy.roles, admin.id, transfer_id)
    })
    .await
}

async fn reverse_once(
    db: &DatabaseConnection,
    roles: &RolePolicy,
    admin_id: i64,
    transfer_id: i64,
) -> Result<ReversalReceipt> {
    let now = Utc::now();
    let txn = db.begin().await?;

    // the acting account may have lost its role since the request started
    let admin = account::lock_account(&txn, admin_id).await?;
    roles.require_administrator(&admin)?;

    let existing = Transfer::find_by_id(transfer_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or(Error::TransferNotFound { id: transfer_id })?;
    if existing.is_deleted {
        return Err(Error::AlreadyReversed { id: transfer_id });
    }

    let marked = Transfer::update_many()
        .col_expr(transfer::Column::IsDeleted, Expr::value(true))
        .col_expr(transfer::Column::DeletedBy, Expr::value(admin.id))
        .col_expr(transfer::Column::DeletedAt, Expr::value(now))
        .filter(transfer::Column::Id.eq(transfer_id))
        .filter(transfer::Column::IsDeleted.eq(false))
        .exec(&txn)
        .await?;
    if marked.rows_affected != 1 {
        return Err(Error::conflict(format!(
            "transfer {transfer_id} was modified during reversal"
        )));
    }

    let amount = existing.amount;

    Account::update_many()
        .col_expr(
            account_entity::Column::MonthlyAllowance,
            Expr::col(account_entity::Column::MonthlyAllowance).add(amount),
        )
        .filter(account_entity::Column::Id.eq(existing.sender_id))
        .exec(&txn)
        .await?;

    let floored: SimpleExpr = Expr::case(
        Expr::col(account_entity::Column::ReceivedTotal).gt(amount),
        Expr::col(account_entity::Column::ReceivedTotal).sub(amount),
    )
    .finally(0)
    .into();
    Account::update_many()
        .col_expr(account_entity::Column::ReceivedTotal, floored)
        .filter(account_entity::Column::Id.eq(existing.recipient_id))
        .exec(&txn)
        .await?;

    let sender = account::require_account(&txn, existing.sender_id).await?;
    let recipient = account::require_account(&txn, existing.recipient_id).await?;
    let points = existing.amount_points();

    notification::notify(
        &txn,
        recipient.id,
        NotificationKind::TransferCancelled,
        "Transfer cancelled",
        &format!(
            "The transfer of {points} points from {} was cancelled by an administrator.",
            sender.display_name()
        ),
        Some(transfer_id),
    )
    .await?;
    notification::notify(
        &txn,
        sender.id,
        NotificationKind::TransferCancelled,
        "Transfer cancelled",
        &format!(
            "Your transfer of {points} points to {} was cancelled by an administrator. \
             The points were returned to your balance.",
            recipient.display_name()
        ),
        Some(transfer_id),
    )
    .await?;

    let reversed = Transfer::find_by_id(transfer_id)
        .one(&txn)
        .await?
        .ok_or(Error::TransferNotFound { id: transfer_id })?;
    txn.commit().await?;

    info!(
        transfer_id,
        admin_id = admin.id,
        sender_id = sender.id,
        recipient_id = recipient.id,
        amount = %points,
        "Transfer reversed"
    );

    Ok(ReversalReceipt {
        transfer: reversed,
        sender,
        recipient,
    })
}

/// Retrieves a specific transfer by its unique ID, deleted or not.
pub async fn get_transfer_by_id(
    db: &DatabaseConnection,
    transfer_id: i64,
) -> Result<Option<transfer::Model>> {
    Transfer::find_by_id(transfer_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Filters for [`list_transfers`].
#[derive(Debug, Clone, Default)]
pub struct TransferFilter {
    /// Only transfers created in this month
    pub month: Option<Month>,
    pub sender_id: Option<i64>,
    pub recipient_id: Option<i64>,
    /// Transfers where this account is sender or recipient
    pub participant_id: Option<i64>,
    /// Include reversed transfers (default: false)
    pub include_deleted: bool,
    pub limit: Option<u64>,
}

/// Lists transfers matching the filter, newest first.
pub async fn list_transfers(
    db: &DatabaseConnection,
    filter: &TransferFilter,
) -> Result<Vec<transfer::Model>> {
    let mut query = Transfer::find();

    if !filter.include_deleted {
        query = query.filter(transfer::Column::IsDeleted.eq(false));
    }
    if let Some(month) = filter.month {
        query = query
            .filter(transfer::Column::CreatedAt.gte(month.start()))
            .filter(transfer::Column::CreatedAt.lt(month.end()));
    }
    if let Some(sender_id) = filter.sender_id {
        query = query.filter(transfer::Column::SenderId.eq(sender_id));
    }
    if let Some(recipient_id) = filter.recipient_id {
        query = query.filter(transfer::Column::RecipientId.eq(recipient_id));
    }
    if let Some(participant_id) = filter.participant_id {
        query = query.filter(
            transfer::Column::SenderId
                .eq(participant_id)
                .or(transfer::Column::RecipientId.eq(participant_id)),
        );
    }

    if let Some(limit) = filter.limit {
        query = query.limit(limit);
    }

    query
        .order_by_desc(transfer::Column::CreatedAt)
        .order_by_desc(transfer::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The latest non-deleted transfers.
pub async fn recent_transfers(db: &DatabaseConnection, limit: u64) -> Result<Vec<transfer::Model>> {
    list_transfers(
        db,
        &TransferFilter {
            limit: Some(limit),
            ..Default::default()
        },
    )
    .await
}

/// Number of transfers that have not been reversed.
pub async fn count_active_transfers(db: &DatabaseConnection) -> Result<u64> {
    Transfer::find()
        .filter(transfer::Column::IsDeleted.eq(false))
        .count(db)
        .await
        .map_err(Into::into)
}
