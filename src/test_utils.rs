//! Shared test utilities for the bonus ledger.
//!
//! Helpers for in-memory and file-backed databases and for accounts and transfers with
//! sensible defaults. Balance fixtures bypass the ledger operations so tests
//! can start from any state.

use crate::{
    core::{DEFAULT_MONTHLY_ALLOWANCE, account as accounts, account::NewAccount},
    entities::{Account, Transfer, account, transfer},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{DatabaseConnection, PaginatorTrait, Set, prelude::*, sea_query::Expr};
use std::path::Path;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database at `path` with all tables
/// initialized. Unlike the in-memory setup, its pool hands out several
/// connections, so concurrent transactions really contend.
pub async fn setup_file_db(path: &Path) -> Result<DatabaseConnection> {
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let db = sea_orm::Database::connect(&url).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a regular employee with a full allowance as of today.
///
/// # Defaults
/// * `email`: `"<name>@example.com"`
/// * `last_name`: `"Tester"`
/// * `position`: `"Engineer"`
pub async fn create_employee(db: &DatabaseConnection, name: &str) -> Result<account::Model> {
    create_custom_account(db, name, Some("Engineer"), false).await
}

/// Creates an account with a custom job title and admin flag.
pub async fn create_custom_account(
    db: &DatabaseConnection,
    name: &str,
    position: Option<&str>,
    is_admin: bool,
) -> Result<account::Model> {
    accounts::create_account(
        db,
        NewAccount {
            email: format!("{name}@example.com"),
            first_name: name.to_string(),
            last_name: "Tester".to_string(),
            position: position.map(ToString::to_string),
            is_admin,
            ..Default::default()
        },
        DEFAULT_MONTHLY_ALLOWANCE,
        Utc::now().date_naive(),
    )
    .await
}

/// Builds an account model without touching a database.
#[must_use]
pub fn account_model(id: i64, position: Option<&str>, is_admin: bool) -> account::Model {
    account::Model {
        id,
        email: format!("user{id}@example.com"),
        first_name: format!("User{id}"),
        last_name: "Tester".to_string(),
        middle_name: String::new(),
        phone: None,
        department: None,
        position: position.map(ToString::to_string),
        birth_date: None,
        is_admin,
        monthly_allowance: DEFAULT_MONTHLY_ALLOWANCE,
        received_total: 0,
        last_reset: Utc::now().date_naive(),
        created_at: Utc::now(),
    }
}

/// Overwrites an account's balances and reset date.
pub async fn set_balances(
    db: &DatabaseConnection,
    account_id: i64,
    monthly_allowance: i64,
    received_total: i64,
    last_reset: NaiveDate,
) -> Result<account::Model> {
    account::ActiveModel {
        id: Set(account_id),
        monthly_allowance: Set(monthly_allowance),
        received_total: Set(received_total),
        last_reset: Set(last_reset),
        ..Default::default()
    }
    .update(db)
    .await
    .map_err(Into::into)
}

/// Reads the current stored state of an account.
pub async fn reload(db: &DatabaseConnection, account: &account::Model) -> Result<account::Model> {
    Account::find_by_id(account.id)
        .one(db)
        .await?
        .ok_or(Error::AccountNotFound { id: account.id })
}

/// Inserts a transfer row directly, without balance effects.
pub async fn insert_transfer(
    db: &DatabaseConnection,
    sender_id: i64,
    recipient_id: i64,
    amount: i64,
    created_at: DateTime<Utc>,
) -> Result<transfer::Model> {
    transfer::ActiveModel {
        sender_id: Set(sender_id),
        recipient_id: Set(recipient_id),
        amount: Set(amount),
        reason: Set("teamwork".to_string()),
        explanation: Set("Test transfer".to_string()),
        document: Set(None),
        created_at: Set(created_at),
        is_deleted: Set(false),
        deleted_by: Set(None),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Soft-deletes a transfer row directly, without balance effects.
pub async fn mark_deleted(db: &DatabaseConnection, transfer_id: i64, admin_id: i64) -> Result<()> {
    Transfer::update_many()
        .col_expr(transfer::Column::IsDeleted, Expr::value(true))
        .col_expr(transfer::Column::DeletedBy, Expr::value(admin_id))
        .col_expr(transfer::Column::DeletedAt, Expr::value(Utc::now()))
        .filter(transfer::Column::Id.eq(transfer_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Number of transfer rows, deleted ones included.
pub async fn count_all_transfers(db: &DatabaseConnection) -> Result<u64> {
    Transfer::find().count(db).await.map_err(Into::into)
}

/// Midday UTC on the given date.
#[must_use]
pub fn at_noon(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN))
        .and_utc()
}
