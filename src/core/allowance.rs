//! Monthly allowance reset.
//!
//! There is no scheduled job: an account's allowance is topped back up to the
//! configured amount the first time it is touched in a new calendar month,
//! either at session start or inside a transfer before the balance check.
//! The reset only applies if `last_reset` is unchanged since it was read, so
//! two racing requests cannot both grant a fresh allowance.

use crate::{
    core::account,
    entities::{Account, account as account_entity},
    errors::Result,
};
use chrono::{Datelike, NaiveDate};
use sea_orm::{prelude::*, sea_query::Expr};
use tracing::{debug, info};

/// Whether `today` is in a different calendar month than `last_reset`.
#[must_use]
pub fn needs_reset(last_reset: NaiveDate, today: NaiveDate) -> bool {
    last_reset.year() != today.year() || last_reset.month() != today.month()
}

/// Resets the account's allowance if a new month has started.
///
/// Returns the account as stored after the check.
pub async fn reset_if_needed<C>(
    conn: &C,
    account: account_entity::Model,
    monthly_allowance: i64,
    today: NaiveDate,
) -> Result<account_entity::Model>
where
    C: ConnectionTrait,
{
    if !needs_reset(account.last_reset, today) {
        return Ok(account);
    }

    let result = Account::update_many()
        .col_expr(
            account_entity::Column::MonthlyAllowance,
            Expr::value(monthly_allowance),
        )
        .col_expr(account_entity::Column::LastReset, Expr::value(today))
        .filter(account_entity::Column::Id.eq(account.id))
        .filter(account_entity::Column::LastReset.eq(account.last_reset))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        debug!(account_id = account.id, "Allowance already reset by another request");
    } else {
        info!(
            account_id = account.id,
            previous = account.monthly_allowance,
            allowance = monthly_allowance,
            %today,
            "Monthly allowance reset"
        );
    }

    account::require_account(conn, account.id).await
}

/// Session-start hook: loads the acting account and applies the monthly reset.
pub async fn start_session(
    db: &DatabaseConnection,
    account_id: i64,
    monthly_allowance: i64,
    today: NaiveDate,
) -> Result<account_entity::Model> {
    let account = account::require_account(db, account_id).await?;
    reset_if_needed(db, account, monthly_allowance, today).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_needs_reset() {
        assert!(!needs_reset(date(2026, 10, 1), date(2026, 10, 31)));
        assert!(needs_reset(date(2026, 9, 30), date(2026, 10, 1)));
        // same month number in a different year
        assert!(needs_reset(date(2025, 10, 18), date(2026, 10, 18)));
    }

    #[tokio::test]
    async fn test_reset_restores_allowance_in_new_month() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_employee(&db, "emp").await?;
        let account = set_balances(&db, account.id, 12_345, 500, date(2026, 9, 14)).await?;

        let today = date(2026, 10, 2);
        let reset = reset_if_needed(&db, account, 100_000, today).await?;
        assert_eq!(reset.monthly_allowance, 100_000);
        assert_eq!(reset.last_reset, today);
        // received total is never touched by a reset
        assert_eq!(reset.received_total, 500);
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_is_idempotent_within_month() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_employee(&db, "emp").await?;
        let account = set_balances(&db, account.id, 40_000, 0, date(2026, 10, 1)).await?;

        let same_month = reset_if_needed(&db, account.clone(), 100_000, date(2026, 10, 25)).await?;
        assert_eq!(same_month, account);
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_read_does_not_reset_twice() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_employee(&db, "emp").await?;
        let stale = set_balances(&db, account.id, 0, 0, date(2026, 9, 1)).await?;

        let today = date(2026, 10, 3);
        reset_if_needed(&db, stale.clone(), 100_000, today).await?;
        // spend some of the fresh allowance
        set_balances(&db, account.id, 70_000, 0, today).await?;

        // a request that read the account before the first reset
        let after = reset_if_needed(&db, stale, 100_000, today).await?;
        assert_eq!(after.monthly_allowance, 70_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_start_session() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_employee(&db, "emp").await?;
        set_balances(&db, account.id, 1_000, 0, date(2020, 1, 1)).await?;

        let today = date(2026, 10, 18);
        let session = start_session(&db, account.id, 100_000, today).await?;
        assert_eq!(session.monthly_allowance, 100_000);

        let missing = start_session(&db, 999, 100_000, today).await;
        assert!(matches!(missing, Err(Error::AccountNotFound { id: 999 })));
        Ok(())
    }
}
