//! Monthly leaderboard of points received.
//!
//! Totals are summed in the database over non-deleted transfers created in
//! the requested month. Ranking and the optional limit are applied here so
//! the tie order does not depend on the backend's sort stability.

use crate::{
    core::{account, month::Month, points},
    entities::{Transfer, transfer},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::{QuerySelect, prelude::*, sea_query::Expr};
use serde::Serialize;
use std::cmp::Reverse;

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based rank
    pub rank: usize,
    pub account_id: i64,
    pub display_name: String,
    pub department: Option<String>,
    /// Sum received in the month, in hundredths
    #[serde(skip)]
    pub total: i64,
    pub points: Decimal,
}

/// Sums received points per recipient for `month`, largest first.
///
/// Accounts that received nothing are left out. Equal totals are ordered by
/// ascending account ID.
pub async fn leaderboard(
    db: &DatabaseConnection,
    month: Month,
    limit: Option<usize>,
) -> Result<Vec<LeaderboardEntry>> {
    let mut totals: Vec<(i64, i64)> = Transfer::find()
        .select_only()
        .column(transfer::Column::RecipientId)
        .column_as(Expr::col(transfer::Column::Amount).sum(), "total")
        .filter(transfer::Column::IsDeleted.eq(false))
        .filter(transfer::Column::CreatedAt.gte(month.start()))
        .filter(transfer::Column::CreatedAt.lt(month.end()))
        .group_by(transfer::Column::RecipientId)
        .into_tuple()
        .all(db)
        .await?;

    totals.retain(|&(_, total)| total > 0);
    totals.sort_by_key(|&(account_id, total)| (Reverse(total), account_id));
    if let Some(limit) = limit {
        totals.truncate(limit);
    }

    let ids: Vec<i64> = totals.iter().map(|&(id, _)| id).collect();
    let accounts = account::accounts_by_ids(db, &ids).await?;
    tracing::debug!(%month, entries = totals.len(), "Leaderboard computed");

    Ok(totals
        .into_iter()
        .enumerate()
        .map(|(index, (account_id, total))| {
            let holder = accounts.get(&account_id);
            LeaderboardEntry {
                rank: index + 1,
                account_id,
                display_name: holder
                    .map_or_else(|| format!("#{account_id}"), |a| a.display_name()),
                department: holder.and_then(|a| a.department.clone()),
                total,
                points: points::from_hundredths(total),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::{Duration, NaiveDate};

    fn october() -> Month {
        Month::new(2026, 10).unwrap()
    }

    fn day(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    #[tokio::test]
    async fn test_empty_month() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(leaderboard(&db, october(), None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_ranking_sums_and_ties() -> Result<()> {
        let db = setup_test_db().await?;
        let giver = create_employee(&db, "giver").await?;
        let first = create_employee(&db, "first").await?;
        let second = create_employee(&db, "second").await?;
        let third = create_employee(&db, "third").await?;

        insert_transfer(&db, giver.id, third.id, 5_000, at_noon(day(10, 2))).await?;
        insert_transfer(&db, giver.id, second.id, 5_000, at_noon(day(10, 3))).await?;
        insert_transfer(&db, giver.id, first.id, 2_500, at_noon(day(10, 4))).await?;
        insert_transfer(&db, giver.id, first.id, 7_500, at_noon(day(10, 5))).await?;

        let board = leaderboard(&db, october(), None).await?;
        let order: Vec<(usize, i64, i64)> = board
            .iter()
            .map(|e| (e.rank, e.account_id, e.total))
            .collect();
        // second and third tie on 50.00 and are ordered by id
        assert_eq!(
            order,
            vec![
                (1, first.id, 10_000),
                (2, second.id, 5_000),
                (3, third.id, 5_000)
            ]
        );
        assert_eq!(board[0].points, Decimal::new(10_000, 2));
        assert_eq!(board[0].display_name, first.display_name());

        let top = leaderboard(&db, october(), Some(1)).await?;
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].account_id, first.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_and_out_of_month_transfers_are_ignored() -> Result<()> {
        let db = setup_test_db().await?;
        let giver = create_employee(&db, "giver").await?;
        let reversed = create_employee(&db, "reversed").await?;
        let counted = create_employee(&db, "counted").await?;
        let admin = create_custom_account(&db, "admin", None, true).await?;

        let gone = insert_transfer(&db, giver.id, reversed.id, 9_000, at_noon(day(10, 6))).await?;
        mark_deleted(&db, gone.id, admin.id).await?;
        insert_transfer(&db, giver.id, counted.id, 1_000, at_noon(day(10, 6))).await?;
        // boundaries: last instant of September and first of November
        insert_transfer(&db, giver.id, counted.id, 4_000, october().start() - Duration::seconds(1))
            .await?;
        insert_transfer(&db, giver.id, counted.id, 4_000, october().end()).await?;

        let board = leaderboard(&db, october(), None).await?;
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].account_id, counted.id);
        assert_eq!(board[0].total, 1_000);
        Ok(())
    }
}
