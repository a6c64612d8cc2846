//! Account directory - lookups, creation and seeding of employee accounts.

use crate::{
    core::roles::RolePolicy,
    entities::{Account, account},
    errors::{Error, Rejection, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use std::collections::HashMap;

/// Data for a new account.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub is_admin: bool,
}

/// Checks a phone number against `+?1?` followed by 9 to 15 digits.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    match digits.len() {
        9..=15 => true,
        // the optional leading 1 may precede a full 15 digit number
        16 => digits.starts_with('1'),
        _ => false,
    }
}

/// Trims an optional text field, mapping blank input to `None`.
pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Finds an account by its unique ID.
pub async fn get_account<C>(conn: &C, account_id: i64) -> Result<Option<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find_by_id(account_id)
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Finds an account by ID, failing with [`Error::AccountNotFound`].
pub async fn require_account<C>(conn: &C, account_id: i64) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    get_account(conn, account_id)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })
}

/// Reads an account inside a transaction, taking a row lock where the
/// backend supports `SELECT ... FOR UPDATE`.
pub(crate) async fn lock_account<C>(conn: &C, account_id: i64) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    Account::find_by_id(account_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })
}

/// Finds an account by its login email.
pub async fn get_account_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<account::Model>> {
    Account::find()
        .filter(account::Column::Email.eq(email.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads the given accounts keyed by ID. Unknown IDs are skipped.
pub async fn accounts_by_ids<C>(conn: &C, ids: &[i64]) -> Result<HashMap<i64, account::Model>>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let accounts = Account::find()
        .filter(account::Column::Id.is_in(ids.iter().copied()))
        .all(conn)
        .await?;

    Ok(accounts.into_iter().map(|a| (a.id, a)).collect())
}

/// Creates an account with a full allowance as of `today`.
pub async fn create_account(
    db: &DatabaseConnection,
    new_account: NewAccount,
    monthly_allowance: i64,
    today: NaiveDate,
) -> Result<account::Model> {
    let email = new_account.email.trim().to_string();
    if email.is_empty() {
        return Err(Rejection::MissingField { field: "email" }.into());
    }
    if new_account.first_name.trim().is_empty() {
        return Err(Rejection::MissingField {
            field: "first_name",
        }
        .into());
    }
    if new_account.last_name.trim().is_empty() {
        return Err(Rejection::MissingField { field: "last_name" }.into());
    }

    let phone = clean_optional(new_account.phone);
    if let Some(phone) = &phone {
        if !is_valid_phone(phone) {
            return Err(Rejection::InvalidPhone {
                phone: phone.clone(),
            }
            .into());
        }
    }

    let model = account::ActiveModel {
        email: Set(email),
        first_name: Set(new_account.first_name.trim().to_string()),
        last_name: Set(new_account.last_name.trim().to_string()),
        middle_name: Set(new_account.middle_name.trim().to_string()),
        phone: Set(phone),
        department: Set(clean_optional(new_account.department)),
        position: Set(clean_optional(new_account.position)),
        birth_date: Set(new_account.birth_date),
        is_admin: Set(new_account.is_admin),
        monthly_allowance: Set(monthly_allowance),
        received_total: Set(0),
        last_reset: Set(today),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    tracing::info!(account_id = created.id, email = %created.email, "Account created");
    Ok(created)
}

/// Creates every seed account whose email is not registered yet.
///
/// Returns the number of accounts created.
pub async fn seed_accounts(
    db: &DatabaseConnection,
    seeds: &[NewAccount],
    monthly_allowance: i64,
    today: NaiveDate,
) -> Result<usize> {
    let mut created = 0;
    for seed in seeds {
        if get_account_by_email(db, &seed.email).await?.is_some() {
            tracing::debug!(email = %seed.email, "Seed account already present");
            continue;
        }
        create_account(db, seed.clone(), monthly_allowance, today).await?;
        created += 1;
    }
    Ok(created)
}

/// Accounts the sender may give points to: everyone except the sender,
/// directors and administrators, ordered by last then first name.
pub async fn eligible_recipients(
    db: &DatabaseConnection,
    roles: &RolePolicy,
    sender: &account::Model,
) -> Result<Vec<account::Model>> {
    let candidates = Account::find()
        .filter(account::Column::Id.ne(sender.id))
        .order_by_asc(account::Column::LastName)
        .order_by_asc(account::Column::FirstName)
        .all(db)
        .await?;

    Ok(candidates
        .into_iter()
        .filter(|candidate| roles.participates(candidate))
        .collect())
}
