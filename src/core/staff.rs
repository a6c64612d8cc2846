//! Staff directory and the administrator dashboard counters.
//!
//! Staff members are people tracked by the office who may not have a portal
//! account. Only administrators can change the directory.

use crate::{
    core::{
        account::{clean_optional, is_valid_phone},
        news,
        roles::RolePolicy,
        transfer,
    },
    entities::{StaffMember, account, staff_member},
    errors::{Error, Rejection, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};

/// Data for a new staff record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStaffMember {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Defaults to today
    #[serde(default)]
    pub office_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Counters shown on the administrator dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub active_staff: u64,
    pub active_transfers: u64,
    pub news_posts: u64,
}

/// Adds a staff record. Names are required; a phone number, when given,
/// must look like `+999999999` with up to 15 digits.
pub async fn add_staff_member(
    db: &DatabaseConnection,
    roles: &RolePolicy,
    actor: &account::Model,
    new_member: NewStaffMember,
) -> Result<staff_member::Model> {
    roles.require_administrator(actor)?;

    if new_member.first_name.trim().is_empty() {
        return Err(Rejection::MissingField {
            field: "first_name",
        }
        .into());
    }
    if new_member.last_name.trim().is_empty() {
        return Err(Rejection::MissingField { field: "last_name" }.into());
    }
    let phone = clean_optional(new_member.phone);
    if let Some(phone) = &phone {
        if !is_valid_phone(phone) {
            return Err(Rejection::InvalidPhone {
                phone: phone.clone(),
            }
            .into());
        }
    }

    let created = staff_member::ActiveModel {
        first_name: Set(new_member.first_name.trim().to_string()),
        last_name: Set(new_member.last_name.trim().to_string()),
        middle_name: Set(new_member.middle_name.trim().to_string()),
        phone: Set(phone),
        email: Set(clean_optional(new_member.email)),
        department: Set(clean_optional(new_member.department)),
        position: Set(clean_optional(new_member.position)),
        birth_date: Set(new_member.birth_date),
        office_start_date: Set(new_member
            .office_start_date
            .unwrap_or_else(|| Utc::now().date_naive())),
        is_active: Set(new_member.is_active.unwrap_or(true)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(
        staff_member_id = created.id,
        actor_id = actor.id,
        "Staff member added"
    );
    Ok(created)
}

/// Every staff record, most recently added first.
pub async fn list_staff_members(db: &DatabaseConnection) -> Result<Vec<staff_member::Model>> {
    StaffMember::find()
        .order_by_desc(staff_member::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a staff record.
pub async fn remove_staff_member(
    db: &DatabaseConnection,
    roles: &RolePolicy,
    actor: &account::Model,
    staff_member_id: i64,
) -> Result<()> {
    roles.require_administrator(actor)?;

    let result = StaffMember::delete_by_id(staff_member_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::StaffMemberNotFound {
            id: staff_member_id,
        });
    }

    tracing::info!(staff_member_id, actor_id = actor.id, "Staff member removed");
    Ok(())
}

/// Dashboard counters for administrators.
pub async fn admin_stats(db: &DatabaseConnection) -> Result<AdminStats> {
    let active_staff = StaffMember::find()
        .filter(staff_member::Column::IsActive.eq(true))
        .count(db)
        .await?;

    Ok(AdminStats {
        active_staff,
        active_transfers: transfer::count_active_transfers(db).await?,
        news_posts: news::count_news(db).await?,
    })
}
