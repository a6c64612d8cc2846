//! Account entity - an employee registered in the portal.
//!
//! Each account carries two independent point balances: the spendable
//! `monthly_allowance`, which is reset at the start of every month, and the
//! lifetime `received_total`. Role data (`is_admin`, `position`) decides
//! whether the account may take part in transfers at all.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login email, unique across accounts
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Patronymic; empty when not applicable
    pub middle_name: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    /// Job title, used for director and administrator detection
    pub position: Option<String>,
    pub birth_date: Option<Date>,
    /// Explicit administrator flag
    pub is_admin: bool,
    /// Points the account can still give away this month, in hundredths
    pub monthly_allowance: i64,
    /// Points received over the account's lifetime, in hundredths
    pub received_total: i64,
    /// Date of the last monthly allowance reset
    pub last_reset: Date,
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Spendable allowance as a decimal point value.
    #[must_use]
    pub fn allowance_points(&self) -> Decimal {
        crate::core::points::from_hundredths(self.monthly_allowance)
    }

    /// Lifetime received points as a decimal point value.
    #[must_use]
    pub fn received_points(&self) -> Decimal {
        crate::core::points::from_hundredths(self.received_total)
    }

    /// `last first middle`, skipping empty parts.
    #[must_use]
    pub fn display_name(&self) -> String {
        [&self.last_name, &self.first_name, &self.middle_name]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Defines relationships between Account and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One account has many notifications
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
    /// One account authors many news posts
    #[sea_orm(has_many = "super::news::Entity")]
    News,
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl Related<super::news::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::News.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
