//! Staff member entity - company employees tracked by administrators
//! who do not necessarily have a portal account.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staff member database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff_members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub birth_date: Option<Date>,
    /// First day in the office
    pub office_start_date: Date,
    /// Whether the person still works here
    pub is_active: bool,
}

/// `StaffMember` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
