//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;
pub mod news;
pub mod notification;
pub mod staff_member;
pub mod transfer;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
pub use news::{Column as NewsColumn, Entity as News, Model as NewsModel};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
};
pub use staff_member::{
    Column as StaffMemberColumn, Entity as StaffMember, Model as StaffMemberModel,
};
pub use transfer::{Column as TransferColumn, Entity as Transfer, Model as TransferModel};
