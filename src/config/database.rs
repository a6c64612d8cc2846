//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL.

use crate::entities::{Account, News, Notification, StaffMember, Transfer};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/bonus_ledger.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable,
/// falling back to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(dir) = sqlite_parent_dir(&database_url) {
        std::fs::create_dir_all(dir)?;
    }
    tracing::debug!("Connecting to {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Directory holding a file-backed `SQLite` database, if it has one.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let file = database_url.strip_prefix("sqlite://")?;
    let file = file.split('?').next().unwrap_or(file);
    if file.is_empty() || file.contains(":memory:") {
        return None;
    }
    Path::new(file)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Creates all tables that do not exist yet.
///
/// Accounts come first so that foreign keys from transfers, notifications and
/// news resolve on backends that check them at creation time.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let statements = [
        schema
            .create_table_from_entity(Account)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(Transfer)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(Notification)
            .if_not_exists()
            .to_owned(),
        schema.create_table_from_entity(News).if_not_exists().to_owned(),
        schema
            .create_table_from_entity(StaffMember)
            .if_not_exists()
            .to_owned(),
    ];

    for statement in &statements {
        db.execute(builder.build(statement)).await?;
    }

    Ok(())
}
