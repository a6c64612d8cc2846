/// Database connection and table creation
pub mod database;

/// Ledger, server and seed-account settings from config.toml
pub mod settings;
