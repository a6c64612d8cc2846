use bonus_ledger::{
    api::{self, AppState},
    config::{database, settings},
    core::account::{self, NewAccount},
    errors::Result,
};
use chrono::Utc;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = settings::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let policy = app_config.ledger.to_policy()?;
    info!(
        allowance = policy.monthly_allowance,
        max_attempts = policy.retry.max_attempts,
        "Ledger policy loaded"
    );

    // 4. Connect and make sure every table exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed configured accounts
    let seeds: Vec<NewAccount> = app_config.accounts.iter().map(NewAccount::from).collect();
    let created =
        account::seed_accounts(&db, &seeds, policy.monthly_allowance, Utc::now().date_naive())
            .await
            .inspect_err(|e| error!("Failed to seed accounts: {}", e))?;
    if created > 0 {
        info!("Seeded {} account(s)", created);
    }

    // 6. Serve the HTTP API
    api::serve(&app_config.server.bind_address, AppState::new(Arc::new(db), policy)).await
}
