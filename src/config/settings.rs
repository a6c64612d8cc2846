//! Application settings loaded from config.toml
//!
//! The file is optional: every section has defaults, so a fresh checkout runs
//! with a 1000-point allowance and the standard director titles. Accounts
//! listed under `[[accounts]]` are seeded on startup.

use crate::core::{
    LedgerPolicy, account::NewAccount, points,
    retry::RetryPolicy,
    roles::{DEFAULT_ADMINISTRATOR_POSITION, DEFAULT_DIRECTOR_POSITIONS, RolePolicy},
};
use crate::errors::{Error, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::{path::Path, time::Duration};

/// Environment variable pointing at the configuration file
pub const CONFIG_PATH_VAR: &str = "BONUS_LEDGER_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub ledger: LedgerSettings,
    #[serde(default)]
    pub server: ServerSettings,
    /// Accounts to create when missing
    #[serde(default)]
    pub accounts: Vec<AccountSeed>,
}

/// `[ledger]` section
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LedgerSettings {
    /// Points every account gets at the start of a month
    pub monthly_allowance: Decimal,
    /// Job titles that make an account director-tier
    pub director_positions: Vec<String>,
    /// Job title that makes an account administrator-tier
    pub administrator_position: String,
    /// Attempts per ledger operation when a concurrent update is detected
    pub max_attempts: u32,
    /// Delay before the first retry, doubled for each further attempt
    pub retry_backoff_ms: u64,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            monthly_allowance: Decimal::new(100_000, 2),
            director_positions: DEFAULT_DIRECTOR_POSITIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
            administrator_position: DEFAULT_ADMINISTRATOR_POSITION.to_string(),
            max_attempts: 3,
            retry_backoff_ms: 20,
        }
    }
}

impl LedgerSettings {
    /// Builds the runtime policy handed to every ledger operation.
    pub fn to_policy(&self) -> Result<LedgerPolicy> {
        if self.monthly_allowance <= Decimal::ZERO {
            return Err(Error::Config {
                message: format!(
                    "monthly_allowance must be positive, got {}",
                    self.monthly_allowance
                ),
            });
        }
        if self.max_attempts == 0 {
            return Err(Error::Config {
                message: "max_attempts must be at least 1".to_string(),
            });
        }

        let monthly_allowance =
            points::to_hundredths(self.monthly_allowance).map_err(|e| Error::Config {
                message: format!("monthly_allowance: {e}"),
            })?;

        Ok(LedgerPolicy {
            monthly_allowance,
            roles: RolePolicy::new(
                self.director_positions.clone(),
                self.administrator_position.clone(),
            ),
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                initial_backoff: Duration::from_millis(self.retry_backoff_ms),
            },
        })
    }
}

/// `[server]` section
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// One `[[accounts]]` entry
#[derive(Debug, Deserialize, Clone)]
pub struct AccountSeed {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_admin: bool,
}

impl From<&AccountSeed> for NewAccount {
    fn from(seed: &AccountSeed) -> Self {
        Self {
            email: seed.email.clone(),
            first_name: seed.first_name.clone(),
            last_name: seed.last_name.clone(),
            middle_name: seed.middle_name.clone(),
            phone: seed.phone.clone(),
            department: seed.department.clone(),
            position: seed.position.clone(),
            birth_date: seed.birth_date,
            is_admin: seed.is_admin,
        }
    }
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    tracing::debug!("Loading configuration from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from `$BONUS_LEDGER_CONFIG` or ./config.toml,
/// falling back to defaults when the file does not exist.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    if Path::new(&path).exists() {
        load_config(&path)
    } else {
        tracing::info!("No configuration file at {}, using defaults", path);
        Ok(AppConfig::default())
    }
}
