//! Core business logic - framework-agnostic ledger operations.
//!
//! Every operation takes the acting account and the [`LedgerPolicy`] as
//! explicit parameters; nothing here reads ambient request state.

pub mod account;
pub mod allowance;
pub mod leaderboard;
pub mod month;
pub mod news;
pub mod notification;
pub mod points;
pub mod retry;
pub mod roles;
pub mod staff;
pub mod transfer;

use retry::RetryPolicy;
use roles::RolePolicy;

/// Monthly allowance every account starts a month with, in hundredths.
pub const DEFAULT_MONTHLY_ALLOWANCE: i64 = 100_000;

/// Runtime rules shared by all ledger operations.
#[derive(Debug, Clone)]
pub struct LedgerPolicy {
    /// Allowance granted at each monthly reset, in hundredths of a point
    pub monthly_allowance: i64,
    /// Director and administrator detection
    pub roles: RolePolicy,
    /// Retry behaviour on concurrent modification
    pub retry: RetryPolicy,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            monthly_allowance: DEFAULT_MONTHLY_ALLOWANCE,
            roles: RolePolicy::default(),
            retry: RetryPolicy::default(),
        }
    }
}
