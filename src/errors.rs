//! Unified error types for the bonus ledger.
//!
//! Ledger rule violations are grouped under [`Rejection`] so callers can show
//! them to the user verbatim. Everything else is either a lookup miss, a
//! permission problem, a concurrency conflict, or infrastructure failure.

use rust_decimal::Decimal;
use sea_orm::{DbErr, RuntimeErr};
use thiserror::Error;

/// Reasons a request is refused without touching any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Sender and recipient are the same account.
    #[error("You cannot send bonus points to yourself")]
    SelfTransfer,

    /// Directors never receive bonus points.
    #[error("Bonus points cannot be sent to directors")]
    RecipientIsDirector,

    /// Administrators never receive bonus points.
    #[error("Bonus points cannot be sent to an administrator")]
    RecipientIsAdministrator,

    /// Directors never send bonus points.
    #[error("Directors cannot send bonus points")]
    SenderIsDirector,

    /// Administrators never send bonus points.
    #[error("Administrators cannot send bonus points")]
    SenderIsAdministrator,

    #[error("Amount must be greater than zero, got {amount}")]
    NonPositiveAmount { amount: Decimal },

    #[error("Insufficient points: {available} available, {requested} requested")]
    InsufficientAllowance {
        available: Decimal,
        requested: Decimal,
    },

    #[error("Amount {amount} must have at most 2 decimal places and 10 digits")]
    InvalidAmountPrecision { amount: Decimal },

    #[error("An explanation is required")]
    EmptyExplanation,

    #[error("Invalid month '{input}', expected YYYY-MM")]
    InvalidMonth { input: String },

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("Invalid phone number '{phone}': use the format '+999999999', up to 15 digits")]
    InvalidPhone { phone: String },
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// A ledger or input rule refused the request.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("Account {id} not found")]
    AccountNotFound { id: i64 },

    #[error("Transfer {id} not found")]
    TransferNotFound { id: i64 },

    #[error("Staff member {id} not found")]
    StaffMemberNotFound { id: i64 },

    #[error("Transfer {id} has already been reversed")]
    AlreadyReversed { id: i64 },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Missing or invalid employee identity")]
    Unauthenticated,

    /// Concurrent modification detected; the operation may be retried.
    #[error("Concurrent modification: {message}")]
    Conflict { message: String },

    #[error("Ledger is busy, gave up after {attempts} attempts")]
    Busy { attempts: u32 },
}

impl Error {
    /// Whether retrying the whole operation could succeed.
    ///
    /// Busy, locked, serialization and deadlock errors reported by the
    /// database driver count as conflicts as well as the explicit guard misses.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::Conflict { .. } => true,
            Self::Database(DbErr::Conn(err) | DbErr::Exec(err) | DbErr::Query(err)) => {
                let RuntimeErr::SqlxError(err) = err else {
                    return false;
                };
                err.as_database_error()
                    .and_then(|db_err| db_err.code())
                    .is_some_and(|code| is_transient_code(&code))
            }
            _ => false,
        }
    }

    pub(crate) fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

/// SQLite `SQLITE_BUSY`/`SQLITE_LOCKED` (including extended codes) and the
/// Postgres serialization failure and deadlock SQLSTATEs.
///
/// SQLSTATEs are always five characters; SQLite codes stay below 10000.
fn is_transient_code(code: &str) -> bool {
    match code {
        "40001" | "40P01" => true,
        _ if code.len() < 5 => code
            .parse::<u32>()
            .is_ok_and(|code| matches!(code & 0xff, 5 | 6)),
        _ => false,
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use sea_orm::sqlx::error::{DatabaseError, ErrorKind};
    use sea_orm::{ConnectionTrait, Database};
    use std::borrow::Cow;

    /// Driver error carrying only a result code.
    #[derive(Debug)]
    struct CodedError(&'static str);

    impl std::fmt::Display for CodedError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "error code {}", self.0)
        }
    }

    impl std::error::Error for CodedError {}

    impl DatabaseError for CodedError {
        fn message(&self) -> &str {
            "coded error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    fn driver_error(code: &'static str) -> Error {
        let err = sea_orm::sqlx::Error::Database(Box::new(CodedError(code)));
        Error::Database(DbErr::Exec(RuntimeErr::SqlxError(err)))
    }

    #[test]
    fn test_conflict_detection() {
        assert!(Error::conflict("guard missed").is_conflict());
        assert!(!Error::Rejected(Rejection::SelfTransfer).is_conflict());

        // busy, locked, busy_snapshot, serialization failure, deadlock
        for code in ["5", "6", "517", "40001", "40P01"] {
            assert!(driver_error(code).is_conflict(), "code {code}");
        }
        // generic error, unique constraint, Postgres unique and privilege errors
        for code in ["1", "2067", "23505", "42501"] {
            assert!(!driver_error(code).is_conflict(), "code {code}");
        }
    }

    #[test]
    fn test_messages_do_not_make_conflicts() {
        for message in ["database is locked", "deadlock detected", "could not serialize access"] {
            let err = Error::Database(DbErr::Custom(message.to_string()));
            assert!(!err.is_conflict(), "{message}");
            let err = Error::Database(DbErr::Exec(RuntimeErr::Internal(message.to_string())));
            assert!(!err.is_conflict(), "{message}");
        }
    }

    #[tokio::test]
    async fn test_real_driver_errors_are_not_conflicts() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.execute_unprepared("CREATE TABLE locked_notes (id INTEGER PRIMARY KEY)")
            .await
            .unwrap();
        db.execute_unprepared("INSERT INTO locked_notes (id) VALUES (1)")
            .await
            .unwrap();

        let err: Error = db
            .execute_unprepared("INSERT INTO locked_notes (id) VALUES (1)")
            .await
            .unwrap_err()
            .into();
        assert!(!err.is_conflict(), "{err}");

        let err: Error = db
            .execute_unprepared("SELEC nothing")
            .await
            .unwrap_err()
            .into();
        assert!(!err.is_conflict(), "{err}");
    }

    #[test]
    fn test_rejection_messages() {
        let err: Error = Rejection::InsufficientAllowance {
            available: Decimal::new(5000, 2),
            requested: Decimal::new(10000, 2),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Insufficient points: 50.00 available, 100.00 requested"
        );
        assert_eq!(
            Error::AlreadyReversed { id: 7 }.to_string(),
            "Transfer 7 has already been reversed"
        );
    }
}
