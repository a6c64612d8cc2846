//! Role predicates over account title data.
//!
//! Director-tier and administrator-tier accounts are kept out of the bonus
//! program. Both checks are pure functions of the account's `position` and
//! `is_admin` fields.

use crate::entities::account;
use crate::errors::{Error, Result};

/// Job titles treated as director-tier unless configured otherwise
pub const DEFAULT_DIRECTOR_POSITIONS: [&str; 3] =
    ["General Director", "Technical Director", "Commercial Director"];

/// Job title treated as administrator-tier unless configured otherwise
pub const DEFAULT_ADMINISTRATOR_POSITION: &str = "Administrator";

/// Title lists used to classify accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePolicy {
    director_positions: Vec<String>,
    administrator_position: String,
}

impl Default for RolePolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_DIRECTOR_POSITIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
            DEFAULT_ADMINISTRATOR_POSITION.to_string(),
        )
    }
}

impl RolePolicy {
    #[must_use]
    pub fn new(director_positions: Vec<String>, administrator_position: String) -> Self {
        Self {
            director_positions: director_positions
                .into_iter()
                .map(|title| title.trim().to_string())
                .collect(),
            administrator_position: administrator_position.trim().to_string(),
        }
    }

    /// Whether a job title is one of the director titles.
    #[must_use]
    pub fn is_director_position(&self, position: Option<&str>) -> bool {
        position.is_some_and(|title| {
            let title = title.trim();
            self.director_positions.iter().any(|d| d == title)
        })
    }

    /// Administrator when flagged explicitly or holding the administrator title.
    #[must_use]
    pub fn is_administrator_role(&self, is_admin: bool, position: Option<&str>) -> bool {
        is_admin || position.is_some_and(|title| title.trim() == self.administrator_position)
    }

    #[must_use]
    pub fn is_director(&self, account: &account::Model) -> bool {
        self.is_director_position(account.position.as_deref())
    }

    #[must_use]
    pub fn is_administrator(&self, account: &account::Model) -> bool {
        self.is_administrator_role(account.is_admin, account.position.as_deref())
    }

    /// Whether the account may send or receive bonus points at all.
    #[must_use]
    pub fn participates(&self, account: &account::Model) -> bool {
        !self.is_director(account) && !self.is_administrator(account)
    }

    /// Fails with [`Error::Forbidden`] unless the account is an administrator.
    pub fn require_administrator(&self, account: &account::Model) -> Result<()> {
        if self.is_administrator(account) {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "account {} is not an administrator",
                account.id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::account_model;

    #[test]
    fn test_director_detection() {
        let policy = RolePolicy::default();
        assert!(policy.is_director_position(Some("General Director")));
        assert!(policy.is_director_position(Some(" Technical Director ")));
        assert!(!policy.is_director_position(Some("Engineer")));
        assert!(!policy.is_director_position(None));
    }

    #[test]
    fn test_administrator_detection() {
        let policy = RolePolicy::default();
        assert!(policy.is_administrator_role(true, None));
        assert!(policy.is_administrator_role(false, Some("Administrator")));
        assert!(!policy.is_administrator_role(false, Some("Engineer")));
        assert!(!policy.is_administrator_role(false, None));
    }

    #[test]
    fn test_custom_titles() {
        let policy = RolePolicy::new(vec!["CEO".to_string()], "Office Admin".to_string());
        assert!(policy.is_director_position(Some("CEO")));
        assert!(!policy.is_director_position(Some("General Director")));
        assert!(policy.is_administrator_role(false, Some("Office Admin")));
        assert!(!policy.is_administrator_role(false, Some("Administrator")));
    }

    #[test]
    fn test_participation_and_admin_requirement() {
        let policy = RolePolicy::default();
        let employee = account_model(1, Some("Engineer"), false);
        let director = account_model(2, Some("Commercial Director"), false);
        let admin = account_model(3, None, true);

        assert!(policy.participates(&employee));
        assert!(!policy.participates(&director));
        assert!(!policy.participates(&admin));

        assert!(policy.require_administrator(&admin).is_ok());
        assert!(matches!(
            policy.require_administrator(&employee),
            Err(Error::Forbidden { .. })
        ));
    }
}
