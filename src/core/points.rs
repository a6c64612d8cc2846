//! Conversion between user-facing decimal points and stored hundredths.
//!
//! Balances and amounts are persisted as whole hundredths of a point so that
//! all arithmetic, including the guarded SQL updates, is exact.

use crate::errors::Rejection;
use rust_decimal::{Decimal, prelude::ToPrimitive};

/// Largest representable amount: 10 digits with 2 of them after the point.
const MAX_HUNDREDTHS: i64 = 9_999_999_999;

/// Converts a decimal point value into hundredths.
///
/// Rejects values with more than two fraction digits or more than ten
/// digits overall. The sign is preserved; positivity is a ledger rule and
/// checked separately.
pub fn to_hundredths(amount: Decimal) -> Result<i64, Rejection> {
    let invalid = || Rejection::InvalidAmountPrecision { amount };

    let normalized = amount.normalize();
    if normalized.scale() > 2 {
        return Err(invalid());
    }

    let hundredths = normalized
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|value| value.to_i64())
        .ok_or_else(invalid)?;
    if hundredths.abs() > MAX_HUNDREDTHS {
        return Err(invalid());
    }

    Ok(hundredths)
}

/// Converts stored hundredths back into a two-place decimal.
#[must_use]
pub fn from_hundredths(hundredths: i64) -> Decimal {
    Decimal::new(hundredths, 2)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_to_hundredths() {
        assert_eq!(to_hundredths(Decimal::from(300)).unwrap(), 30_000);
        assert_eq!(to_hundredths(Decimal::from_str("0.01").unwrap()).unwrap(), 1);
        assert_eq!(to_hundredths(Decimal::from_str("12.50").unwrap()).unwrap(), 1_250);
        // trailing zeros beyond two places are harmless
        assert_eq!(
            to_hundredths(Decimal::from_str("7.1000").unwrap()).unwrap(),
            710
        );
        assert_eq!(to_hundredths(Decimal::from(-5)).unwrap(), -500);
    }

    #[test]
    fn test_to_hundredths_rejects_precision_and_range() {
        let amount = Decimal::from_str("0.001").unwrap();
        assert_eq!(
            to_hundredths(amount),
            Err(Rejection::InvalidAmountPrecision { amount })
        );

        let amount = Decimal::from(100_000_000);
        assert!(to_hundredths(amount).is_err());
        assert!(to_hundredths(Decimal::from_str("99999999.99").unwrap()).is_ok());
    }

    #[test]
    fn test_from_hundredths_keeps_two_places() {
        assert_eq!(from_hundredths(70_000).to_string(), "700.00");
        assert_eq!(from_hundredths(5).to_string(), "0.05");
        assert_eq!(from_hundredths(0).to_string(), "0.00");
    }
}
