//! Conversion between decimal display amounts and the integer minor-unit
//! (cent) representation used for every persisted monetary value.
//!
//! Storage conversion rounds half away from zero rather than truncating,
//! so `4.10` stores as `410` even though its closest f64 sits fractionally
//! below it. Round trips are exact for amounts that are an integral number
//! of cents; fractional-cent inputs lose the sub-cent remainder.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MoneyError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Largest minor-unit magnitude representable without f64 precision loss.
const MAX_MINOR_UNITS: f64 = (1i64 << 53) as f64;

/// Convert a decimal amount to minor units (cents), rounding half away
/// from zero. Fails on non-finite input or amounts too large to hold
/// exactly in an `i64` cent count.
pub fn to_storage(amount: f64) -> Result<i64, MoneyError> {
    if !amount.is_finite() {
        return Err(MoneyError::InvalidAmount(format!(
            "amount must be finite, got {amount}"
        )));
    }
    let minor = (amount * 100.0).round();
    if minor.abs() > MAX_MINOR_UNITS {
        return Err(MoneyError::InvalidAmount(format!(
            "amount {amount} exceeds representable range"
        )));
    }
    Ok(minor as i64)
}

/// Convert minor units (cents) back to a decimal display amount.
pub fn to_display(minor: i64) -> f64 {
    minor as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_integral_cents() {
        for cents in [0i64, 1, 99, 100, 999, 3197, 123_456_789] {
            assert_eq!(to_storage(to_display(cents)).unwrap(), cents);
        }
    }

    #[test]
    fn rounds_half_away_from_zero() {
        // 4.10 is 4.0999999999999996 in f64; truncation would lose a cent.
        assert_eq!(to_storage(4.10).unwrap(), 410);
        assert_eq!(to_storage(9.99).unwrap(), 999);
        assert_eq!(to_storage(0.0).unwrap(), 0);
        assert_eq!(to_storage(19.98).unwrap(), 1998);
    }

    #[test]
    fn rejects_non_finite_amounts() {
        assert!(matches!(
            to_storage(f64::NAN),
            Err(MoneyError::InvalidAmount(_))
        ));
        assert!(matches!(
            to_storage(f64::INFINITY),
            Err(MoneyError::InvalidAmount(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_amounts() {
        assert!(to_storage(1e18).is_err());
    }

    #[test]
    fn displays_cents_as_decimal() {
        assert_eq!(to_display(3197), 31.97);
        assert_eq!(to_display(0), 0.0);
    }
}
