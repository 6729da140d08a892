//! Ingredient quantities.

use crate::error::{DomainError, DomainResult};

/// Amount of an ingredient, in the unit the kitchen stocks it in.
pub type Quantity = f64;

/// Reject NaN, infinities and negative amounts.
pub fn ensure_quantity(value: Quantity, what: &str) -> DomainResult<Quantity> {
    if !value.is_finite() {
        return Err(DomainError::validation(format!("{what} must be a finite number")));
    }
    if value < 0.0 {
        return Err(DomainError::validation(format!("{what} cannot be negative")));
    }
    Ok(value)
}

/// Amounts closer together than this are treated as equal.
pub const QUANTITY_EPSILON: Quantity = 1e-9;

/// Whether `available` covers `required`, ignoring floating-point drift.
pub fn covers(available: Quantity, required: Quantity) -> bool {
    available + QUANTITY_EPSILON >= required
}

/// Snap amounts within [`QUANTITY_EPSILON`] of zero to exactly zero.
pub fn settle(value: Quantity) -> Quantity {
    if value.abs() < QUANTITY_EPSILON { 0.0 } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_nan_and_negatives() {
        assert!(ensure_quantity(f64::NAN, "qty").is_err());
        assert!(ensure_quantity(f64::INFINITY, "qty").is_err());
        assert!(ensure_quantity(-0.5, "qty").is_err());
    }

    #[test]
    fn drift_does_not_hide_exact_cover() {
        let need = 0.1 * 3.0;
        assert!(need > 0.3);
        assert!(covers(0.3, need));
        assert!(!covers(0.29, need));
        assert_eq!(settle(0.3 - need), 0.0);
        assert_eq!(settle(0.5), 0.5);
    }

    proptest! {
        #[test]
        fn accepts_any_non_negative_finite(v in 0.0f64..1e9) {
            prop_assert_eq!(ensure_quantity(v, "qty").unwrap(), v);
        }
    }
}
