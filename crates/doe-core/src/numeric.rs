use crate::{CoreError, CoreResult};

/// Scalar type for dimensions, spacings and pressures.
pub type Real = f64;

/// Pass `v` through unless it is NaN or infinite.
pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        return Ok(v);
    }
    Err(CoreError::NonFinite { what, value: v })
}

/// Reject values outside the half-open interval `(0, 1]`.
pub fn ensure_unit_fraction(v: Real, what: &'static str) -> CoreResult<Real> {
    match ensure_finite(v, what)? {
        v if v > 0.0 && v <= 1.0 => Ok(v),
        _ => Err(CoreError::InvalidArg { what }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_values_pass_through() {
        assert_eq!(ensure_finite(-3.5, "dp").unwrap(), -3.5);
        let err = ensure_finite(Real::NAN, "plate_length").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("plate_length"));
        assert!(ensure_finite(Real::NEG_INFINITY, "dp").is_err());
    }

    #[test]
    fn unit_fraction_bounds() {
        assert!(ensure_unit_fraction(1.0, "urf").is_ok());
        assert!(ensure_unit_fraction(0.25, "urf").is_ok());
        assert!(ensure_unit_fraction(0.0, "urf").is_err());
        assert!(ensure_unit_fraction(1.5, "urf").is_err());
        assert!(ensure_unit_fraction(Real::INFINITY, "urf").is_err());
    }
}
