use crate::BrError;

/// Floating point type used throughout the workspace
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, BrError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(BrError::NonFinite { what, value: v })
    }
}

pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, BrError> {
    let v = ensure_finite(v, what)?;
    if v < 0.0 {
        Err(BrError::Negative { what, value: v })
    } else {
        Ok(v)
    }
}

/// Largest relative change between two equally sized vectors, with each
/// entry scaled by `max(|new|, 1)` so near-empty components do not dominate.
pub fn max_relative_change(old: &[Real], new: &[Real]) -> Real {
    old.iter()
        .zip(new)
        .map(|(o, n)| (n - o).abs() / n.abs().max(1.0))
        .fold(0.0, Real::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn negative_flow_is_rejected() {
        assert_eq!(ensure_non_negative(0.0, "flow").unwrap(), 0.0);
        let err = ensure_non_negative(-1.0, "flow").unwrap_err();
        assert!(format!("{err}").contains("flow"));
        assert!(ensure_non_negative(Real::INFINITY, "flow").is_err());
    }

    #[test]
    fn relative_change_uses_unit_floor() {
        let old = [0.0, 100.0];
        let new = [0.5, 101.0];
        // 0.5 / 1.0 dominates 1.0 / 101.0
        assert!((max_relative_change(&old, &new) - 0.5).abs() < 1e-12);
    }
}
