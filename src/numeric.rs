//! Numeric helpers for attribute values.
//!
//! Values are plain `f64`. Change detection never compares floats exactly;
//! it goes through [`values_differ`] with [`VALUE_EPSILON`].

/// Type alias for attribute values.
pub type AttrValue = f64;

/// Smallest difference treated as a real change in value.
pub const VALUE_EPSILON: AttrValue = 1e-4;

/// Whether two values differ by more than [`VALUE_EPSILON`].
///
/// # Examples
///
/// ```rust
/// use statforge::numeric::values_differ;
///
/// assert!(!values_differ(100.0, 100.00001));
/// assert!(values_differ(100.0, 100.01));
/// ```
pub fn values_differ(a: AttrValue, b: AttrValue) -> bool {
    (a - b).abs() > VALUE_EPSILON
}

/// Clamp a ratio into `[0, 1]`. NaN maps to 0.
pub fn clamp01(ratio: AttrValue) -> AttrValue {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// Multiplier for a percent-change value: `50` becomes `1.5`, `-20` becomes `0.8`.
pub fn percent_factor(percent: AttrValue) -> AttrValue {
    1.0 + percent / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_differ_threshold() {
        assert!(!values_differ(1.0, 1.0 + VALUE_EPSILON / 2.0));
        assert!(values_differ(1.0, 1.0 + VALUE_EPSILON * 2.0));
        assert!(values_differ(-5.0, 5.0));
    }

    #[test]
    fn test_clamp01() {
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(0.25), 0.25);
        assert_eq!(clamp01(3.0), 1.0);
        assert_eq!(clamp01(f64::NAN), 0.0);
    }

    #[test]
    fn test_percent_factor() {
        assert_eq!(percent_factor(50.0), 1.5);
        assert_eq!(percent_factor(0.0), 1.0);
        assert!((percent_factor(-20.0) - 0.8).abs() < 1e-12);
    }
}
