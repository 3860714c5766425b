use std::f64::consts::{PI, TAU};

/// Absolute tolerance used when checking whether an angle already lies inside a bound.
pub const ANGLE_BOUND_TOLERANCE: f64 = 1e-9;

/// Wraps the given angle into the half-open interval (-pi, pi].
///
/// ## Example
/// ```
/// use std::f64::consts::PI;
/// use optima_analytical_ik::utils::utils_math::angles::normalize_angle;
///
/// assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
/// assert!((normalize_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
/// ```
pub fn normalize_angle(angle: f64) -> f64 {
    let mut out = angle % TAU;
    if out <= -PI { out += TAU; }
    else if out > PI { out -= TAU; }
    return out;
}

/// Signed difference `a - b` wrapped into (-pi, pi].
pub fn wrapped_angle_difference(a: f64, b: f64) -> f64 {
    return normalize_angle(a - b);
}

/// Shifts `angle` by an integer multiple of 2*pi so that it lands within [lower, upper].  When
/// several shifts fit, the one closest to the given angle wins, which means an angle that is
/// already in bounds is returned unchanged.  Returns `None` when no shift fits.
///
/// ## Example
/// ```
/// use std::f64::consts::PI;
/// use optima_analytical_ik::utils::utils_math::angles::fit_angle_within_bounds;
///
/// let fitted = fit_angle_within_bounds(-3.0, 0.0, 2.0 * PI).unwrap();
/// assert!((fitted - (2.0 * PI - 3.0)).abs() < 1e-12);
/// assert!(fit_angle_within_bounds(3.0, -0.5, 0.5).is_none());
/// ```
pub fn fit_angle_within_bounds(angle: f64, lower: f64, upper: f64) -> Option<f64> {
    if !angle.is_finite() || lower > upper { return None; }
    if angle >= lower - ANGLE_BOUND_TOLERANCE && angle <= upper + ANGLE_BOUND_TOLERANCE { return Some(angle); }

    let candidate = if angle < lower {
        angle + ((lower - angle) / TAU).ceil() * TAU
    } else {
        angle - ((angle - upper) / TAU).ceil() * TAU
    };

    return if candidate >= lower - ANGLE_BOUND_TOLERANCE && candidate <= upper + ANGLE_BOUND_TOLERANCE {
        Some(candidate)
    } else {
        None
    }
}

/// Returns the 2*pi-equivalent of `angle` that is closest to `reference`.
pub fn nearest_equivalent_angle(angle: f64, reference: f64) -> f64 {
    return reference + wrapped_angle_difference(angle, reference);
}
