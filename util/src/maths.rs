//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
///
/// If the source range is empty the start of the target range is returned.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    let span = source_range.1 - source_range.0;

    if span == T::zero() {
        return target_range.0;
    }

    target_range.0 + ((value - source_range.0) * (target_range.1 - target_range.0) / span)
}

/// Evaluate a polynomial at a value.
///
/// Coefficients are ordered highest power first, i.e. `[a, b, c]` is
/// `a*x^2 + b*x + c`. Evaluated using Horner's method.
pub fn poly_val<T>(value: T, coeffs: &[T]) -> T
where
    T: Float,
{
    coeffs
        .iter()
        .fold(T::zero(), |acc, &c| acc * value + c)
}

pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Round a value to the given number of decimal places.
///
/// Ties are rounded away from zero. Non-finite values are returned unchanged.
pub fn round<T>(value: T, decimals: i32) -> T
where
    T: Float,
{
    if !value.is_finite() {
        return value;
    }

    let scale = T::from(10.0).unwrap().powi(decimals);

    (value * scale).round() / scale
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap an angle into the range [-pi, pi).
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float,
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    rem_euclid(angle + pi_t, tau_t) - pi_t
}

/// Get the signed shortest angular distance to go from `a` to `b`.
///
/// Positive distances are anticlockwise (right hand grip rule about +Z).
pub fn get_ang_dist<T>(a: T, b: T) -> T
where
    T: Float,
{
    wrap_pi(b - a)
}
