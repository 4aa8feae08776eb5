//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Normalise an angle in degrees into the range [-180, 180).
///
/// The remainder is kept non-negative before the offset is removed so that
/// negative inputs wrap correctly.
pub fn norm_angle_deg<T>(angle_deg: T) -> T
where
    T: Float
{
    let half_turn = T::from(180.0).unwrap();
    let full_turn = T::from(360.0).unwrap();

    let norm = rem_euclid(angle_deg + half_turn, full_turn) - half_turn;

    // Round-off in rem_euclid can land exactly on the excluded upper bound
    if norm >= half_turn {
        norm - full_turn
    }
    else {
        norm
    }
}

/// Round a value to the given number of decimal places.
pub fn round_dp<T>(value: T, decimals: u32) -> T
where
    T: Float
{
    let scale = T::from(10f64.powi(decimals as i32)).unwrap();
    (value * scale).round() / scale
}
