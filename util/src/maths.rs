//! Utility maths functions
//!
//! Angles passed to the `*_deg` style helpers are in degrees, which is the
//! unit used for all headings stored in a `Position`. Radians are only used
//! at the boundary with trajectory poses.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Size of a full circle in degrees.
pub const FULL_CIRCLE_DEG: f64 = 360.0;

/// Size of a half circle in degrees.
pub const HALF_CIRCLE_DEG: f64 = 180.0;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

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

/// Clamp a value to within `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T 
where
    T: Float
{
    value.max(min).min(max)
}

/// Clamp a value to within `[-1, 1]`.
///
/// NaN is passed through unchanged so that callers can detect it.
pub fn limit<T>(value: T) -> T
where
    T: Float
{
    if value.is_nan() {
        return value;
    }
    clamp(value, -T::one(), T::one())
}

/// Square a value while keeping its sign, so that `x` in `[-1, 1]` maps onto
/// `[-1, 1]` with more resolution near zero.
pub fn square_signed<T>(value: T) -> T
where
    T: Float
{
    if value < T::zero() {
        -(value * value)
    }
    else {
        value * value
    }
}

/// Bring a value into the range `[-range/2, range/2]`.
///
/// Values already inside the range (including both ends) are returned
/// unchanged, anything else ends up in `(-range/2, range/2]`.
pub fn normalise<T>(value: T, range: T) -> T
where
    T: Float
{
    let half = range / (T::one() + T::one());

    if value >= -half && value <= half {
        return value;
    }

    let r = rem_euclid(value, range);
    if r > half { r - range } else { r }
}

/// Smallest signed difference `a - b` between two angles in degrees, in the
/// range `[-180, 180]`.
pub fn angle_diff_deg<T>(a: T, b: T) -> T
where
    T: Float
{
    normalise(a - b, T::from(FULL_CIRCLE_DEG).unwrap())
}

/// Wrap an angle in radians into `[-pi, pi]`.
pub fn wrap_pi<T>(angle_rad: T) -> T
where
    T: Float
{
    normalise(angle_rad, T::from(std::f64::consts::TAU).unwrap())
}

/// Convert degrees to radians, normalising into `[-pi, pi]`.
pub fn deg_to_rad(deg: f64) -> f64 {
    normalise(deg, FULL_CIRCLE_DEG).to_radians()
}

/// Convert radians to degrees, normalising into `[-180, 180]`.
pub fn rad_to_deg(rad: f64) -> f64 {
    wrap_pi(rad).to_degrees()
}

/// Rotate the vector `(x, y)` anticlockwise by `angle_deg` degrees.
pub fn rotate_vector(x: f64, y: f64, angle_deg: f64) -> (f64, f64) {
    let (sin_a, cos_a) = deg_to_rad(angle_deg).sin_cos();
    (x * cos_a - y * sin_a, x * sin_a + y * cos_a)
}

/// `sin(x) / x`, taking the limit of 1 near zero.
pub fn sinc<T>(x: T) -> T
where
    T: Float
{
    if x.abs() < T::from(1e-9).unwrap() {
        T::one() - x * x / T::from(6.0).unwrap()
    }
    else {
        x.sin() / x
    }
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

#[cfg(test)]
mod test {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_angle_diff_deg() {
        assert_eq!(angle_diff_deg(0.0, 0.0), 0.0);
        assert_eq!(angle_diff_deg(5.0, 0.0), 5.0);
        assert_eq!(angle_diff_deg(0.0, 5.0), -5.0);
        assert_eq!(angle_diff_deg(-5.0, 0.0), -5.0);
        assert_eq!(angle_diff_deg(0.0, -5.0), 5.0);

        assert!(close(angle_diff_deg(361.0, 361.0), 0.0));
        assert!(close(angle_diff_deg(1.0, 361.0), 0.0));
        assert!(close(angle_diff_deg(-1.0, -361.0), 0.0));
        assert!(close(angle_diff_deg(361.0, -361.0), 2.0));

        assert!(close(angle_diff_deg(-175.0, 175.0), 10.0));
        assert!(close(angle_diff_deg(175.0, -175.0), -10.0));

        assert!(close(angle_diff_deg(270.0, 90.0), 180.0));
        assert!(close(angle_diff_deg(-90.0, 90.0), -180.0));
        assert!(close(angle_diff_deg(-270.0, -90.0), -180.0));
    }

    #[test]
    fn test_normalise_wraps_far_values() {
        assert!(close(normalise(540.0, 360.0), 180.0));
        assert!(close(normalise(-540.0, 360.0), 180.0));
        assert!(close(normalise(-190.0, 360.0), 170.0));
        assert!(close(normalise(725.0, 360.0), 5.0));
    }

    #[test]
    fn test_square_signed() {
        assert_eq!(square_signed(0.5), 0.25);
        assert_eq!(square_signed(-0.5), -0.25);
        assert_eq!(square_signed(0.0), 0.0);

        for i in -10..=10 {
            let x = i as f64 / 10.0;
            let s = square_signed(x);
            assert_eq!(s == 0.0, x == 0.0);
            assert!(s * x >= 0.0);
        }
    }

    #[test]
    fn test_limit_and_clamp() {
        assert_eq!(limit(3.0), 1.0);
        assert_eq!(limit(-3.0), -1.0);
        assert_eq!(limit(0.3), 0.3);
        assert!(limit(std::f64::NAN).is_nan());
        assert_eq!(clamp(5.0, 0.0, 2.0), 2.0);
    }

    #[test]
    fn test_rotate_vector() {
        let (x, y) = rotate_vector(1.0, 0.0, 90.0);
        assert!(close(x, 0.0) && close(y, 1.0));

        let (x, y) = rotate_vector(0.0, 8.0, -90.0);
        assert!(close(x, 8.0) && close(y, 0.0));
    }

    #[test]
    fn test_sinc() {
        assert_eq!(sinc(0.0), 1.0);
        assert!(close(sinc(std::f64::consts::PI / 2.0), 2.0 / std::f64::consts::PI));
    }

    #[test]
    fn test_lin_map() {
        assert!(close(lin_map((0.0, 12.0), (0.0, 1.0), 6.0), 0.5));
        assert!(close(lin_map((-1.0, 1.0), (1.0, -1.0), 0.5), -0.5));
    }
}
