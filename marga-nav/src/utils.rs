//! Shared utility functions
//!
//! Headings follow the simulator convention: 0° faces +z, 90° faces +x,
//! and positive angles turn clockwise (to the right).

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle % 360.0;
    if a < 0.0 { a + 360.0 } else { a }
}

/// Normalize an angle in degrees to (-180, 180]
#[inline]
pub fn signed_degrees(angle: f64) -> f64 {
    let a = normalize_degrees(angle);
    if a > 180.0 { a - 360.0 } else { a }
}

/// Normalize an integer heading to [0, 360)
#[inline]
pub fn normalize_heading(theta: i32) -> i32 {
    theta.rem_euclid(360)
}

/// Bearing of a planar offset in degrees (`atan2(dx, dz)`).
#[inline]
pub fn bearing_degrees(dx: f64, dz: f64) -> f64 {
    dx.atan2(dz).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_degrees() {
        assert_relative_eq!(normalize_degrees(-90.0), 270.0);
        assert_relative_eq!(normalize_degrees(720.0), 0.0);
        assert_relative_eq!(signed_degrees(270.0), -90.0);
        assert_relative_eq!(signed_degrees(180.0), 180.0);
        assert_eq!(normalize_heading(-45), 315);
    }

    #[test]
    fn test_bearing() {
        assert_relative_eq!(bearing_degrees(0.0, 1.0), 0.0);
        assert_relative_eq!(bearing_degrees(1.0, 0.0), 90.0);
        assert_relative_eq!(bearing_degrees(0.0, -1.0), 180.0);
        assert_relative_eq!(bearing_degrees(-1.0, 0.0), -90.0);
    }
}
