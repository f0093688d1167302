//! Planar primitives shared by the chain, the goal and the renderer seam.
//!
//! - `Point2`: world-frame position (nalgebra point, immutable by convention).
//! - `Size2`: extents of the simulation plane, used for observation scaling.
//! - `AngleRange`: closed joint constraint `[min, max]` in radians.
//!
//! Angles cross the public boundary in degrees (`set_angles`, reported link
//! angles) and are stored in radians everywhere else.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// World-frame point.
pub type Point2 = nalgebra::Point2<f64>;

/// RGB triple used only for drawing.
pub type Rgb = [u8; 3];

/// Width/height of the simulation plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size2 {
    pub width: f64,
    pub height: f64,
}

impl Size2 {
    #[inline]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
    /// Larger of the two extents; the reward is normalised by it.
    #[inline]
    pub fn max_extent(&self) -> f64 {
        self.width.max(self.height)
    }
    #[inline]
    pub fn diagonal(&self) -> f64 {
        self.width.hypot(self.height)
    }
}

/// Closed joint range in radians. Bounds are kept ordered (`min <= max`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngleRange {
    pub min: f64,
    pub max: f64,
}

impl Default for AngleRange {
    fn default() -> Self {
        Self { min: 0.0, max: PI }
    }
}

impl AngleRange {
    /// Builds a range from two bounds in either order.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// Clamp into `[min, max]`. NaN resolves to `min`.
    #[inline]
    pub fn clamp(&self, angle: f64) -> f64 {
        if angle.is_nan() {
            return self.min;
        }
        angle.max(self.min).min(self.max)
    }

    #[inline]
    pub fn contains(&self, angle: f64) -> bool {
        (self.min..=self.max).contains(&angle)
    }
}

#[inline]
pub fn deg2rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

#[inline]
pub fn rad2deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Wrap into `[0, 2π)`.
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    let w = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if w >= TAU {
        0.0
    } else {
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_radian_roundtrip() {
        for deg in [-720.0, -90.0, 0.0, 45.0, 90.0, 180.0, 359.5, 1e4] {
            assert!((rad2deg(deg2rad(deg)) - deg).abs() < 1e-9);
        }
        assert!((deg2rad(180.0) - PI).abs() < 1e-15);
    }

    #[test]
    fn wrap_stays_in_half_open_range() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert_eq!(wrap_angle(TAU), 0.0);
        assert!((wrap_angle(-PI / 2.0) - 1.5 * PI).abs() < 1e-12);
        assert!((wrap_angle(5.0 * PI) - PI).abs() < 1e-12);
        let tiny = wrap_angle(-1e-18);
        assert!((0.0..TAU).contains(&tiny));
    }

    #[test]
    fn range_orders_bounds_and_clamps() {
        let r = AngleRange::new(2.0, -1.0);
        assert_eq!((r.min, r.max), (-1.0, 2.0));
        assert_eq!(r.clamp(-100.0), -1.0);
        assert_eq!(r.clamp(1e6), 2.0);
        assert_eq!(r.clamp(0.5), 0.5);
        assert_eq!(r.clamp(f64::NAN), -1.0);
    }

    #[test]
    fn size_extents() {
        let s = Size2::new(300.0, 400.0);
        assert_eq!(s.max_extent(), 400.0);
        assert!((s.diagonal() - 500.0).abs() < 1e-12);
    }
}
