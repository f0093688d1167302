//! Goal point with a square capture region.

use serde::{Deserialize, Serialize};

use crate::geom::Point2;

/// Default capture size (edge length of the square capture region).
pub const DEFAULT_GOAL_SIZE: f64 = 30.0;

/// Target position and capture size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub center: Point2,
    pub size: f64,
}

impl Default for Goal {
    fn default() -> Self {
        Self::new(500.0, 500.0, DEFAULT_GOAL_SIZE)
    }
}

impl Goal {
    #[inline]
    pub fn new(x: f64, y: f64, size: f64) -> Self {
        Self {
            center: Point2::new(x, y),
            size,
        }
    }

    /// Strictly inside the open square of edge `size` around the centre.
    #[inline]
    pub fn captures(&self, p: &Point2) -> bool {
        let half = self.size / 2.0;
        (p.x - self.center.x).abs() < half && (p.y - self.center.y).abs() < half
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_region_is_open_square() {
        let g = Goal::new(10.0, 10.0, 4.0);
        assert!(g.captures(&Point2::new(10.0, 10.0)));
        assert!(g.captures(&Point2::new(11.9, 8.1)));
        // Boundary is outside.
        assert!(!g.captures(&Point2::new(12.0, 10.0)));
        // Inside on x only.
        assert!(!g.captures(&Point2::new(10.0, 13.0)));
        // Square, not disc: the corner region counts.
        assert!(g.captures(&Point2::new(11.8, 11.8)));
    }
}
