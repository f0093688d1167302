//! Arm construction parameters.
//!
//! Defaults reproduce the reference two-link setup: a 200×200 plane, base at
//! `(0, 100)`, two 100-unit links (red, then green).

use serde::{Deserialize, Serialize};

use super::goal::DEFAULT_GOAL_SIZE;
use crate::geom::{AngleRange, Point2, Rgb, Size2};

/// Rotation increment per unit action (radians).
pub const DEFAULT_STEP_SIZE: f64 = 0.05;
/// Consecutive on-goal steps that must be exceeded before `done`.
pub const DEFAULT_DWELL_STEPS: u32 = 50;

/// One link in a configured arm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub length: f64,
    #[serde(default = "default_color")]
    pub color: Rgb,
    #[serde(default)]
    pub constraints: AngleRange,
}

fn default_color() -> Rgb {
    [255, 255, 255]
}

impl LinkSpec {
    pub fn new(length: f64, color: Rgb) -> Self {
        Self {
            length,
            color,
            constraints: AngleRange::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmCfg {
    pub origin: Point2,
    pub env_size: Size2,
    pub link_width: f64,
    /// Capture size used for goals sampled by `reset`.
    pub goal_size: f64,
    pub step_size: f64,
    pub dwell_steps: u32,
    pub seed: u64,
    pub links: Vec<LinkSpec>,
}

impl Default for ArmCfg {
    fn default() -> Self {
        Self {
            origin: Point2::new(0.0, 100.0),
            env_size: Size2::new(200.0, 200.0),
            link_width: 20.0,
            goal_size: DEFAULT_GOAL_SIZE,
            step_size: DEFAULT_STEP_SIZE,
            dwell_steps: DEFAULT_DWELL_STEPS,
            seed: 0,
            links: vec![
                LinkSpec::new(100.0, [255, 0, 0]),
                LinkSpec::new(100.0, [0, 255, 0]),
            ],
        }
    }
}
