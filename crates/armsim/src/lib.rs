//! Planar multi-link arm: forward kinematics plus a continuous-control
//! environment contract (state, action, reward, step, reset).
//!
//! Layout
//! - `geom`: points, sizes, angle ranges and degree/radian helpers.
//! - `chain`: `Link`, `Arm`, `Goal` and the step/reset/dwell state machine.
//! - `policy`: the action-source seam and built-in policies.
//! - `rollout`: closed-loop convergence and training episodes.
//! - `device`, `render`: actuation and drawing seams.
//!
//! Angles cross the public API in degrees (`set_angles`, reported angles)
//! and are stored in radians everywhere else.

pub mod chain;
pub mod device;
pub mod error;
pub mod geom;
pub mod policy;
pub mod render;
pub mod rollout;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use chain::{Arm, ArmCfg, Goal, Link, Step};
pub use error::{ArmError, DeviceError};

/// Common exports for callers driving the environment.
pub mod prelude {
    pub use crate::chain::{Arm, ArmCfg, Goal, Link, LinkSpec, Step, ACTION_BOUND};
    pub use crate::device::{ArmController, DeviceChannel, StreamChannel};
    pub use crate::error::{ArmError, DeviceError};
    pub use crate::geom::{deg2rad, rad2deg, AngleRange, Point2, Size2};
    pub use crate::policy::{FnPolicy, JacobianPolicy, Policy, RandomPolicy};
    pub use crate::rollout::{converge, converge_with, ConvergeCfg, Mode, Outcome, StopReason};
}
