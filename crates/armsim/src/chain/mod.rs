//! Planar kinematic chain and its reinforcement-learning contract.
//!
//! Purpose
//! - `Link`: local/global angle transform with clamped joint constraints.
//! - `Arm`: ordered links on one base, observation/reward/step/reset.
//! - `Goal`: target point with a square capture region; the arm owns the
//!   dwell counter that turns sustained capture into termination.
//!
//! State machine
//! - constructed (no links) → assembled (`add_link`) → ready (goal set via
//!   `with_goal`, `reset` or `set_env`) → stepping. No terminal state: the
//!   same arm is reused across episodes.

mod arm;
mod cfg;
mod goal;
mod link;

pub use arm::{Arm, Step, ACTION_BOUND};
pub use cfg::{ArmCfg, LinkSpec, DEFAULT_DWELL_STEPS, DEFAULT_STEP_SIZE};
pub use goal::{Goal, DEFAULT_GOAL_SIZE};
pub use link::Link;
