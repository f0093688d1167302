//! Single-goal query on the default two-link arm.
//!
//! Purpose
//! - Show the interactive flow end to end: point at a target, converge with
//!   the Jacobian policy, print the angles that would go to the servos.
//! - Give a quick timing data point for one query under the default budget.
//!
//! Usage: `cargo run -p armsim --example pointer_query -- 120 150`

use std::time::Instant;

use armsim::device::{degrees_to_command, format_command};
use armsim::prelude::*;

fn main() {
    let mut args = std::env::args().skip(1).map(|a| a.parse::<f64>());
    let x = args.next().and_then(Result::ok).unwrap_or(120.0);
    let y = args.next().and_then(Result::ok).unwrap_or(150.0);

    let cfg = ArmCfg::default();
    let mut arm = Arm::from_cfg(&cfg);
    arm.set_angles(&[90.0, 90.0]).expect("two links");
    let mut policy = JacobianPolicy::new(arm.origin(), arm.env_size());

    let start = Instant::now();
    let out = converge(
        &mut arm,
        &mut policy,
        Goal::new(x, y, cfg.goal_size),
        &ConvergeCfg::default(),
    );
    let elapsed = start.elapsed().as_secs_f64() * 1e3;

    println!("goal=({x:.1},{y:.1}) stop={:?} steps={}", out.stop, out.steps);
    println!("angles_deg={:?}", out.angles_deg);
    println!("command={}", format_command(&degrees_to_command(&out.angles_deg)));
    println!("query_time_ms={elapsed:.3}");
}
