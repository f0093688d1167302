//! Closed-loop driver: policy → `Arm::step` → policy, until the goal dwell
//! completes or a stop condition fires.
//!
//! One loop serves both uses:
//! - query (`converge`): pose a goal with `set_env`, iterate, report angles;
//! - training (`run_episode`, `train`): `reset`, iterate, and hand every
//!   transition to the policy.
//!
//! `reset` only guarantees the goal lies outside the root link's radius, so a
//! goal may be unreachable for the whole chain. Nothing reports "unreachable":
//! the step budget (and the optional timeout/cancel hook) is what bounds the
//! loop.

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::chain::{Arm, Goal};
use crate::policy::Policy;

/// Early stop when the reward stops moving.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plateau {
    /// Largest |Δreward| still counted as flat.
    pub tolerance: f64,
    /// Flat steps tolerated before stopping.
    pub patience: usize,
}

impl Default for Plateau {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            patience: 10,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvergeCfg {
    pub max_steps: usize,
    pub timeout: Option<Duration>,
    pub plateau: Option<Plateau>,
}

impl Default for ConvergeCfg {
    fn default() -> Self {
        Self {
            max_steps: 200,
            timeout: None,
            plateau: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Dwell completed (`done`).
    Reached,
    Budget,
    Plateau,
    Timeout,
    Cancelled,
}

/// Whether transitions are fed back to the policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Query,
    Train,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    /// Final local angles in degrees, root to tip (the control output).
    pub angles_deg: Vec<f64>,
    pub steps: usize,
    /// Reward of the last step. If no step ran, the reward of the starting
    /// pose, capture bonus included.
    pub reward: f64,
    pub total_reward: f64,
    pub stop: StopReason,
}

impl Outcome {
    #[inline]
    pub fn reached(&self) -> bool {
        self.stop == StopReason::Reached
    }
}

/// Per-episode training summary.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeStats {
    pub episode: usize,
    pub steps: usize,
    pub reward: f64,
    pub done: bool,
}

/// Drive the arm towards `goal` without moving it first.
pub fn converge<P: Policy + ?Sized>(
    arm: &mut Arm,
    policy: &mut P,
    goal: Goal,
    cfg: &ConvergeCfg,
) -> Outcome {
    converge_with(arm, policy, goal, cfg, |_| false)
}

/// As [`converge`], polling `cancel(steps_so_far)` before every step.
pub fn converge_with<P, F>(
    arm: &mut Arm,
    policy: &mut P,
    goal: Goal,
    cfg: &ConvergeCfg,
    cancel: F,
) -> Outcome
where
    P: Policy + ?Sized,
    F: FnMut(usize) -> bool,
{
    let state = arm.set_env(goal);
    drive(arm, policy, state, cfg, Mode::Query, cancel)
}

/// One episode from a fresh `reset`.
pub fn run_episode<P: Policy + ?Sized>(
    arm: &mut Arm,
    policy: &mut P,
    cfg: &ConvergeCfg,
    mode: Mode,
) -> Outcome {
    let state = arm.reset();
    drive(arm, policy, state, cfg, mode, |_| false)
}

/// Run `episodes` training episodes, then persist the policy to `save_to`.
pub fn train<P: Policy + ?Sized>(
    arm: &mut Arm,
    policy: &mut P,
    episodes: usize,
    cfg: &ConvergeCfg,
    save_to: Option<&Path>,
) -> io::Result<Vec<EpisodeStats>> {
    let mut stats = Vec::with_capacity(episodes);
    for episode in 0..episodes {
        let out = run_episode(arm, policy, cfg, Mode::Train);
        tracing::info!(
            episode,
            done = out.reached(),
            ep_reward = out.total_reward,
            steps = out.steps,
            "episode"
        );
        stats.push(EpisodeStats {
            episode,
            steps: out.steps,
            reward: out.total_reward,
            done: out.reached(),
        });
    }
    if let Some(path) = save_to {
        policy.save(path)?;
    }
    Ok(stats)
}

fn drive<P, F>(
    arm: &mut Arm,
    policy: &mut P,
    mut state: Vec<f64>,
    cfg: &ConvergeCfg,
    mode: Mode,
    mut cancel: F,
) -> Outcome
where
    P: Policy + ?Sized,
    F: FnMut(usize) -> bool,
{
    let started = Instant::now();
    let mut steps = 0;
    let bonus = if arm.on_goal() > 0 { 1.0 } else { 0.0 };
    let mut reward = arm.reward(&arm.goal()) + bonus;
    let mut total_reward = 0.0;
    let mut prev: Option<f64> = None;
    let mut flat = 0;

    let stop = loop {
        if steps >= cfg.max_steps {
            break StopReason::Budget;
        }
        if cancel(steps) {
            break StopReason::Cancelled;
        }
        if cfg.timeout.is_some_and(|limit| started.elapsed() >= limit) {
            break StopReason::Timeout;
        }

        let action = policy.choose_action(&state);
        let step = arm.step(&action);
        steps += 1;
        total_reward += step.reward;
        if mode == Mode::Train {
            policy.store_transition(&state, &action, step.reward, &step.state);
            if policy.ready_to_learn() {
                policy.learn();
            }
        }
        reward = step.reward;
        state = step.state;
        if step.done {
            break StopReason::Reached;
        }

        if let Some(p) = cfg.plateau {
            if prev.is_some_and(|r| (reward - r).abs() < p.tolerance) {
                flat += 1;
            } else {
                flat = 0;
            }
            if flat > p.patience {
                break StopReason::Plateau;
            }
        }
        prev = Some(reward);
    };

    tracing::debug!(steps, reward, ?stop, "rollout finished");
    Outcome {
        angles_deg: arm.link_angles_deg(),
        steps,
        reward,
        total_reward,
        stop,
    }
}
