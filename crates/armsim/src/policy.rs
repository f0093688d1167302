//! Policy seam between the environment and whatever decides actions.
//!
//! The learning algorithm itself lives outside this crate. A policy maps a
//! state vector (`Arm::state`, `4·n + 1` entries) to an action vector of
//! length `n` with components nominally in `[-1, 1]`; the arm clamps anyway.
//!
//! Built-ins
//! - `RandomPolicy`: seeded uniform exploration.
//! - `JacobianPolicy`: Jacobian-transpose controller read off the observation.
//! - `FnPolicy`: adapter for closures (scripted tests, external models).

use std::io;
use std::path::Path;

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::chain::ACTION_BOUND;
use crate::geom::{Point2, Size2};

pub trait Policy {
    fn choose_action(&mut self, state: &[f64]) -> Vec<f64>;

    /// Record one transition for later learning. No-op by default.
    fn store_transition(&mut self, _state: &[f64], _action: &[f64], _reward: f64, _next: &[f64]) {}

    /// Whether enough experience has been stored for `learn` to run.
    fn ready_to_learn(&self) -> bool {
        false
    }

    fn learn(&mut self) {}

    fn save(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    fn restore(&mut self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn choose_action(&mut self, state: &[f64]) -> Vec<f64> {
        (**self).choose_action(state)
    }
    fn store_transition(&mut self, state: &[f64], action: &[f64], reward: f64, next: &[f64]) {
        (**self).store_transition(state, action, reward, next)
    }
    fn ready_to_learn(&self) -> bool {
        (**self).ready_to_learn()
    }
    fn learn(&mut self) {
        (**self).learn()
    }
    fn save(&self, path: &Path) -> io::Result<()> {
        (**self).save(path)
    }
    fn restore(&mut self, path: &Path) -> io::Result<()> {
        (**self).restore(path)
    }
}

/// Uniform actions in `[-1, 1]`.
#[derive(Clone, Debug)]
pub struct RandomPolicy {
    action_dim: usize,
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(action_dim: usize, seed: u64) -> Self {
        Self {
            action_dim,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn choose_action(&mut self, _state: &[f64]) -> Vec<f64> {
        let (lo, hi) = ACTION_BOUND;
        (0..self.action_dim)
            .map(|_| self.rng.gen_range(lo..=hi))
            .collect()
    }
}

/// Jacobian-transpose reaching controller.
///
/// Joint positions are recovered from the normalised endpoints in the state
/// (the first joint sits at `base`), the head error from the last goal delta.
/// For a planar revolute chain, turning joint `i` moves the head along
/// `perp(head − p_i)`, so `a_i ∝ e · perp(head − p_i)`, scaled by
/// `gain / max_extent²` and clamped to the action bound.
#[derive(Clone, Debug)]
pub struct JacobianPolicy {
    base: Point2,
    env_size: Size2,
    gain: f64,
}

impl JacobianPolicy {
    pub const DEFAULT_GAIN: f64 = 4.0;

    pub fn new(base: Point2, env_size: Size2) -> Self {
        Self {
            base,
            env_size,
            gain: Self::DEFAULT_GAIN,
        }
    }

    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }
}

impl Policy for JacobianPolicy {
    fn choose_action(&mut self, state: &[f64]) -> Vec<f64> {
        // state = [endpoints (2n), goal deltas (2n), flag]
        let n = state.len().saturating_sub(1) / 4;
        if n == 0 {
            return Vec::new();
        }
        let (w, h) = (self.env_size.width, self.env_size.height);
        let endpoint = |i: usize| Point2::new(state[2 * i] * w, state[2 * i + 1] * h);
        let head = endpoint(n - 1);
        let err = Vector2::new(state[2 * n + 2 * (n - 1)] * w, state[2 * n + 2 * (n - 1) + 1] * h);
        let scale = self.gain / (self.env_size.max_extent() * self.env_size.max_extent());
        let (lo, hi) = ACTION_BOUND;
        (0..n)
            .map(|i| {
                let joint = if i == 0 { self.base } else { endpoint(i - 1) };
                let r = head - joint;
                let dir = Vector2::new(-r.y, r.x);
                (err.dot(&dir) * scale).clamp(lo, hi)
            })
            .collect()
    }
}

/// Closure-backed policy.
pub struct FnPolicy<F>(pub F);

impl<F: FnMut(&[f64]) -> Vec<f64>> Policy for FnPolicy<F> {
    fn choose_action(&mut self, state: &[f64]) -> Vec<f64> {
        (self.0)(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{Arm, Goal};

    #[test]
    fn random_policy_respects_bounds_and_seed() {
        let mut a = RandomPolicy::new(3, 9);
        let mut b = RandomPolicy::new(3, 9);
        for _ in 0..100 {
            let x = a.choose_action(&[]);
            assert_eq!(x.len(), 3);
            assert!(x.iter().all(|v| (-1.0..=1.0).contains(v)));
            assert_eq!(x, b.choose_action(&[]));
        }
    }

    #[test]
    fn jacobian_action_points_towards_goal() {
        // One link along +x, goal straight up: the joint should turn positive.
        let mut arm = Arm::new(Point2::origin(), Size2::new(200.0, 200.0));
        arm.add_link(100.0, [0, 0, 0]);
        let state = arm.set_env(Goal::new(0.0, 100.0, 30.0));
        let mut p = JacobianPolicy::new(arm.origin(), arm.env_size());
        let a = p.choose_action(&state);
        assert_eq!(a.len(), 1);
        assert!(a[0] > 0.9);
        // Goal below the link: turn the other way.
        let state = arm.set_env(Goal::new(100.0, -50.0, 30.0));
        assert!(p.choose_action(&state)[0] < 0.0);
    }

    #[test]
    fn jacobian_reduces_distance_on_two_links() {
        let mut arm = Arm::new(Point2::new(0.0, 100.0), Size2::new(200.0, 200.0));
        arm.add_link(100.0, [0, 0, 0]);
        arm.add_link(100.0, [0, 0, 0]);
        arm.set_angles(&[45.0, 90.0]).unwrap();
        let goal = Goal::new(150.0, 100.0, 30.0);
        let mut state = arm.set_env(goal);
        let start = -arm.reward(&goal);
        let mut p = JacobianPolicy::new(arm.origin(), arm.env_size());
        for _ in 0..10 {
            let a = p.choose_action(&state);
            state = arm.step(&a).state;
        }
        assert!(-arm.reward(&goal) < start);
    }

    #[test]
    fn closures_and_boxes_are_policies() {
        let mut calls = 0;
        {
            let mut p = FnPolicy(|s: &[f64]| {
                calls += 1;
                vec![s.len() as f64]
            });
            assert_eq!(p.choose_action(&[0.0, 0.0]), vec![2.0]);
        }
        assert_eq!(calls, 1);
        let mut boxed: Box<dyn Policy> = Box::new(RandomPolicy::new(2, 0));
        assert_eq!(boxed.choose_action(&[]).len(), 2);
        assert!(!boxed.ready_to_learn());
        assert!(boxed.save(Path::new("unused")).is_ok());
    }
}
