//! The arm: an ordered chain of links sharing one base origin, plus the
//! goal/dwell state that turns it into a continuous-control environment.
//!
//! Links live in a `Vec` owned by the arm; a child refers to its parent by
//! index. Every mutator finishes with a front-to-back pass over the affected
//! suffix, so each link's origin and global angle always reflect the current
//! parent state.

use std::f64::consts::PI;

use nalgebra::distance;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::cfg::{ArmCfg, LinkSpec, DEFAULT_DWELL_STEPS, DEFAULT_STEP_SIZE};
use super::goal::{Goal, DEFAULT_GOAL_SIZE};
use super::link::{Link, Mount};
use crate::error::ArmError;
use crate::geom::{deg2rad, rad2deg, AngleRange, Point2, Rgb, Size2};
use crate::render::{Renderer, Scene};

/// Per-component action bounds.
pub const ACTION_BOUND: (f64, f64) = (-1.0, 1.0);

/// Goal sampling in `reset` gives up after this many rejected draws.
const MAX_GOAL_ATTEMPTS: usize = 10_000;

/// Result of one `Arm::step`.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    /// Observation followed by the on-goal flag (`state_dim` entries).
    pub state: Vec<f64>,
    pub reward: f64,
    pub done: bool,
}

#[derive(Clone, Debug)]
pub struct Arm {
    origin: Point2,
    env_size: Size2,
    link_width: f64,
    links: Vec<Link>,
    goal: Goal,
    goal_size: f64,
    on_goal: u32,
    step_size: f64,
    dwell_steps: u32,
    rng: StdRng,
}

impl Arm {
    /// Empty arm (no links) with default step size, dwell threshold and goal.
    ///
    /// `env_size` extents must be positive: observations and the reward are
    /// divided by them.
    pub fn new(origin: Point2, env_size: Size2) -> Self {
        Self {
            origin,
            env_size,
            link_width: 1.0,
            links: Vec::new(),
            goal: Goal::default(),
            goal_size: DEFAULT_GOAL_SIZE,
            on_goal: 0,
            step_size: DEFAULT_STEP_SIZE,
            dwell_steps: DEFAULT_DWELL_STEPS,
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// Build the arm described by `cfg`, links included.
    pub fn from_cfg(cfg: &ArmCfg) -> Self {
        let mut arm = Self::new(cfg.origin, cfg.env_size)
            .with_link_width(cfg.link_width)
            .with_goal_size(cfg.goal_size)
            .with_step_size(cfg.step_size)
            .with_dwell_steps(cfg.dwell_steps)
            .with_seed(cfg.seed)
            .with_goal(Goal {
                size: cfg.goal_size,
                ..Goal::default()
            });
        for spec in &cfg.links {
            arm.add_link_spec(spec);
        }
        arm
    }

    /// Width given to links appended afterwards.
    pub fn with_link_width(mut self, width: f64) -> Self {
        self.link_width = width;
        self
    }

    /// Initial goal. Leaves the dwell counter at zero; use [`Arm::set_env`]
    /// to re-evaluate it against the current head.
    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goal = goal;
        self
    }

    /// Capture size of goals sampled by [`Arm::reset`].
    pub fn with_goal_size(mut self, size: f64) -> Self {
        self.goal_size = size;
        self
    }

    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_dwell_steps(mut self, dwell_steps: u32) -> Self {
        self.dwell_steps = dwell_steps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.reseed(seed);
        self
    }

    /// Restart the sampling stream used by `reset`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    // ---- accessors ------------------------------------------------------

    #[inline]
    pub fn origin(&self) -> Point2 {
        self.origin
    }
    #[inline]
    pub fn env_size(&self) -> Size2 {
        self.env_size
    }
    #[inline]
    pub fn links(&self) -> &[Link] {
        &self.links
    }
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Link> {
        self.links.get(index)
    }
    /// Last link (the end effector).
    #[inline]
    pub fn head(&self) -> Option<&Link> {
        self.links.last()
    }
    /// First link (attached to the base).
    #[inline]
    pub fn tail(&self) -> Option<&Link> {
        self.links.first()
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
    #[inline]
    pub fn action_dim(&self) -> usize {
        self.links.len()
    }
    #[inline]
    pub fn state_dim(&self) -> usize {
        4 * self.action_dim() + 1
    }
    #[inline]
    pub fn action_bound(&self) -> (f64, f64) {
        ACTION_BOUND
    }
    #[inline]
    pub fn goal(&self) -> Goal {
        self.goal
    }
    /// Consecutive steps the head has spent inside the capture region.
    #[inline]
    pub fn on_goal(&self) -> u32 {
        self.on_goal
    }
    #[inline]
    pub fn step_size(&self) -> f64 {
        self.step_size
    }
    #[inline]
    pub fn dwell_steps(&self) -> u32 {
        self.dwell_steps
    }

    /// Head endpoint, or the base origin for an empty arm.
    pub fn head_point(&self) -> Point2 {
        self.head().map_or(self.origin, Link::endpoint)
    }

    /// Local angles in degrees, root to tip.
    pub fn link_angles_deg(&self) -> Vec<f64> {
        self.links.iter().map(|l| rad2deg(l.angle())).collect()
    }

    // ---- assembly -------------------------------------------------------

    /// Append a link with default constraints `[0, π]`; returns its index.
    pub fn add_link(&mut self, length: f64, color: Rgb) -> usize {
        self.push_link(length, color, AngleRange::default())
    }

    pub fn add_link_spec(&mut self, spec: &LinkSpec) -> usize {
        self.push_link(spec.length, spec.color, spec.constraints)
    }

    fn push_link(&mut self, length: f64, color: Rgb, constraints: AngleRange) -> usize {
        let link = match self.links.last() {
            None => Link::new(length, self.origin),
            Some(parent) => Link::attached(length, self.links.len() - 1, parent),
        };
        self.links.push(
            link.with_style(self.link_width, color)
                .with_constraints(constraints),
        );
        self.links.len() - 1
    }

    // ---- angle assignment -----------------------------------------------

    /// Assign every local angle, in degrees, root to tip.
    ///
    /// Fails without touching any link if `degrees.len()` differs from the
    /// number of links. Values outside a link's range are clamped.
    pub fn set_angles(&mut self, degrees: &[f64]) -> Result<(), ArmError> {
        if degrees.len() != self.links.len() {
            return Err(ArmError::ArgumentCount {
                expected: self.links.len(),
                got: degrees.len(),
            });
        }
        for (i, &deg) in degrees.iter().enumerate() {
            self.links[i].set_local_angle(deg2rad(deg));
            self.sync_from(i + 1);
        }
        Ok(())
    }

    /// Point the head link at `point` in the world frame (pointer tracking).
    pub fn track_pointer(&mut self, point: Point2) {
        if let Some(head) = self.links.last_mut() {
            let angle = head.angle_to(&point);
            head.set_global_angle(angle);
        }
    }

    /// Recompute every origin and global angle from the local angles.
    pub fn refresh(&mut self) {
        self.sync_from(0);
    }

    fn sync_from(&mut self, start: usize) {
        for i in start..self.links.len() {
            if i == 0 {
                let origin = self.origin;
                self.links[0].remount(origin, None);
                continue;
            }
            let parent = &self.links[i - 1];
            let (origin, angle) = (parent.endpoint(), parent.global_angle());
            self.links[i].remount(origin, Some(Mount { index: i - 1, angle }));
        }
    }

    // ---- environment ----------------------------------------------------

    /// Normalised endpoints, then normalised goal deltas, link order
    /// (`4 · len()` entries).
    pub fn observation(&self, goal: &Goal) -> Vec<f64> {
        let (w, h) = (self.env_size.width, self.env_size.height);
        let mut obs = Vec::with_capacity(self.state_dim());
        for link in &self.links {
            let e = link.endpoint();
            obs.push(e.x / w);
            obs.push(e.y / h);
        }
        for link in &self.links {
            let e = link.endpoint();
            obs.push((goal.center.x - e.x) / w);
            obs.push((goal.center.y - e.y) / h);
        }
        obs
    }

    /// Negative head-to-goal distance over the larger env extent.
    pub fn reward(&self, goal: &Goal) -> f64 {
        -distance(&self.head_point(), &goal.center) / self.env_size.max_extent()
    }

    /// Observation against the current goal plus the on-goal flag.
    pub fn state(&self) -> Vec<f64> {
        let mut s = self.observation(&self.goal);
        s.push(if self.on_goal > 0 { 1.0 } else { 0.0 });
        s
    }

    /// Advance one control step.
    ///
    /// Each action component is clamped to [`ACTION_BOUND`] (non-finite
    /// components count as 0) and scaled by the step size into a local-angle
    /// increment. Inside the capture region the reward gains +1 and the dwell
    /// counter grows; `done` once it exceeds `dwell_steps`. Leaving the region
    /// resets the counter.
    pub fn step(&mut self, action: &[f64]) -> Step {
        if action.len() != self.links.len() {
            tracing::warn!(
                expected = self.links.len(),
                got = action.len(),
                "action length differs from action_dim"
            );
        }
        let (lo, hi) = ACTION_BOUND;
        for (link, &a) in self.links.iter_mut().zip(action) {
            let a = if a.is_finite() { a.clamp(lo, hi) } else { 0.0 };
            let next = link.angle() + a * self.step_size;
            link.set_local_angle(next);
        }
        self.refresh();

        let mut reward = self.reward(&self.goal);
        let mut done = false;
        if self.goal.captures(&self.head_point()) {
            reward += 1.0;
            self.on_goal += 1;
            done = self.on_goal > self.dwell_steps;
        } else {
            self.on_goal = 0;
        }
        Step {
            state: self.state(),
            reward,
            done,
        }
    }

    /// Start a new episode.
    ///
    /// Samples a goal uniformly over the plane until it lies farther from the
    /// base than the first link's length (a necessary, not sufficient,
    /// reachability condition). The on-goal flag is evaluated against the
    /// pre-reset pose, then every local angle is redrawn in `[0, π)`.
    pub fn reset(&mut self) -> Vec<f64> {
        let min_reach = self.tail().map_or(0.0, Link::length);
        let mut goal = self.sample_goal();
        let mut attempts = 1;
        while distance(&goal.center, &self.origin) <= min_reach {
            if attempts >= MAX_GOAL_ATTEMPTS {
                tracing::warn!(attempts, min_reach, "goal sampling exhausted; keeping last draw");
                break;
            }
            goal = self.sample_goal();
            attempts += 1;
        }
        tracing::debug!(x = goal.center.x, y = goal.center.y, attempts, "reset goal");
        self.goal = goal;
        self.on_goal = u32::from(self.goal.captures(&self.head_point()));

        for link in &mut self.links {
            link.set_local_angle(PI * self.rng.gen::<f64>());
        }
        self.refresh();
        self.state()
    }

    /// Pose a query: install `goal`, re-evaluate the on-goal flag against the
    /// current head, leave every link where it is.
    pub fn set_env(&mut self, goal: Goal) -> Vec<f64> {
        self.goal = goal;
        self.on_goal = u32::from(self.goal.captures(&self.head_point()));
        self.state()
    }

    fn sample_goal(&mut self) -> Goal {
        let x = self.rng.gen::<f64>() * self.env_size.width;
        let y = self.rng.gen::<f64>() * self.env_size.height;
        Goal::new(x, y, self.goal_size)
    }

    // ---- drawing --------------------------------------------------------

    pub fn draw<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        self.refresh();
        for link in &self.links {
            renderer.draw_link(link.origin(), link.endpoint(), link.width(), link.color());
        }
        renderer.draw_goal(&self.goal, self.on_goal > 0);
    }

    pub fn scene(&mut self) -> Scene {
        let mut scene = Scene::default();
        self.draw(&mut scene);
        scene
    }
}
