//! PyO3 bindings exposing `armsim::Arm` as a gym-style environment.
//!
//! Notes
//! - Keep bindings thin: tuples in, tuples/lists out. Learning code stays in
//!   Python and talks to the arm through `step`/`reset`/`setenv` only.
//! - Angles cross this boundary in degrees, like the Rust API.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyTuple;

use armsim::geom::{Point2, Size2};
use armsim::policy::JacobianPolicy;
use armsim::rollout::{converge, ConvergeCfg};
use armsim::{Arm, ArmError, Goal};

fn value_error(err: ArmError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

#[pyclass(name = "Arm")]
struct PyArm {
    inner: Arm,
}

#[pymethods]
impl PyArm {
    #[new]
    #[pyo3(signature = (origin, env_size, link_width = 20.0, seed = 0))]
    fn new(origin: (f64, f64), env_size: (f64, f64), link_width: f64, seed: u64) -> Self {
        let inner = Arm::new(
            Point2::new(origin.0, origin.1),
            Size2::new(env_size.0, env_size.1),
        )
        .with_link_width(link_width)
        .with_seed(seed);
        Self { inner }
    }

    /// Append a link; returns its index.
    #[pyo3(signature = (length, color = (255, 255, 255)))]
    fn add_link(&mut self, length: f64, color: (u8, u8, u8)) -> usize {
        self.inner.add_link(length, [color.0, color.1, color.2])
    }

    /// `arm.set_angles(90, 45)`: one angle in degrees per link.
    #[pyo3(signature = (*angles))]
    fn set_angles(&mut self, angles: &PyTuple) -> PyResult<()> {
        let degrees: Vec<f64> = angles.extract()?;
        self.inner.set_angles(&degrees).map_err(value_error)
    }

    fn step(&mut self, action: Vec<f64>) -> (Vec<f64>, f64, bool) {
        let s = self.inner.step(&action);
        (s.state, s.reward, s.done)
    }

    fn reset(&mut self) -> Vec<f64> {
        self.inner.reset()
    }

    /// Install `(x, y, size)` as the goal without moving the links.
    fn setenv(&mut self, goal: (f64, f64, f64)) -> Vec<f64> {
        self.inner.set_env(Goal::new(goal.0, goal.1, goal.2))
    }

    fn state(&self) -> Vec<f64> {
        self.inner.state()
    }

    fn track_pointer(&mut self, x: f64, y: f64) {
        self.inner.track_pointer(Point2::new(x, y));
    }

    /// Converge on `(x, y)` with the built-in Jacobian controller.
    /// Returns `(angles_deg, steps, reached)`.
    #[pyo3(signature = (x, y, max_steps = 200))]
    fn query(&mut self, x: f64, y: f64, max_steps: usize) -> (Vec<f64>, usize, bool) {
        let goal = Goal::new(x, y, self.inner.goal().size);
        let mut policy = JacobianPolicy::new(self.inner.origin(), self.inner.env_size());
        let cfg = ConvergeCfg {
            max_steps,
            ..ConvergeCfg::default()
        };
        let out = converge(&mut self.inner, &mut policy, goal, &cfg);
        let reached = out.reached();
        (out.angles_deg, out.steps, reached)
    }

    fn link_angles(&self) -> Vec<f64> {
        self.inner.link_angles_deg()
    }

    fn head(&self) -> (f64, f64) {
        let p = self.inner.head_point();
        (p.x, p.y)
    }

    #[getter]
    fn goal(&self) -> (f64, f64, f64) {
        let g = self.inner.goal();
        (g.center.x, g.center.y, g.size)
    }

    #[getter]
    fn on_goal(&self) -> u32 {
        self.inner.on_goal()
    }

    #[getter]
    fn state_dim(&self) -> usize {
        self.inner.state_dim()
    }

    #[getter]
    fn action_dim(&self) -> usize {
        self.inner.action_dim()
    }

    #[getter]
    fn action_bound(&self) -> (f64, f64) {
        self.inner.action_bound()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "Arm(links={}, angles={:?})",
            self.inner.len(),
            self.inner.link_angles_deg()
        )
    }
}

#[pymodule]
fn armsim_native(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyArm>()?;
    m.add("__version__", armsim::VERSION)?;
    Ok(())
}
