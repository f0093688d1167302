//! Drawing seam.
//!
//! The core never draws. `Arm::draw` refreshes derived state and feeds each
//! link segment and the goal to a `Renderer`. `Scene` is the in-crate
//! renderer: it records what would be drawn so callers can serialise it.

use serde::{Deserialize, Serialize};

use crate::chain::Goal;
use crate::geom::{Point2, Rgb};

pub trait Renderer {
    fn draw_link(&mut self, origin: Point2, endpoint: Point2, width: f64, color: Rgb);
    fn draw_goal(&mut self, goal: &Goal, on_goal: bool);
}

/// One drawn link.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub origin: Point2,
    pub endpoint: Point2,
    pub width: f64,
    pub color: Rgb,
}

/// Snapshot of everything a frame contains.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub links: Vec<Segment>,
    pub goal: Option<Goal>,
    pub on_goal: bool,
}

impl Renderer for Scene {
    fn draw_link(&mut self, origin: Point2, endpoint: Point2, width: f64, color: Rgb) {
        self.links.push(Segment {
            origin,
            endpoint,
            width,
            color,
        });
    }

    fn draw_goal(&mut self, goal: &Goal, on_goal: bool) {
        self.goal = Some(*goal);
        self.on_goal = on_goal;
    }
}
