//! One rigid segment of the arm.
//!
//! A link stores its local joint angle authoritatively. Its world-frame
//! angle and origin are derived from the mount: the parent's global angle and
//! endpoint as of the last synchronisation pass run by the owning `Arm`.
//!
//! Frame convention: for a child link the offset is
//! `global = local − π/2 + parent.global (mod 2π)`, so a local angle of `π/2`
//! points straight along the parent. A root link has `global == local`.

use std::f64::consts::FRAC_PI_2;

use nalgebra::distance;

use crate::geom::{wrap_angle, AngleRange, Point2, Rgb};

/// Parent relation: index of the preceding link in the arm plus its global
/// angle at the last sync.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Mount {
    pub(crate) index: usize,
    pub(crate) angle: f64,
}

#[derive(Clone, Debug)]
pub struct Link {
    length: f64,
    width: f64,
    color: Rgb,
    angle: f64,
    global_angle: f64,
    origin: Point2,
    mount: Option<Mount>,
    constraints: AngleRange,
}

impl Link {
    /// Root link anchored at `origin`, local angle 0, constraints `[0, π]`.
    pub fn new(length: f64, origin: Point2) -> Self {
        let constraints = AngleRange::default();
        let angle = constraints.clamp(0.0);
        Self {
            length,
            width: 1.0,
            color: [255, 255, 255],
            angle,
            global_angle: angle,
            origin,
            mount: None,
            constraints,
        }
    }

    /// Child of `parent` (stored at `index` in the owning arm).
    pub(crate) fn attached(length: f64, index: usize, parent: &Link) -> Self {
        let mut link = Self::new(length, parent.endpoint());
        link.remount(
            parent.endpoint(),
            Some(Mount {
                index,
                angle: parent.global_angle,
            }),
        );
        link
    }

    pub fn with_style(mut self, width: f64, color: Rgb) -> Self {
        self.width = width;
        self.color = color;
        self
    }

    /// Replace the joint range; the current angle is re-clamped into it.
    pub fn with_constraints(mut self, constraints: AngleRange) -> Self {
        self.constraints = constraints;
        let angle = self.angle;
        self.set_local_angle(angle);
        self
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }
    #[inline]
    pub fn color(&self) -> Rgb {
        self.color
    }
    #[inline]
    pub fn constraints(&self) -> AngleRange {
        self.constraints
    }
    /// Local joint angle in radians, always inside `constraints()`.
    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }
    #[inline]
    pub fn global_angle(&self) -> f64 {
        self.global_angle
    }
    #[inline]
    pub fn origin(&self) -> Point2 {
        self.origin
    }
    /// Index of the parent link in the owning arm, `None` for the root.
    #[inline]
    pub fn parent(&self) -> Option<usize> {
        self.mount.map(|m| m.index)
    }

    /// Far end of the link at its current global angle.
    #[inline]
    pub fn endpoint(&self) -> Point2 {
        self.point_at(self.global_angle)
    }

    /// Set the local angle, clamped to the constraint range; out-of-range
    /// input is not an error. The global angle follows from the current mount.
    pub fn set_local_angle(&mut self, angle: f64) {
        self.angle = self.constraints.clamp(angle);
        self.global_angle = self.offset_angle(self.angle);
    }

    /// World-frame assignment: strip the parent offset, then clamp as
    /// `set_local_angle` does.
    pub fn set_global_angle(&mut self, angle: f64) {
        let local = self.remove_offset_angle(angle);
        self.set_local_angle(local);
    }

    /// Local → global. Identity for a root link.
    pub fn offset_angle(&self, local: f64) -> f64 {
        match self.mount {
            Some(m) => wrap_angle(local - FRAC_PI_2 + m.angle),
            None => local,
        }
    }

    /// Global → local, inverse of [`Link::offset_angle`] modulo 2π.
    pub fn remove_offset_angle(&self, global: f64) -> f64 {
        match self.mount {
            Some(m) => wrap_angle(global - m.angle + FRAC_PI_2),
            None => global,
        }
    }

    /// `origin + length·(cos angle, sin angle)`.
    #[inline]
    pub fn point_at(&self, angle: f64) -> Point2 {
        let (s, c) = angle.sin_cos();
        Point2::new(self.origin.x + self.length * c, self.origin.y + self.length * s)
    }

    /// Euclidean distance from the endpoint to `point`.
    #[inline]
    pub fn distance_to(&self, point: &Point2) -> f64 {
        distance(&self.endpoint(), point)
    }

    /// World-frame direction from the link origin towards `point`.
    #[inline]
    pub fn angle_to(&self, point: &Point2) -> f64 {
        (point.y - self.origin.y).atan2(point.x - self.origin.x)
    }

    /// Move the link onto a new mount and re-derive the global angle from the
    /// unchanged local angle.
    pub(crate) fn remount(&mut self, origin: Point2, mount: Option<Mount>) {
        self.origin = origin;
        self.mount = mount;
        self.global_angle = self.offset_angle(self.angle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn root_link_endpoint_follows_local_angle() {
        let mut l = Link::new(10.0, Point2::new(1.0, 2.0));
        l.set_local_angle(PI / 2.0);
        assert_eq!(l.global_angle(), PI / 2.0);
        let e = l.endpoint();
        assert!((e.x - 1.0).abs() < 1e-12);
        assert!((e.y - 12.0).abs() < 1e-12);
        assert!((l.distance_to(&Point2::new(1.0, 2.0)) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn child_offset_uses_parent_frame() {
        let mut root = Link::new(100.0, Point2::origin());
        root.set_local_angle(PI / 2.0);
        let child = Link::attached(50.0, 0, &root);
        // local 0 on a parent pointing up: −π/2 + π/2 = 0 (pointing +x).
        assert_eq!(child.parent(), Some(0));
        assert!(child.global_angle().abs() < 1e-12);
        assert!((child.origin() - Point2::new(0.0, 100.0)).norm() < 1e-9);
        let mut straight = child.clone();
        straight.set_local_angle(PI / 2.0);
        assert!((straight.global_angle() - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn global_assignment_clamps_through_inverse_offset() {
        let root = Link::new(100.0, Point2::origin());
        let mut child = Link::attached(50.0, 0, &root);
        // Parent global 0; world angle 3π/2 + 0.25 maps back to local 0.25.
        child.set_global_angle(1.5 * PI + 0.25);
        assert!((child.angle() - 0.25).abs() < 1e-12);
        // World angle π maps to local 3π/2, clamped to π.
        child.set_global_angle(PI);
        assert_eq!(child.angle(), PI);
    }

    #[test]
    fn with_constraints_reclamps_current_angle() {
        let mut l = Link::new(1.0, Point2::origin());
        l.set_local_angle(3.0);
        let l = l.with_constraints(AngleRange::new(0.0, 1.0));
        assert_eq!(l.angle(), 1.0);
    }

    #[test]
    fn angle_to_is_world_frame() {
        let l = Link::new(1.0, Point2::new(1.0, 1.0));
        assert!((l.angle_to(&Point2::new(1.0, 5.0)) - PI / 2.0).abs() < 1e-12);
        assert!((l.angle_to(&Point2::new(-1.0, 1.0)) - PI).abs() < 1e-12);
    }
}
