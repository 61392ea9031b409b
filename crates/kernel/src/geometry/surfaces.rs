use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// Face surface types supported by the kernel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Surface {
    Plane(Plane),
    Cylinder(Cylinder),
}

/// An infinite plane with an orthonormal in-plane frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3d,
    pub normal: Vec3,
    pub u_axis: Vec3,
    pub v_axis: Vec3,
}

impl Plane {
    pub fn new(origin: Point3d, normal: Vec3) -> Self {
        let normal = normal.normalize();
        let u_axis = perpendicular_to(&normal);
        let v_axis = normal.cross(&u_axis);
        Self {
            origin,
            normal,
            u_axis,
            v_axis,
        }
    }

    pub fn xy() -> Self {
        Self {
            origin: Point3d::ORIGIN,
            normal: Vec3::Z,
            u_axis: Vec3::X,
            v_axis: Vec3::Y,
        }
    }

    pub fn evaluate(&self, u: f64, v: f64) -> Point3d {
        self.origin + self.u_axis * u + self.v_axis * v
    }

    /// Signed distance along the plane normal.
    pub fn distance_to_point(&self, p: &Point3d) -> f64 {
        (*p - self.origin).dot(&self.normal)
    }

    pub fn project_point(&self, p: &Point3d) -> Point3d {
        *p - self.normal * self.distance_to_point(p)
    }

    /// Same plane with the normal flipped.
    pub fn reversed(&self) -> Self {
        Self {
            origin: self.origin,
            normal: -self.normal,
            u_axis: self.v_axis,
            v_axis: self.u_axis,
        }
    }
}

/// A cylinder surface (infinite along axis).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cylinder {
    pub origin: Point3d,
    pub axis: Vec3,
    pub radius: f64,
    pub ref_dir: Vec3,
}

impl Cylinder {
    pub fn new(origin: Point3d, axis: Vec3, radius: f64) -> Self {
        let axis = axis.normalize();
        Self {
            origin,
            axis,
            radius,
            ref_dir: perpendicular_to(&axis),
        }
    }

    /// Evaluate at (u=angle, v=height along axis).
    pub fn evaluate(&self, u: f64, v: f64) -> Point3d {
        let y_dir = self.axis.cross(&self.ref_dir);
        self.origin
            + self.ref_dir * (self.radius * u.cos())
            + y_dir * (self.radius * u.sin())
            + self.axis * v
    }

    pub fn normal_at(&self, u: f64, _v: f64) -> Vec3 {
        let y_dir = self.axis.cross(&self.ref_dir);
        self.ref_dir * u.cos() + y_dir * u.sin()
    }

    /// Radial unit normal through `p`; `None` on the axis.
    pub fn normal_at_point(&self, p: &Point3d) -> Option<Vec3> {
        let offset = *p - self.origin;
        (offset - self.axis * offset.dot(&self.axis)).normalized()
    }
}

impl Surface {
    pub fn evaluate(&self, u: f64, v: f64) -> Point3d {
        match self {
            Surface::Plane(p) => p.evaluate(u, v),
            Surface::Cylinder(c) => c.evaluate(u, v),
        }
    }

    pub fn normal_at(&self, u: f64, v: f64) -> Vec3 {
        match self {
            Surface::Plane(p) => p.normal,
            Surface::Cylinder(c) => c.normal_at(u, v),
        }
    }

    /// Surface normal at a point assumed to lie on the surface.
    pub fn normal_at_point(&self, p: &Point3d) -> Option<Vec3> {
        match self {
            Surface::Plane(plane) => Some(plane.normal),
            Surface::Cylinder(c) => c.normal_at_point(p),
        }
    }

    pub fn as_plane(&self) -> Option<&Plane> {
        match self {
            Surface::Plane(p) => Some(p),
            Surface::Cylinder(_) => None,
        }
    }

    pub fn is_planar(&self) -> bool {
        self.as_plane().is_some()
    }
}

/// Any unit vector perpendicular to `n` (which must be a unit vector).
fn perpendicular_to(n: &Vec3) -> Vec3 {
    if n.x.abs() < 0.9 {
        Vec3::X.cross(n).normalize()
    } else {
        Vec3::Y.cross(n).normalize()
    }
}
