//! Minimal planar B-rep kernel backing the dogbone relief core.
//!
//! Provides value geometry (points, vectors, transforms, lines, planes) and a
//! half-edge topology stored in slotmap arenas, plus builders for the prismatic
//! solids the relief passes run against.

pub mod geometry;
pub mod topology;

pub use geometry::point::{Point2d, Point3d};
pub use geometry::surfaces::{Plane, Surface};
pub use geometry::vector::Vec3;
pub use topology::brep::{EdgeId, EntityStore, FaceId, SolidId, VertexId};

/// Global tolerance configuration for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Points closer than this are considered coincident (model units).
    pub coincidence: f64,
    /// Angles smaller than this (radians) are considered zero.
    pub angular: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            coincidence: 1e-7,
            angular: 1e-10,
        }
    }
}

impl Tolerance {
    pub fn points_coincident(&self, a: &Point3d, b: &Point3d) -> bool {
        a.distance_to(b) < self.coincidence
    }
}

/// Default tolerance used by builders and queries.
pub fn default_tolerance() -> Tolerance {
    Tolerance::default()
}
