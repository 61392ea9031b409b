use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// A 4x4 affine transformation matrix stored in column-major order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Column-major 4x4 matrix entries.
    pub m: [f64; 16],
}

impl Transform {
    pub fn identity() -> Self {
        #[rustfmt::skip]
        let m = [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        Self { m }
    }

    pub fn translation(v: Vec3) -> Self {
        let mut t = Self::identity();
        t.m[12] = v.x;
        t.m[13] = v.y;
        t.m[14] = v.z;
        t
    }

    /// Rotation by `angle` radians about an axis through the origin
    /// (Rodrigues' formula). Returns `None` for a zero-length axis.
    pub fn rotation_axis_angle(axis: Vec3, angle: f64) -> Option<Self> {
        let axis = axis.normalized()?;
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);

        #[rustfmt::skip]
        let m = [
            t*x*x + c,     t*x*y + s*z,   t*x*z - s*y,   0.0,
            t*x*y - s*z,   t*y*y + c,     t*y*z + s*x,   0.0,
            t*x*z + s*y,   t*y*z - s*x,   t*z*z + c,     0.0,
            0.0,           0.0,           0.0,           1.0,
        ];
        Some(Self { m })
    }

    /// Matrix element access (row, col), 0-indexed.
    fn at(&self, row: usize, col: usize) -> f64 {
        self.m[col * 4 + row]
    }

    /// Transform a point (applies translation).
    pub fn transform_point(&self, p: &Point3d) -> Point3d {
        let v = self.transform_vector(&p.to_vec3());
        Point3d::new(v.x + self.at(0, 3), v.y + self.at(1, 3), v.z + self.at(2, 3))
    }

    /// Transform a vector (no translation).
    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        let row = |r: usize| self.at(r, 0) * v.x + self.at(r, 1) * v.y + self.at(r, 2) * v.z;
        Vec3::new(row(0), row(1), row(2))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
