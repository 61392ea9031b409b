use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A free vector in 3D model space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(&self) -> f64 {
        self.dot(self)
    }

    pub fn normalized(&self) -> Option<Self> {
        let len = self.length();
        if len < 1e-15 {
            None
        } else {
            Some(*self / len)
        }
    }

    /// Normalize, panicking if the vector is near-zero.
    pub fn normalize(&self) -> Self {
        self.normalized().expect("Cannot normalize zero-length vector")
    }

    /// Rescale to the given length, or `None` for a zero vector.
    pub fn scaled_to(&self, length: f64) -> Option<Self> {
        self.normalized().map(|unit| unit * length)
    }

    /// Unsigned angle in `[0, pi]`. Returns 0 when either vector is zero.
    pub fn angle_to(&self, other: &Self) -> f64 {
        let len_product = self.length() * other.length();
        if len_product < 1e-15 {
            return 0.0;
        }
        (self.dot(other) / len_product).clamp(-1.0, 1.0).acos()
    }

    /// True when both vectors lie on one line, pointing either way.
    pub fn is_parallel_to(&self, other: &Self, angular_tol: f64) -> bool {
        self.sine_to(other).is_some_and(|sin| sin < angular_tol)
    }

    /// True when both vectors point the same way within `angular_tol`.
    pub fn is_codirectional(&self, other: &Self, angular_tol: f64) -> bool {
        self.dot(other) > 0.0 && self.is_parallel_to(other, angular_tol)
    }

    /// Sine of the angle between the vectors. The cross-product form stays
    /// accurate near zero, where `acos` of the dot product does not.
    fn sine_to(&self, other: &Self) -> Option<f64> {
        let len_product = self.length() * other.length();
        if len_product < 1e-15 {
            None
        } else {
            Some(self.cross(other).length() / len_product)
        }
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Self::Output {
        rhs * self
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_cross_of_wall_normals() {
        // Two pocket walls facing +X and +Y meet along +Z.
        let c = Vec3::X.cross(&Vec3::Y);
        assert!((c - Vec3::Z).length() < 1e-12);
        assert!((Vec3::Y.cross(&Vec3::X) + Vec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_normalized_and_scaled() {
        let v = Vec3::new(3.0, 0.0, 4.0);
        let n = v.normalize();
        assert!((n.length() - 1.0).abs() < 1e-12);
        assert!((n.x - 0.6).abs() < 1e-12);
        let s = v.scaled_to(0.125).unwrap();
        assert!((s.length() - 0.125).abs() < 1e-12);
        assert!(Vec3::ZERO.normalized().is_none());
        assert!(Vec3::ZERO.scaled_to(1.0).is_none());
    }

    #[test]
    fn test_angle_to() {
        assert!((Vec3::X.angle_to(&Vec3::Y) - FRAC_PI_2).abs() < 1e-12);
        assert!((Vec3::X.angle_to(&(-Vec3::X)) - PI).abs() < 1e-12);
        assert_eq!(Vec3::ZERO.angle_to(&Vec3::X), 0.0);
    }

    #[test]
    fn test_parallel_and_codirectional() {
        let down = Vec3::new(0.0, 0.0, -10.0);
        assert!(down.is_parallel_to(&Vec3::Z, 1e-10));
        assert!(!down.is_codirectional(&Vec3::Z, 1e-10));
        assert!(Vec3::new(0.0, 0.0, 2.5).is_codirectional(&Vec3::Z, 1e-10));
        assert!(!Vec3::X.is_codirectional(&Vec3::Z, 1e-10));
        assert!(!Vec3::ZERO.is_parallel_to(&Vec3::Z, 1e-10));
    }
}
