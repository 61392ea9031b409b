use super::curves::Line3d;
use super::point::Point3d;
use super::surfaces::Plane;

// ─── Line-Plane Intersection ────────────────────────────────────────────────

/// Intersect an unbounded line with a plane. Hits behind the line origin
/// count. Returns None if the line is parallel to the plane.
pub fn line_plane(line: &Line3d, plane: &Plane) -> Option<Point3d> {
    let denom = line.direction.dot(&plane.normal);
    if denom.abs() < 1e-15 {
        return None; // parallel
    }
    let t = (plane.origin - line.origin).dot(&plane.normal) / denom;
    Some(line.evaluate(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::vector::Vec3;

    #[test]
    fn test_line_plane_ahead_and_behind() {
        let plane = Plane::new(Point3d::new(0.0, 0.0, 10.0), Vec3::Z);
        let up = Line3d::from_points(Point3d::new(1.0, 2.0, 0.0), Point3d::new(1.0, 2.0, 4.0));
        let hit = line_plane(&up, &plane).unwrap();
        assert!(hit.distance_to(&Point3d::new(1.0, 2.0, 10.0)) < 1e-12);

        // Unbounded: a line pointing away still meets the plane.
        let down = Line3d::from_points(Point3d::new(1.0, 2.0, 4.0), Point3d::new(1.0, 2.0, 0.0));
        let hit = line_plane(&down, &plane).unwrap();
        assert!(hit.distance_to(&Point3d::new(1.0, 2.0, 10.0)) < 1e-12);
    }

    #[test]
    fn test_line_plane_oblique() {
        let plane = Plane::xy();
        let line = Line3d::new(Point3d::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, -1.0));
        let hit = line_plane(&line, &plane).unwrap();
        assert!(hit.distance_to(&Point3d::new(1.0, 0.0, 0.0)) < 1e-12);
    }

    #[test]
    fn test_line_plane_parallel() {
        let plane = Plane::xy();
        let line = Line3d::new(Point3d::new(0.0, 0.0, 1.0), Vec3::X);
        assert!(line_plane(&line, &plane).is_none());
    }
}
