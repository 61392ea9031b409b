//! Face normals and dihedral angles across edges.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use dogbone_kernel::geometry::vector::Vec3;
use tracing::{debug, instrument};

use crate::error::{id, DogboneError, Result};
use crate::query::BRepQuery;

/// Unit normal of the face, evaluated at a point on it.
pub fn face_normal<Q: BRepQuery>(query: &Q, face: Q::Face) -> Option<Vec3> {
    let point = query.point_on_face(face)?;
    query.normal_at_point(face, &point)?.normalized()
}

/// Direction of `edge` pointing away from `reference`, whichever end the
/// provider stores as the start. The start is matched by position, so a
/// coincident proxy vertex counts as the start.
pub fn corrected_edge_vector<Q: BRepQuery>(query: &Q, edge: Q::Edge, reference: Q::Vertex) -> Vec3 {
    let (start, end) = query.edge_endpoints(edge);
    let at = query.vertex_point(reference);
    if dogbone_kernel::default_tolerance().points_coincident(&start, &at) {
        end - start
    } else {
        start - end
    }
}

/// Angle in `[0, 2pi)` across an edge shared by exactly two planar faces.
///
/// Concave junctions (inside corners of a pocket or a reentrant wall) come
/// out below pi; convex ones come out above it.
#[instrument(skip(query), level = "debug")]
pub fn angle_between_faces<Q: BRepQuery>(query: &Q, edge: Q::Edge) -> Result<f64> {
    let uses = query.edge_faces(edge);
    let [first, second] = uses.as_slice() else {
        return Err(DogboneError::EdgeFaceCount {
            edge: id(edge),
            found: uses.len(),
        });
    };

    let normal1 = planar_normal(query, first.face)?;
    let normal2 = planar_normal(query, second.face)?;
    let normal_angle = normal1.angle_to(&normal2);

    // Walk direction reversed against the first face's co-edge.
    let (start, end) = query.edge_endpoints(edge);
    let edge_dir = if first.opposed { end - start } else { start - end };
    let cross = normal1.cross(&normal2);

    let angle = if edge_dir.angle_to(&cross) > FRAC_PI_2 {
        TAU - (PI - normal_angle)
    } else {
        PI - normal_angle
    };
    debug!(angle_deg = angle.to_degrees(), "dihedral angle");
    Ok(angle)
}

fn planar_normal<Q: BRepQuery>(query: &Q, face: Q::Face) -> Result<Vec3> {
    if !query.is_planar(face) {
        return Err(DogboneError::NonPlanarFace { face: id(face) });
    }
    face_normal(query, face).ok_or_else(|| DogboneError::NonPlanarFace { face: id(face) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dogbone_kernel::geometry::point::{Point2d, Point3d};
    use dogbone_kernel::geometry::surfaces::{Cylinder, Surface};
    use dogbone_kernel::topology::brep::{EdgeId, EntityStore, SolidId, Vertex};
    use dogbone_kernel::topology::primitives::{extrude_profile, make_box, Profile};

    fn l_prism(store: &mut EntityStore) -> SolidId {
        let profile = Profile::new(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(10.0, 0.0),
            Point2d::new(10.0, 5.0),
            Point2d::new(5.0, 5.0),
            Point2d::new(5.0, 10.0),
            Point2d::new(0.0, 10.0),
        ]);
        extrude_profile(store, &profile, 0.0, 3.0).unwrap()
    }

    fn vertical_edge_at(store: &EntityStore, x: f64, y: f64) -> EdgeId {
        store
            .edges
            .keys()
            .find(|&e| {
                let (a, b) = store.edge_endpoints(e);
                (a.x - x).abs() < 1e-9 && (a.y - y).abs() < 1e-9 && (b.x - x).abs() < 1e-9 && (b.y - y).abs() < 1e-9
            })
            .unwrap()
    }

    #[test]
    fn test_face_normal_of_box_faces_is_unit_and_outward() {
        let mut store = EntityStore::new();
        let solid = make_box(&mut store, 0.0, 0.0, 0.0, 2.0, 2.0, 2.0);
        let center = Point3d::new(1.0, 1.0, 1.0);
        for face in store.solid_faces(solid) {
            let n = face_normal(&store, face).unwrap();
            assert_relative_eq!(n.length(), 1.0, epsilon = 1e-12);
            let p = store.point_on_face(face).unwrap();
            assert!((p - center).dot(&n) > 0.0);
        }
    }

    #[test]
    fn test_box_edges_are_convex() {
        let mut store = EntityStore::new();
        make_box(&mut store, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        for edge in store.edges.keys().collect::<Vec<_>>() {
            let angle = angle_between_faces(&store, edge).unwrap();
            assert_relative_eq!(angle, 1.5 * PI, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_reentrant_and_outer_corners_of_l_prism() {
        let mut store = EntityStore::new();
        l_prism(&mut store);
        let inside = vertical_edge_at(&store, 5.0, 5.0);
        assert_relative_eq!(angle_between_faces(&store, inside).unwrap(), FRAC_PI_2, epsilon = 1e-12);

        let outside = vertical_edge_at(&store, 10.0, 0.0);
        assert!(angle_between_faces(&store, outside).unwrap() > PI);
    }

    #[test]
    fn test_angle_independent_of_storage_order() {
        let mut store = EntityStore::new();
        l_prism(&mut store);
        let inside = vertical_edge_at(&store, 5.0, 5.0);
        let before = angle_between_faces(&store, inside).unwrap();

        // Swap which face is reported first.
        let (h0, h1) = store.edges[inside].half_edges;
        store.edges[inside].half_edges = (h1, h0);
        assert_relative_eq!(angle_between_faces(&store, inside).unwrap(), before, epsilon = 1e-12);

        // Reverse the stored edge direction as well.
        let edge = &mut store.edges[inside];
        std::mem::swap(&mut edge.start_vertex, &mut edge.end_vertex);
        for h in [h0, h1] {
            store.half_edges[h].forward = !store.half_edges[h].forward;
        }
        assert_relative_eq!(angle_between_faces(&store, inside).unwrap(), before, epsilon = 1e-12);
    }

    #[test]
    fn test_non_planar_face_is_rejected() {
        let mut store = EntityStore::new();
        l_prism(&mut store);
        let inside = vertical_edge_at(&store, 5.0, 5.0);
        let face = store.edge_faces(inside)[1].face;
        store.faces[face].surface = Surface::Cylinder(Cylinder::new(Point3d::ORIGIN, Vec3::Z, 5.0));
        assert!(matches!(
            angle_between_faces(&store, inside),
            Err(DogboneError::NonPlanarFace { .. })
        ));
    }

    #[test]
    fn test_single_faced_edge_is_rejected() {
        let mut store = EntityStore::new();
        let sheet = dogbone_kernel::topology::primitives::make_sheet(
            &mut store,
            &[Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Point3d::new(0.0, 1.0, 0.0)],
        )
        .unwrap();
        let edge = store.face_edges(store.solid_faces(sheet)[0])[0];
        assert_eq!(
            angle_between_faces(&store, edge),
            Err(DogboneError::EdgeFaceCount { edge: id(edge), found: 1 })
        );
    }

    #[test]
    fn test_corrected_vector_points_away_from_reference() {
        let mut store = EntityStore::new();
        l_prism(&mut store);
        let edge = vertical_edge_at(&store, 5.0, 5.0);
        let (start, end) = (store.edges[edge].start_vertex, store.edges[edge].end_vertex);
        let from_start = corrected_edge_vector(&store, edge, start);
        let from_end = corrected_edge_vector(&store, edge, end);
        assert_relative_eq!((from_start + from_end).length(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(from_start.length(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_corrected_vector_matches_coincident_proxy() {
        let mut store = EntityStore::new();
        l_prism(&mut store);
        let edge = vertical_edge_at(&store, 5.0, 5.0);
        let start = store.edges[edge].start_vertex;
        let proxy = store.vertices.insert(Vertex {
            point: store.vertices[start].point,
        });
        let expected = corrected_edge_vector(&store, edge, start);
        assert_relative_eq!((corrected_edge_vector(&store, edge, proxy) - expected).length(), 0.0);
    }
}
