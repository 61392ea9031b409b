//! Face lookups across a body: same-facing faces and the top face plane.

use dogbone_kernel::geometry::surfaces::Plane;
use tracing::debug;

use crate::angle::face_normal;
use crate::query::BRepQuery;

/// Faces of the same body whose normal points the same way as `face`'s,
/// `face` itself included.
pub fn parallel_faces<Q: BRepQuery>(query: &Q, face: Q::Face) -> Vec<Q::Face> {
    let (Some(body), Some(normal)) = (query.face_body(face), face_normal(query, face)) else {
        return Vec::new();
    };
    let angular = dogbone_kernel::default_tolerance().angular;
    query
        .body_faces(body)
        .into_iter()
        .filter(|&other| query.is_planar(other))
        .filter(|&other| face_normal(query, other).is_some_and(|n| n.is_codirectional(&normal, angular)))
        .collect()
}

/// The plane of the outermost face of the body along `face`'s normal.
///
/// Candidates are the planar faces whose normal is parallel to `face`'s in
/// either sense; the one reaching farthest along the normal wins, the last
/// one on a tie. The plane carries the winning face's own normal.
pub fn top_face_plane<Q: BRepQuery>(query: &Q, face: Q::Face) -> Option<(Plane, Q::Face)> {
    let body = query.face_body(face)?;
    let normal = face_normal(query, face)?;
    let reference = query.point_on_face(face)?;
    let angular = dogbone_kernel::default_tolerance().angular;

    let mut best: Option<(f64, Plane, Q::Face)> = None;
    for other in query.body_faces(body) {
        if !query.is_planar(other) {
            continue;
        }
        let (Some(n), Some(p)) = (face_normal(query, other), query.point_on_face(other)) else {
            continue;
        };
        if !n.is_parallel_to(&normal, angular) {
            continue;
        }
        let height = (p - reference).dot(&normal);
        if best.as_ref().is_none_or(|(h, _, _)| height >= *h) {
            best = Some((height, Plane::new(p, n), other));
        }
    }
    let (height, plane, top) = best?;
    debug!(?face, ?top, height, "top face plane");
    Some((plane, top))
}
