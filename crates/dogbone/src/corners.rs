//! Inside-corner detection on planar faces.

use dogbone_kernel::geometry::vector::Vec3;
use tracing::{debug, instrument};

use crate::angle::{angle_between_faces, corrected_edge_vector, face_normal};
use crate::error::{DogboneError, Result};
use crate::params::ToolParameters;
use crate::query::BRepQuery;

/// An edge dropping away from a face at one of its boundary vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerCandidate<V, E, F> {
    /// The dropping edge that receives the relief cut.
    pub edge: E,
    /// The face the corner was found on.
    pub face: F,
    pub face_normal: Vec3,
    /// The boundary vertex the edge leaves from.
    pub vertex: V,
}

/// [`CornerCandidate`] keyed by a provider's id types.
pub type Corner<Q> = CornerCandidate<<Q as BRepQuery>::Vertex, <Q as BRepQuery>::Edge, <Q as BRepQuery>::Face>;

/// Inside corners of a planar face, at most one per boundary vertex.
///
/// At each vertex only the first incident edge that does not point along
/// the face normal is tested against the angle window. Later candidates are
/// never tried. Curved faces yield nothing.
#[instrument(skip(query))]
pub fn find_inner_corners<Q: BRepQuery>(query: &Q, face: Q::Face, min_angle: f64, max_angle: f64) -> Vec<Corner<Q>> {
    if !query.is_planar(face) {
        debug!("face is not planar");
        return Vec::new();
    }
    let Some(normal) = face_normal(query, face) else {
        debug!("face has no normal");
        return Vec::new();
    };
    let angular = dogbone_kernel::default_tolerance().angular;

    let mut corners: Vec<Corner<Q>> = Vec::new();
    for ring in query.face_loops(face) {
        let n = ring.len();
        for (i, step) in ring.iter().enumerate() {
            let previous = ring[(i + n - 1) % n].edge;
            let (start, end) = query.edge_vertices(step.edge);
            let vertex = if step.opposed { end } else { start };

            let candidates: Vec<Q::Edge> = query
                .vertex_edges(vertex)
                .into_iter()
                .filter(|&e| e != step.edge && e != previous)
                .collect();
            if candidates.is_empty() {
                continue;
            }

            let Some(edge) = candidates
                .iter()
                .copied()
                .find(|&e| !corrected_edge_vector(query, e, vertex).is_codirectional(&normal, angular))
            else {
                debug!(?vertex, "every candidate rises along the face normal");
                continue;
            };

            match angle_between_faces(query, edge) {
                Ok(angle) if min_angle < angle && angle < max_angle => {}
                Ok(angle) => {
                    debug!(?edge, angle_deg = angle.to_degrees(), "corner angle outside limits");
                    continue;
                }
                Err(err) => {
                    debug!(?edge, %err, "corner angle unavailable");
                    continue;
                }
            }
            if query.edge_is_degenerate(edge) {
                debug!(?edge, "dropping degenerate corner edge");
                continue;
            }
            if corners.iter().any(|c| c.edge == edge) {
                continue;
            }
            corners.push(CornerCandidate {
                edge,
                face,
                face_normal: normal,
                vertex,
            });
        }
    }
    debug!(count = corners.len(), "inner corners found");
    corners
}

/// [`find_inner_corners`] with the angle window from `params`.
pub fn find_inner_corners_with<Q: BRepQuery>(query: &Q, face: Q::Face, params: &ToolParameters) -> Vec<Corner<Q>> {
    find_inner_corners(query, face, params.min_angle_limit, params.max_angle_limit)
}

/// The two boundary edges of `face` that meet where `edge` leaves it.
///
/// The corner vertex is matched by identity against the face boundary.
pub fn corner_edges_at_face<Q: BRepQuery>(query: &Q, face: Q::Face, edge: Q::Edge) -> Result<(Q::Edge, Q::Edge)> {
    let (start, end) = query.edge_vertices(edge);
    let vertex = if query.face_contains_vertex(face, start) { start } else { end };
    let boundary = query.face_edges(face);
    let at_corner: Vec<Q::Edge> = query
        .vertex_edges(vertex)
        .into_iter()
        .filter(|e| boundary.contains(e))
        .collect();
    match at_corner.as_slice() {
        &[first, second] => Ok((first, second)),
        other => Err(DogboneError::CornerEdgeCount { found: other.len() }),
    }
}
