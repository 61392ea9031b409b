use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::geometry::curves::Line3d;
use crate::geometry::point::Point3d;
use crate::geometry::surfaces::{Plane, Surface};
use crate::geometry::vector::Vec3;

// ─── Entity Keys ─────────────────────────────────────────────────────────────

new_key_type! {
    pub struct VertexId;
    pub struct EdgeId;
    pub struct HalfEdgeId;
    pub struct LoopId;
    pub struct FaceId;
    pub struct ShellId;
    pub struct SolidId;
}

// ─── Topological Entities ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    pub point: Point3d,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Carrier line, directed from start to end.
    pub curve: Line3d,
    /// Co-edges using this edge. The second slot holds the null key on an
    /// open boundary.
    pub half_edges: (HalfEdgeId, HalfEdgeId),
    pub start_vertex: VertexId,
    pub end_vertex: VertexId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HalfEdge {
    pub edge: EdgeId,
    pub twin: HalfEdgeId,
    pub face: FaceId,
    pub loop_id: LoopId,
    pub start_vertex: VertexId,
    pub end_vertex: VertexId,
    /// true if this half-edge traverses the curve in the forward direction.
    pub forward: bool,
}

/// A closed boundary of a face. Traversed counter-clockwise seen from the
/// side the face normal points to, so holes run clockwise in the face frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loop {
    pub half_edges: Vec<HalfEdgeId>,
    pub face: FaceId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face {
    pub surface: Surface,
    pub outer_loop: LoopId,
    pub inner_loops: Vec<LoopId>,
    /// true if the face normal agrees with the surface normal.
    pub same_sense: bool,
    pub shell: ShellId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShellOrientation {
    /// Outer shell (normals point outward).
    Outward,
    /// Open sheet; a single side carries the normals.
    Open,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shell {
    pub faces: Vec<FaceId>,
    pub orientation: ShellOrientation,
    pub solid: SolidId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solid {
    pub shells: Vec<ShellId>,
}

// ─── Adjacency Records ──────────────────────────────────────────────────────

/// One step of a face loop: the edge walked and whether the walk runs
/// against the edge's stored direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoEdge {
    pub edge: EdgeId,
    pub opposed: bool,
}

/// A face that uses an edge, with the same orientation flag as [`CoEdge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeUse {
    pub face: FaceId,
    pub opposed: bool,
}

// ─── Entity Store ────────────────────────────────────────────────────────────

/// Arena-based storage for all topological entities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    pub vertices: SlotMap<VertexId, Vertex>,
    pub edges: SlotMap<EdgeId, Edge>,
    pub half_edges: SlotMap<HalfEdgeId, HalfEdge>,
    pub loops: SlotMap<LoopId, Loop>,
    pub faces: SlotMap<FaceId, Face>,
    pub shells: SlotMap<ShellId, Shell>,
    pub solids: SlotMap<SolidId, Solid>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count topological entities for a shell: (vertices, edges, faces).
    pub fn count_topology(&self, shell_id: ShellId) -> (usize, usize, usize) {
        let shell = &self.shells[shell_id];
        let mut edge_set = HashSet::new();
        let mut vertex_set = HashSet::new();

        for &face_id in &shell.faces {
            for he_id in self.face_half_edges(face_id) {
                let he = &self.half_edges[he_id];
                edge_set.insert(he.edge);
                vertex_set.insert(he.start_vertex);
                vertex_set.insert(he.end_vertex);
            }
        }

        (vertex_set.len(), edge_set.len(), shell.faces.len())
    }

    /// Loop ids of a face, outer loop first. Empty for a removed face.
    fn face_loop_ids(&self, face_id: FaceId) -> impl Iterator<Item = LoopId> + '_ {
        self.faces
            .get(face_id)
            .into_iter()
            .flat_map(|face| std::iter::once(face.outer_loop).chain(face.inner_loops.iter().copied()))
    }

    fn face_half_edges(&self, face_id: FaceId) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.face_loop_ids(face_id)
            .filter_map(move |loop_id| self.loops.get(loop_id))
            .flat_map(|l| l.half_edges.iter().copied())
    }

    // ─── Face queries ───────────────────────────────────────────────────────

    /// Boundary loops of a face as co-edge sequences, outer loop first.
    pub fn face_loops(&self, face_id: FaceId) -> Vec<Vec<CoEdge>> {
        self.face_loop_ids(face_id)
            .filter_map(|loop_id| self.loops.get(loop_id))
            .map(|l| {
                l.half_edges
                    .iter()
                    .map(|&he_id| {
                        let he = &self.half_edges[he_id];
                        CoEdge {
                            edge: he.edge,
                            opposed: !he.forward,
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Every edge bounding the face, in loop order.
    pub fn face_edges(&self, face_id: FaceId) -> Vec<EdgeId> {
        self.face_half_edges(face_id)
            .map(|he_id| self.half_edges[he_id].edge)
            .collect()
    }

    /// Distinct vertices on the face boundary, in loop order.
    pub fn face_vertices(&self, face_id: FaceId) -> Vec<VertexId> {
        let mut seen = HashSet::new();
        self.face_half_edges(face_id)
            .map(|he_id| self.half_edges[he_id].start_vertex)
            .filter(|v| seen.insert(*v))
            .collect()
    }

    /// Identity test: is this exact vertex on the face boundary?
    pub fn face_contains_vertex(&self, face_id: FaceId, vertex_id: VertexId) -> bool {
        self.face_half_edges(face_id)
            .any(|he_id| self.half_edges[he_id].start_vertex == vertex_id)
    }

    /// Get the outward-facing normal of a face at a parameter point.
    pub fn face_normal(&self, face_id: FaceId, u: f64, v: f64) -> Vec3 {
        let face = &self.faces[face_id];
        let n = face.surface.normal_at(u, v);
        if face.same_sense { n } else { -n }
    }

    /// Outward normal at a point on the face, `None` where the surface
    /// normal is undefined.
    pub fn face_normal_at_point(&self, face_id: FaceId, p: &Point3d) -> Option<Vec3> {
        let face = self.faces.get(face_id)?;
        let n = face.surface.normal_at_point(p)?;
        Some(if face.same_sense { n } else { -n })
    }

    /// The face's plane oriented along the face normal, `None` for curved faces.
    pub fn face_plane(&self, face_id: FaceId) -> Option<Plane> {
        let face = self.faces.get(face_id)?;
        let plane = face.surface.as_plane()?;
        Some(if face.same_sense { *plane } else { plane.reversed() })
    }

    /// A point lying on the face: the first vertex of its outer loop.
    pub fn point_on_face(&self, face_id: FaceId) -> Option<Point3d> {
        let outer = self.faces.get(face_id)?.outer_loop;
        let &first = self.loops.get(outer)?.half_edges.first()?;
        let vertex = self.half_edges.get(first)?.start_vertex;
        Some(self.vertices.get(vertex)?.point)
    }

    pub fn face_solid(&self, face_id: FaceId) -> Option<SolidId> {
        let shell = self.shells.get(self.faces.get(face_id)?.shell)?;
        self.solids.contains_key(shell.solid).then_some(shell.solid)
    }

    pub fn solid_faces(&self, solid_id: SolidId) -> Vec<FaceId> {
        self.solids[solid_id]
            .shells
            .iter()
            .flat_map(|&shell_id| self.shells[shell_id].faces.iter().copied())
            .collect()
    }

    // ─── Vertex and edge queries ────────────────────────────────────────────

    /// Edges incident to a vertex, in arena order.
    pub fn vertex_edges(&self, vertex_id: VertexId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|(_, e)| e.start_vertex == vertex_id || e.end_vertex == vertex_id)
            .map(|(id, _)| id)
            .collect()
    }

    /// Faces using an edge. Two on a closed shell, one on an open boundary.
    pub fn edge_faces(&self, edge_id: EdgeId) -> Vec<EdgeUse> {
        let (h0, h1) = self.edges[edge_id].half_edges;
        [h0, h1]
            .into_iter()
            .filter_map(|he_id| self.half_edges.get(he_id))
            .map(|he| EdgeUse {
                face: he.face,
                opposed: !he.forward,
            })
            .collect()
    }

    pub fn edge_endpoints(&self, edge_id: EdgeId) -> (Point3d, Point3d) {
        let edge = &self.edges[edge_id];
        (
            self.vertices[edge.start_vertex].point,
            self.vertices[edge.end_vertex].point,
        )
    }

    /// Chord length between the edge's end vertices.
    pub fn edge_length(&self, edge_id: EdgeId) -> f64 {
        let (start, end) = self.edge_endpoints(edge_id);
        start.distance_to(&end)
    }

    pub fn edge_is_degenerate(&self, edge_id: EdgeId, coincidence: f64) -> bool {
        self.edge_length(edge_id) < coincidence
    }
}

// ─── Topology Audit ─────────────────────────────────────────────────────────

/// Result of a topological consistency check.
#[derive(Debug, Clone)]
pub struct TopologyAudit {
    pub all_edges_two_faced: bool,
    pub all_faces_closed: bool,
    pub errors: Vec<TopologyError>,
}

#[derive(Debug, Clone)]
pub enum TopologyError {
    OpenLoop { loop_id: LoopId },
    UnpairedEdge { edge: EdgeId },
    HalfEdgeTwinMismatch { half_edge: HalfEdgeId },
}

impl TopologyAudit {
    pub fn all_valid(&self) -> bool {
        self.all_edges_two_faced && self.all_faces_closed
    }
}

/// Check loop closure and twin pairing on a solid.
pub fn audit_solid(store: &EntityStore, solid_id: SolidId) -> TopologyAudit {
    let mut errors = Vec::new();
    let mut edges = HashSet::new();

    for face_id in store.solid_faces(solid_id) {
        for loop_id in store.face_loop_ids(face_id) {
            if !is_loop_closed(store, loop_id) {
                errors.push(TopologyError::OpenLoop { loop_id });
            }
        }
        edges.extend(store.face_edges(face_id));
    }
    let all_faces_closed = errors.is_empty();

    let mut all_edges_two_faced = true;
    for edge_id in edges {
        let (h0, h1) = store.edges[edge_id].half_edges;
        match (store.half_edges.get(h0), store.half_edges.get(h1)) {
            (Some(a), Some(b)) => {
                if a.twin != h1 || b.twin != h0 || a.face == b.face {
                    all_edges_two_faced = false;
                    errors.push(TopologyError::HalfEdgeTwinMismatch { half_edge: h0 });
                }
            }
            _ => {
                all_edges_two_faced = false;
                errors.push(TopologyError::UnpairedEdge { edge: edge_id });
            }
        }
    }

    TopologyAudit {
        all_edges_two_faced,
        all_faces_closed,
        errors,
    }
}

fn is_loop_closed(store: &EntityStore, loop_id: LoopId) -> bool {
    let half_edges = &store.loops[loop_id].half_edges;
    let (Some(&first), Some(&last)) = (half_edges.first(), half_edges.last()) else {
        return false;
    };
    let chained = half_edges
        .windows(2)
        .all(|w| store.half_edges[w[0]].end_vertex == store.half_edges[w[1]].start_vertex);
    chained && store.half_edges[last].end_vertex == store.half_edges[first].start_vertex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::primitives::{make_box, make_sheet};

    #[test]
    fn test_entity_store_creation() {
        let store = EntityStore::new();
        assert_eq!(store.vertices.len(), 0);
        assert_eq!(store.edges.len(), 0);
    }

    #[test]
    fn test_every_box_edge_has_two_opposite_uses() {
        let mut store = EntityStore::new();
        let solid = make_box(&mut store, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0);
        for face in store.solid_faces(solid) {
            for edge in store.face_edges(face) {
                let uses = store.edge_faces(edge);
                assert_eq!(uses.len(), 2);
                assert_ne!(uses[0].face, uses[1].face);
                assert_ne!(uses[0].opposed, uses[1].opposed);
            }
        }
    }

    #[test]
    fn test_face_loops_chain_head_to_tail() {
        let mut store = EntityStore::new();
        let solid = make_box(&mut store, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        let face = store.solid_faces(solid)[0];
        let loops = store.face_loops(face);
        assert_eq!(loops.len(), 1);
        let heads: Vec<VertexId> = loops[0]
            .iter()
            .map(|c| {
                let e = &store.edges[c.edge];
                if c.opposed { e.end_vertex } else { e.start_vertex }
            })
            .collect();
        let tails: Vec<VertexId> = loops[0]
            .iter()
            .map(|c| {
                let e = &store.edges[c.edge];
                if c.opposed { e.start_vertex } else { e.end_vertex }
            })
            .collect();
        for i in 0..4 {
            assert_eq!(tails[i], heads[(i + 1) % 4]);
        }
    }

    #[test]
    fn test_removed_face_answers_empty() {
        let mut store = EntityStore::new();
        let solid = make_box(&mut store, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        let face = store.solid_faces(solid)[0];
        store.faces.remove(face);
        assert!(store.point_on_face(face).is_none());
        assert!(store.face_plane(face).is_none());
        assert!(store.face_normal_at_point(face, &Point3d::ORIGIN).is_none());
        assert!(store.face_loops(face).is_empty());
        assert!(store.face_edges(face).is_empty());
    }

    #[test]
    fn test_vertex_edges_and_membership() {
        let mut store = EntityStore::new();
        let solid = make_box(&mut store, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        let faces = store.solid_faces(solid);
        for (v, _) in &store.vertices {
            assert_eq!(store.vertex_edges(v).len(), 3);
            let on = faces.iter().filter(|&&f| store.face_contains_vertex(f, v)).count();
            assert_eq!(on, 3);
        }
        assert_eq!(store.face_vertices(faces[0]).len(), 4);
        assert_eq!(store.face_solid(faces[0]), Some(solid));
    }

    #[test]
    fn test_membership_is_by_identity() {
        let mut store = EntityStore::new();
        let solid = make_box(&mut store, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        let face = store.solid_faces(solid)[0];
        let corner = store.point_on_face(face).unwrap();
        let twin_point = store.vertices.insert(Vertex { point: corner });
        assert!(!store.face_contains_vertex(face, twin_point));
        assert!(store.vertex_edges(twin_point).is_empty());
    }

    #[test]
    fn test_face_plane_respects_sense() {
        let mut store = EntityStore::new();
        let solid = make_box(&mut store, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        let face = store.solid_faces(solid)[0];
        let n = store.face_plane(face).unwrap().normal;
        store.faces[face].same_sense = false;
        let flipped = store.face_plane(face).unwrap().normal;
        assert!((n + flipped).length() < 1e-12);
        assert!((store.face_normal(face, 0.0, 0.0) - flipped).length() < 1e-12);
    }

    #[test]
    fn test_edge_length_and_degeneracy() {
        let mut store = EntityStore::new();
        let solid = make_box(&mut store, 0.0, 0.0, 0.0, 4.0, 4.0, 4.0);
        let edge = store.face_edges(store.solid_faces(solid)[0])[0];
        assert!((store.edge_length(edge) - 4.0).abs() < 1e-12);
        assert!(!store.edge_is_degenerate(edge, 1e-7));

        let start = store.edges[edge].start_vertex;
        let end = store.edges[edge].end_vertex;
        store.vertices[end].point = store.vertices[start].point;
        assert!(store.edge_is_degenerate(edge, 1e-7));
    }

    #[test]
    fn test_audit_box_and_sheet() {
        let mut store = EntityStore::new();
        let solid = make_box(&mut store, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        assert!(audit_solid(&store, solid).all_valid());

        let sheet = make_sheet(&mut store, &[
            Point3d::new(0.0, 0.0, 5.0),
            Point3d::new(1.0, 0.0, 5.0),
            Point3d::new(1.0, 1.0, 5.0),
        ])
        .unwrap();
        let audit = audit_solid(&store, sheet);
        assert!(audit.all_faces_closed);
        assert!(!audit.all_edges_two_faced);
        assert_eq!(audit.errors.len(), 3);
    }
}
