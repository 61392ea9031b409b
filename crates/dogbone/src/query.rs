//! The read-only B-rep view the relief core runs against.

use std::fmt::Debug;
use std::hash::Hash;

use dogbone_kernel::geometry::point::Point3d;
use dogbone_kernel::geometry::surfaces::Plane;
use dogbone_kernel::geometry::vector::Vec3;
use dogbone_kernel::topology::brep::{EdgeId, EntityStore, FaceId, SolidId, VertexId};

/// One step of a face boundary loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopEdge<E> {
    pub edge: E,
    /// The loop walks the edge from its end vertex to its start vertex.
    pub opposed: bool,
}

/// A co-edge record: a face using an edge, with the same orientation flag
/// as the matching [`LoopEdge`] in that face's loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeFace<F> {
    pub face: F,
    pub opposed: bool,
}

/// Geometry provider. Every relief operation is generic over it.
///
/// Ids are cheap handles compared by identity. Callers check validity with
/// [`is_valid_face`](Self::is_valid_face) / [`is_valid_edge`](Self::is_valid_edge)
/// before handing in ids that may have gone stale.
pub trait BRepQuery {
    type Vertex: Copy + Eq + Hash + Debug;
    type Edge: Copy + Eq + Hash + Debug;
    type Face: Copy + Eq + Hash + Debug;
    type Body: Copy + Eq + Hash + Debug;

    /// The face's carrier plane oriented along the face normal, or `None`
    /// when the face is not planar.
    fn face_plane(&self, face: Self::Face) -> Option<Plane>;

    fn is_planar(&self, face: Self::Face) -> bool {
        self.face_plane(face).is_some()
    }

    /// Some point known to lie on the face.
    fn point_on_face(&self, face: Self::Face) -> Option<Point3d>;

    /// Outward surface normal at a point on the face.
    fn normal_at_point(&self, face: Self::Face, point: &Point3d) -> Option<Vec3>;

    /// Boundary loops, outer loop first, each in traversal order.
    fn face_loops(&self, face: Self::Face) -> Vec<Vec<LoopEdge<Self::Edge>>>;

    /// All edges bounding the face.
    fn face_edges(&self, face: Self::Face) -> Vec<Self::Edge>;

    /// Identity membership test for a boundary vertex.
    fn face_contains_vertex(&self, face: Self::Face, vertex: Self::Vertex) -> bool;

    fn face_body(&self, face: Self::Face) -> Option<Self::Body>;

    fn vertex_point(&self, vertex: Self::Vertex) -> Point3d;

    /// Edges incident to the vertex, in provider order.
    fn vertex_edges(&self, vertex: Self::Vertex) -> Vec<Self::Edge>;

    /// (start, end) as stored by the provider.
    fn edge_vertices(&self, edge: Self::Edge) -> (Self::Vertex, Self::Vertex);

    fn edge_endpoints(&self, edge: Self::Edge) -> (Point3d, Point3d) {
        let (start, end) = self.edge_vertices(edge);
        (self.vertex_point(start), self.vertex_point(end))
    }

    fn edge_length(&self, edge: Self::Edge) -> f64 {
        let (start, end) = self.edge_endpoints(edge);
        start.distance_to(&end)
    }

    /// Co-edge records of the edge: two on a closed body, fewer on a sheet.
    fn edge_faces(&self, edge: Self::Edge) -> Vec<EdgeFace<Self::Face>>;

    fn edge_is_degenerate(&self, edge: Self::Edge) -> bool;

    /// Every body in the model.
    fn bodies(&self) -> Vec<Self::Body>;

    fn body_faces(&self, body: Self::Body) -> Vec<Self::Face>;

    fn is_valid_face(&self, face: Self::Face) -> bool;

    fn is_valid_edge(&self, edge: Self::Edge) -> bool;
}

impl BRepQuery for EntityStore {
    type Vertex = VertexId;
    type Edge = EdgeId;
    type Face = FaceId;
    type Body = SolidId;

    fn face_plane(&self, face: FaceId) -> Option<Plane> {
        EntityStore::face_plane(self, face)
    }

    fn point_on_face(&self, face: FaceId) -> Option<Point3d> {
        EntityStore::point_on_face(self, face)
    }

    fn normal_at_point(&self, face: FaceId, point: &Point3d) -> Option<Vec3> {
        self.face_normal_at_point(face, point)
    }

    fn face_loops(&self, face: FaceId) -> Vec<Vec<LoopEdge<EdgeId>>> {
        EntityStore::face_loops(self, face)
            .into_iter()
            .map(|ring| {
                ring.into_iter()
                    .map(|c| LoopEdge {
                        edge: c.edge,
                        opposed: c.opposed,
                    })
                    .collect()
            })
            .collect()
    }

    fn face_edges(&self, face: FaceId) -> Vec<EdgeId> {
        EntityStore::face_edges(self, face)
    }

    fn face_contains_vertex(&self, face: FaceId, vertex: VertexId) -> bool {
        EntityStore::face_contains_vertex(self, face, vertex)
    }

    fn face_body(&self, face: FaceId) -> Option<SolidId> {
        self.face_solid(face)
    }

    fn vertex_point(&self, vertex: VertexId) -> Point3d {
        self.vertices[vertex].point
    }

    fn vertex_edges(&self, vertex: VertexId) -> Vec<EdgeId> {
        EntityStore::vertex_edges(self, vertex)
    }

    fn edge_vertices(&self, edge: EdgeId) -> (VertexId, VertexId) {
        let e = &self.edges[edge];
        (e.start_vertex, e.end_vertex)
    }

    fn edge_faces(&self, edge: EdgeId) -> Vec<EdgeFace<FaceId>> {
        EntityStore::edge_faces(self, edge)
            .into_iter()
            .map(|u| EdgeFace {
                face: u.face,
                opposed: u.opposed,
            })
            .collect()
    }

    fn edge_is_degenerate(&self, edge: EdgeId) -> bool {
        EntityStore::edge_is_degenerate(self, edge, dogbone_kernel::default_tolerance().coincidence)
    }

    fn bodies(&self) -> Vec<SolidId> {
        self.solids.keys().collect()
    }

    fn body_faces(&self, body: SolidId) -> Vec<FaceId> {
        self.solid_faces(body)
    }

    fn is_valid_face(&self, face: FaceId) -> bool {
        self.faces.contains_key(face)
    }

    fn is_valid_edge(&self, edge: EdgeId) -> bool {
        self.edges
            .get(edge)
            .is_some_and(|e| self.vertices.contains_key(e.start_vertex) && self.vertices.contains_key(e.end_vertex))
    }
}
