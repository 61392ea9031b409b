use std::collections::HashMap;

use thiserror::Error;
use tracing::{info, instrument};

use super::brep::*;
use crate::geometry::curves::Line3d;
use crate::geometry::point::{signed_area_2x, Point2d, Point3d};
use crate::geometry::surfaces::{Plane, Surface};
use crate::geometry::vector::Vec3;

/// Builder input failures.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile needs at least {required} points, got {provided}")]
    InsufficientProfile { required: usize, provided: usize },

    #[error("invalid {parameter}: {value}")]
    InvalidDimension { parameter: &'static str, value: f64 },

    #[error("profile points are collinear")]
    Collinear,

    #[error("profile segment {index} has zero length")]
    DegenerateSegment { index: usize },
}

/// A closed polygon in the XY plane with optional polygonal holes.
/// Winding is normalized by the builders.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub outer: Vec<Point2d>,
    pub holes: Vec<Vec<Point2d>>,
}

impl Profile {
    pub fn new(outer: Vec<Point2d>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    pub fn with_hole(mut self, hole: Vec<Point2d>) -> Self {
        self.holes.push(hole);
        self
    }

    /// Axis-aligned rectangle from two opposite corners.
    pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(rectangle_ring(x0, y0, x1, y1))
    }
}

/// Corners of an axis-aligned rectangle, counter-clockwise.
pub fn rectangle_ring(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2d> {
    vec![
        Point2d::new(x0, y0),
        Point2d::new(x1, y0),
        Point2d::new(x1, y1),
        Point2d::new(x0, y1),
    ]
}

fn new_solid(store: &mut EntityStore, orientation: ShellOrientation) -> (SolidId, ShellId) {
    let solid_id = store.solids.insert(Solid { shells: vec![] });
    let shell_id = store.shells.insert(Shell {
        faces: vec![],
        orientation,
        solid: solid_id,
    });
    store.solids[solid_id].shells.push(shell_id);
    (solid_id, shell_id)
}

/// Insert a face with an empty outer loop.
fn new_face(store: &mut EntityStore, shell_id: ShellId, surface: Surface) -> (FaceId, LoopId) {
    let loop_id = store.loops.insert(Loop {
        half_edges: vec![],
        face: FaceId::default(),
    });
    let face_id = store.faces.insert(Face {
        surface,
        outer_loop: loop_id,
        inner_loops: vec![],
        same_sense: true,
        shell: shell_id,
    });
    store.loops[loop_id].face = face_id;
    store.shells[shell_id].faces.push(face_id);
    (face_id, loop_id)
}

fn new_inner_loop(store: &mut EntityStore, face_id: FaceId) -> LoopId {
    let loop_id = store.loops.insert(Loop {
        half_edges: vec![],
        face: face_id,
    });
    store.faces[face_id].inner_loops.push(loop_id);
    loop_id
}

fn new_vertex(store: &mut EntityStore, point: Point3d) -> VertexId {
    store.vertices.insert(Vertex { point })
}

/// Append a closed ring of co-edges to a loop.
fn close_ring(
    store: &mut EntityStore,
    ring: &[VertexId],
    face_id: FaceId,
    loop_id: LoopId,
    edge_map: &mut HashMap<(VertexId, VertexId), HalfEdgeId>,
) {
    for i in 0..ring.len() {
        let next = (i + 1) % ring.len();
        create_face_edge_twinned(store, ring[i], ring[next], face_id, loop_id, edge_map);
    }
}

/// Build a box solid directly from corner coordinates.
/// The box is axis-aligned with one corner at (x0,y0,z0) and opposite at (x1,y1,z1).
#[instrument(skip(store))]
pub fn make_box(store: &mut EntityStore, x0: f64, y0: f64, z0: f64, x1: f64, y1: f64, z1: f64) -> SolidId {
    info!(
        min = ?[x0, y0, z0],
        max = ?[x1, y1, z1],
        "creating box primitive"
    );
    let v = [
        Point3d::new(x0, y0, z0),
        Point3d::new(x1, y0, z0),
        Point3d::new(x1, y1, z0),
        Point3d::new(x0, y1, z0),
        Point3d::new(x0, y0, z1),
        Point3d::new(x1, y0, z1),
        Point3d::new(x1, y1, z1),
        Point3d::new(x0, y1, z1),
    ];
    let vertex_ids: Vec<VertexId> = v.iter().map(|p| new_vertex(store, *p)).collect();

    let (solid_id, shell_id) = new_solid(store, ShellOrientation::Outward);

    // Each ring runs counter-clockwise seen from outside.
    let face_defs: [([usize; 4], Vec3); 6] = [
        ([0, 3, 2, 1], -Vec3::Z),
        ([4, 5, 6, 7], Vec3::Z),
        ([0, 4, 7, 3], -Vec3::X),
        ([1, 2, 6, 5], Vec3::X),
        ([0, 1, 5, 4], -Vec3::Y),
        ([3, 7, 6, 2], Vec3::Y),
    ];

    let mut edge_map = HashMap::new();
    for (ring, normal) in face_defs {
        let center = v[ring[0]].midpoint(&v[ring[2]]);
        let (face_id, loop_id) = new_face(store, shell_id, Surface::Plane(Plane::new(center, normal)));
        let ring_ids = ring.map(|i| vertex_ids[i]);
        close_ring(store, &ring_ids, face_id, loop_id, &mut edge_map);
    }

    solid_id
}

/// Extrude a planar profile along +Z from `z0` by `height`. Holes become
/// through-pockets whose walls face into the hole.
#[instrument(skip(store, profile), fields(outer = profile.outer.len(), holes = profile.holes.len()))]
pub fn extrude_profile(
    store: &mut EntityStore,
    profile: &Profile,
    z0: f64,
    height: f64,
) -> Result<SolidId, ProfileError> {
    if !(height > 0.0) {
        return Err(ProfileError::InvalidDimension {
            parameter: "height",
            value: height,
        });
    }
    for ring in std::iter::once(&profile.outer).chain(&profile.holes) {
        if ring.len() < 3 {
            return Err(ProfileError::InsufficientProfile {
                required: 3,
                provided: ring.len(),
            });
        }
        let points: Vec<Point3d> = ring.iter().map(|p| p.at_z(z0)).collect();
        check_segments(&points)?;
        if signed_area_2x(ring).abs() < 1e-12 {
            return Err(ProfileError::Collinear);
        }
    }
    info!(z0, height, "extruding profile");

    // Outer ring counter-clockwise, holes clockwise, seen from +Z.
    let mut rings = vec![oriented(&profile.outer, true)];
    rings.extend(profile.holes.iter().map(|h| oriented(h, false)));

    let z1 = z0 + height;
    let bottom: Vec<Vec<VertexId>> = rings
        .iter()
        .map(|ring| ring.iter().map(|p| new_vertex(store, p.at_z(z0))).collect())
        .collect();
    let top: Vec<Vec<VertexId>> = rings
        .iter()
        .map(|ring| ring.iter().map(|p| new_vertex(store, p.at_z(z1))).collect())
        .collect();

    let (solid_id, shell_id) = new_solid(store, ShellOrientation::Outward);
    let mut edge_map = HashMap::new();

    let bottom_plane = Plane::new(rings[0][0].at_z(z0), -Vec3::Z);
    let (face_id, outer_loop) = new_face(store, shell_id, Surface::Plane(bottom_plane));
    for (i, ring) in bottom.iter().enumerate() {
        let loop_id = if i == 0 { outer_loop } else { new_inner_loop(store, face_id) };
        let reversed: Vec<VertexId> = ring.iter().rev().copied().collect();
        close_ring(store, &reversed, face_id, loop_id, &mut edge_map);
    }

    let top_plane = Plane::new(rings[0][0].at_z(z1), Vec3::Z);
    let (face_id, outer_loop) = new_face(store, shell_id, Surface::Plane(top_plane));
    for (i, ring) in top.iter().enumerate() {
        let loop_id = if i == 0 { outer_loop } else { new_inner_loop(store, face_id) };
        close_ring(store, ring, face_id, loop_id, &mut edge_map);
    }

    for (r, ring) in rings.iter().enumerate() {
        let n = ring.len();
        for a in 0..n {
            let b = (a + 1) % n;
            let normal = (ring[b].at_z(z0) - ring[a].at_z(z0)).cross(&Vec3::Z);
            let plane = Plane::new(ring[a].at_z(z0), normal);
            let (face_id, loop_id) = new_face(store, shell_id, Surface::Plane(plane));
            let quad = [bottom[r][a], bottom[r][b], top[r][b], top[r][a]];
            close_ring(store, &quad, face_id, loop_id, &mut edge_map);
        }
    }

    Ok(solid_id)
}

/// Build a single open planar face through `points`, wound in the given
/// order. Its boundary edges have one co-edge each.
#[instrument(skip(store, points), fields(points = points.len()))]
pub fn make_sheet(store: &mut EntityStore, points: &[Point3d]) -> Result<SolidId, ProfileError> {
    if points.len() < 3 {
        return Err(ProfileError::InsufficientProfile {
            required: 3,
            provided: points.len(),
        });
    }
    check_segments(points)?;
    let normal = newell_normal(points).normalized().ok_or(ProfileError::Collinear)?;
    info!("creating open sheet");

    let ring: Vec<VertexId> = points.iter().map(|p| new_vertex(store, *p)).collect();
    let (solid_id, shell_id) = new_solid(store, ShellOrientation::Open);
    let (face_id, loop_id) = new_face(store, shell_id, Surface::Plane(Plane::new(points[0], normal)));
    close_ring(store, &ring, face_id, loop_id, &mut HashMap::new());
    Ok(solid_id)
}

/// Reject a closed ring with two coincident consecutive points.
fn check_segments(ring: &[Point3d]) -> Result<(), ProfileError> {
    let tolerance = crate::default_tolerance();
    let n = ring.len();
    match (0..n).find(|&i| tolerance.points_coincident(&ring[i], &ring[(i + 1) % n])) {
        Some(index) => Err(ProfileError::DegenerateSegment { index }),
        None => Ok(()),
    }
}

fn oriented(ring: &[Point2d], ccw: bool) -> Vec<Point2d> {
    if (signed_area_2x(ring) > 0.0) == ccw {
        ring.to_vec()
    } else {
        ring.iter().rev().copied().collect()
    }
}

/// Area-weighted polygon normal; zero for collinear points.
fn newell_normal(points: &[Point3d]) -> Vec3 {
    let n = points.len();
    (0..n).fold(Vec3::ZERO, |acc, i| {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc + Vec3::new(
            (a.y - b.y) * (a.z + b.z),
            (a.z - b.z) * (a.x + b.x),
            (a.x - b.x) * (a.y + b.y),
        )
    })
}

/// Create a half-edge from `v_start` to `v_end` on the given loop, reusing
/// and twinning the edge if the opposite half-edge was already created.
pub(crate) fn create_face_edge_twinned(
    store: &mut EntityStore,
    v_start: VertexId,
    v_end: VertexId,
    face_id: FaceId,
    loop_id: LoopId,
    edge_map: &mut HashMap<(VertexId, VertexId), HalfEdgeId>,
) -> HalfEdgeId {
    let p_start = store.vertices[v_start].point;
    let p_end = store.vertices[v_end].point;

    // Canonical key: smaller VertexId first
    let edge_key = if v_start < v_end {
        (v_start, v_end)
    } else {
        (v_end, v_start)
    };
    let forward = v_start < v_end;

    let he_id = store.half_edges.insert(HalfEdge {
        edge: EdgeId::default(),
        twin: HalfEdgeId::default(),
        face: face_id,
        loop_id,
        start_vertex: v_start,
        end_vertex: v_end,
        forward,
    });

    store.loops[loop_id].half_edges.push(he_id);

    if let Some(&twin_he_id) = edge_map.get(&edge_key) {
        let edge_id = store.half_edges[twin_he_id].edge;
        store.half_edges[he_id].twin = twin_he_id;
        store.half_edges[he_id].edge = edge_id;
        store.half_edges[twin_he_id].twin = he_id;
        store.edges[edge_id].half_edges.1 = he_id;
    } else {
        let (e_start, e_end, p0, p1) = if forward {
            (v_start, v_end, p_start, p_end)
        } else {
            (v_end, v_start, p_end, p_start)
        };
        let edge_id = store.edges.insert(Edge {
            curve: Line3d::from_points(p0, p1),
            half_edges: (he_id, HalfEdgeId::default()),
            start_vertex: e_start,
            end_vertex: e_end,
        });

        store.half_edges[he_id].edge = edge_id;
        edge_map.insert(edge_key, he_id);
    }

    he_id
}
