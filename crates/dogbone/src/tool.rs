//! Clearance geometry for one corner edge: a cylinder along the edge plus an
//! optional box clearing the tool's approach into acute corners.
//!
//! The solids are returned as construction parameters. Building and
//! subtracting them is the host's job.

use std::f64::consts::FRAC_PI_2;

use dogbone_kernel::geometry::curves::Line3d;
use dogbone_kernel::geometry::intersection::line_plane;
use dogbone_kernel::geometry::point::Point3d;
use dogbone_kernel::geometry::surfaces::Plane;
use dogbone_kernel::geometry::transform::Transform;
use dogbone_kernel::geometry::vector::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::angle::{angle_between_faces, face_normal};
use crate::corners::{corner_edges_at_face, Corner};
use crate::error::{id, DogboneError, Result};
use crate::params::{DogboneType, ToolParameters};
use crate::query::{BRepQuery, EdgeFace};

/// Smallest clearance box length emitted, in model units.
pub const MIN_BOX_LENGTH: f64 = 0.001;

/// A round cutter body between two axis points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CylinderTool {
    pub start: Point3d,
    pub end: Point3d,
    pub radius: f64,
}

impl CylinderTool {
    pub fn axis(&self) -> Vec3 {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }
}

/// A box given by its center, two in-plane unit directions and its extents.
/// The height runs along `length_direction x width_direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedBox {
    pub center: Point3d,
    pub length_direction: Vec3,
    pub width_direction: Vec3,
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl OrientedBox {
    pub fn height_direction(&self) -> Vec3 {
        self.length_direction.cross(&self.width_direction)
    }

    /// The eight box corners, bottom four first.
    pub fn corners(&self) -> [Point3d; 8] {
        let l = self.length_direction * (self.length / 2.0);
        let w = self.width_direction * (self.width / 2.0);
        let h = self.height_direction() * (self.height / 2.0);
        let c = self.center;
        [
            c - l - w - h,
            c + l - w - h,
            c + l + w - h,
            c - l + w - h,
            c - l - w + h,
            c + l - w + h,
            c + l + w + h,
            c - l + w + h,
        ]
    }
}

/// The relief body for one corner: the cylinder unioned with the box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolSolid {
    pub cylinder: CylinderTool,
    pub clearance_box: Option<OrientedBox>,
}

/// Build the relief body for `corner`.
///
/// With `params.from_top` set and a `top_face_plane` given, the cut runs
/// from the edge end farther from that plane up to where the edge line
/// meets it. The centerline is the normal bisector in `Normal` and
/// `Minimal` mode and a single wall normal in `Mortise` mode. A clearance
/// box is attached when the corner angle lies strictly inside the
/// parameter window; when the angle cannot be computed the bare cylinder is
/// returned.
#[instrument(skip(query, corner, params, top_face_plane), fields(edge = ?corner.edge))]
pub fn dogbone_tool<Q: BRepQuery>(
    query: &Q,
    corner: &Corner<Q>,
    params: &ToolParameters,
    top_face_plane: Option<&Plane>,
) -> Result<ToolSolid> {
    let edge = corner.edge;
    let radius = params.tool_radius();
    let min_percent = params.min_percent();
    let coincidence = dogbone_kernel::default_tolerance().coincidence;

    let (mut start, mut end) = query.edge_endpoints(edge);
    if start.distance_to(&end) < coincidence {
        return Err(DogboneError::DegenerateEdge { edge: id(edge) });
    }

    if let Some(plane) = top_face_plane.filter(|_| params.from_top) {
        let axis = Line3d::try_new(end, end - start).ok_or_else(|| DogboneError::DegenerateEdge { edge: id(edge) })?;
        let top = line_plane(&axis, plane).ok_or_else(|| DogboneError::TopPlaneParallel { edge: id(edge) })?;
        if start.distance_to(&top) < end.distance_to(&top) {
            start = end;
        }
        end = top;
        debug!(?start, ?end, "cut extended to top face");
        if start.distance_to(&end) < coincidence {
            return Err(DogboneError::DegenerateEdge { edge: id(edge) });
        }
    }

    let uses = query.edge_faces(edge);
    let [first, second] = uses.as_slice() else {
        return Err(DogboneError::EdgeFaceCount {
            edge: id(edge),
            found: uses.len(),
        });
    };
    let normal1 = face_normal(query, first.face).ok_or_else(|| DogboneError::DegenerateCorner { edge: id(edge) })?;
    let normal2 = face_normal(query, second.face).ok_or_else(|| DogboneError::DegenerateCorner { edge: id(edge) })?;

    let centerline = match params.dogbone_type {
        DogboneType::Normal | DogboneType::Minimal => (normal1 + normal2).scaled_to(radius * min_percent),
        DogboneType::Mortise => {
            let wall = mortise_wall_normal(query, corner, params.long_side, [(first, normal1), (second, normal2)])?;
            wall.scaled_to(radius)
        }
    }
    .ok_or_else(|| DogboneError::DegenerateCorner { edge: id(edge) })?;

    let start = start + centerline;
    let end = end + centerline;
    let cylinder = CylinderTool { start, end, radius };

    let clearance_box = match angle_between_faces(query, edge) {
        Ok(angle) if params.min_angle_limit < angle && angle < params.max_angle_limit => {
            let b = clearance_box(&cylinder, centerline, min_percent, angle)
                .ok_or_else(|| DogboneError::DegenerateCorner { edge: id(edge) })?;
            debug!(angle_deg = angle.to_degrees(), length = b.length, "clearance box added");
            Some(b)
        }
        Ok(angle) => {
            debug!(angle_deg = angle.to_degrees(), "angle outside limits, no clearance box");
            None
        }
        Err(err) => {
            debug!(%err, "corner angle unavailable, bare cylinder");
            None
        }
    };

    Ok(ToolSolid { cylinder, clearance_box })
}

/// Normal of the adjoining wall that holds the long (or short) corner edge.
fn mortise_wall_normal<Q: BRepQuery>(
    query: &Q,
    corner: &Corner<Q>,
    long_side: bool,
    walls: [(&EdgeFace<Q::Face>, Vec3); 2],
) -> Result<Vec3> {
    let (edge1, edge2) = corner_edges_at_face(query, corner.face, corner.edge)?;
    let longer = query.edge_length(edge1) > query.edge_length(edge2);
    let choose_first = if long_side { longer } else { !longer };
    let picked = if choose_first { edge1 } else { edge2 };

    let normal = walls
        .iter()
        .find(|(wall, _)| query.face_edges(wall.face).contains(&picked))
        .map(|&(_, n)| n)
        .unwrap_or(if choose_first { walls[0].1 } else { walls[1].1 });
    debug!(?picked, long_side, "mortise wall chosen");
    Ok(normal)
}

fn clearance_box(cylinder: &CylinderTool, centerline: Vec3, min_percent: f64, angle: f64) -> Option<OrientedBox> {
    let radius = cylinder.radius;
    let edge_vector = cylinder.axis();
    let rotation = Transform::rotation_axis_angle(edge_vector, FRAC_PI_2)?;
    let width_direction = rotation.transform_vector(&centerline).normalized()?;
    let length_direction = centerline.normalized()?;
    let height_direction = edge_vector.normalized()?;

    let corner_tan = (angle / 2.0).tan();
    let length = radius * min_percent / corner_tan - radius;
    let height = cylinder.length();
    let center = cylinder.start + length_direction * (length / 2.0) + height_direction * (height / 2.0);

    Some(OrientedBox {
        center,
        length_direction,
        width_direction,
        length: length.max(MIN_BOX_LENGTH),
        width: 2.0 * radius,
        height,
    })
}
