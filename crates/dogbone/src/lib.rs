//! Dogbone corner relief for milled parts.
//!
//! A round cutter cannot reach into the inside corners of a pocket or slot,
//! so mating parts will not seat. This crate finds those corners on planar
//! faces of a B-rep and builds the clearance geometry (a cylinder along the
//! corner edge, with an approach box in acute corners) that the host
//! subtracts from the body.
//!
//! Everything runs against the [`BRepQuery`] trait. The kernel's
//! [`EntityStore`](dogbone_kernel::EntityStore) implements it.

pub mod angle;
pub mod batch;
pub mod corners;
pub mod defaults;
pub mod error;
pub mod faces;
pub mod params;
pub mod query;
pub mod registry;
pub mod tool;

pub use angle::{angle_between_faces, corrected_edge_vector, face_normal};
pub use batch::{CutSink, DogbonePass, PassReport, ToolBody};
pub use corners::{corner_edges_at_face, find_inner_corners, find_inner_corners_with, Corner, CornerCandidate};
pub use defaults::{DefaultsError, DefaultsFile};
pub use error::{DogboneError, Result};
pub use faces::{parallel_faces, top_face_plane};
pub use params::{DogboneType, ToolParameters};
pub use query::{BRepQuery, EdgeFace, LoopEdge};
pub use registry::{EdgeRecord, EdgeRecordId, FaceRecord, FaceRecordId, SelectionRegistry};
pub use tool::{dogbone_tool, CylinderTool, OrientedBox, ToolSolid, MIN_BOX_LENGTH};
