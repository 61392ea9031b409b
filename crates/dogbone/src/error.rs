use std::fmt::Debug;

/// Failures raised by the corner finder, the tool builder and the pass.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DogboneError {
    #[error("face {face} is not planar")]
    NonPlanarFace { face: String },

    #[error("edge {edge} has {found} adjoining faces, expected 2")]
    EdgeFaceCount { edge: String, found: usize },

    #[error("expected 2 face edges at the corner vertex, found {found}")]
    CornerEdgeCount { found: usize },

    #[error("edge {edge} has zero length")]
    DegenerateEdge { edge: String },

    #[error("corner at edge {edge} has no usable centerline")]
    DegenerateCorner { edge: String },

    #[error("edge {edge} runs parallel to the top face plane")]
    TopPlaneParallel { edge: String },

    #[error("invalid {parameter}: {value}")]
    InvalidParameter { parameter: &'static str, value: f64 },

    #[error("no active model")]
    NoActiveModel,

    #[error("unknown face {face}")]
    UnknownFace { face: String },

    #[error("unknown edge {edge}")]
    UnknownEdge { edge: String },

    #[error("host operation failed: {reason}")]
    Host { reason: String },
}

pub type Result<T> = std::result::Result<T, DogboneError>;

/// Render an entity id for an error message.
pub(crate) fn id<T: Debug>(entity: T) -> String {
    format!("{entity:?}")
}
