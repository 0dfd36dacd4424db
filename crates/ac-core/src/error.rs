//! Error types for shape payloads and host updates.
//!
//! None of these are fatal: the parse layer degrades malformed payloads to
//! empty data, and the table editor turns update failures into a no-op save.

use crate::id::ShapeId;
use crate::model::ShapeType;
use thiserror::Error;

/// Errors raised inside the shape core.
#[derive(Error, Debug)]
pub enum ShapeError {
    /// A JSON-encoded prop could not be decoded into the sheet model.
    #[error("malformed `{field}` payload: {source}")]
    MalformedPayload {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The host could not apply an update (shape missing or handle gone).
    #[error("update rejected for shape {0}")]
    UpdateFailure(ShapeId),

    /// A patch was addressed to a shape of a different type.
    #[error("shape {id} is not a {expected} shape")]
    TypeMismatch { id: ShapeId, expected: ShapeType },

    /// An unrecognized shape type tag.
    #[error("unknown shape type `{0}`")]
    UnknownShapeType(String),

    /// Configuration JSON could not be decoded.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[source] serde_json::Error),
}

/// Result type alias for shape operations.
pub type ShapeResult<T> = Result<T, ShapeError>;
