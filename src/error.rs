//! Crate-wide error type.

use thiserror::Error;

/// Errors produced while loading, building, or serializing a scene.
///
/// Geometric queries never error; degenerate inputs produce conservative
/// negative answers (`None`, `false`) instead.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The document was not valid JSON or did not match the scene schema.
    #[error("malformed scene document: {0}")]
    Document(#[from] serde_json::Error),

    /// A semantic classification string is not part of the known label set.
    #[error("unknown semantic label `{0}`")]
    UnknownLabel(String),

    /// An anchor or room UUID could not be parsed.
    #[error("invalid uuid `{value}`: {source}")]
    InvalidUuid {
        value: String,
        source: uuid::Error,
    },

    /// An anchor was declared with no plane, volume, or mesh geometry.
    #[error("anchor `{0}` has no geometry")]
    EmptyAnchor(String),

    /// A template room did not form a closed wall loop.
    #[error("template walls do not form a closed loop ({0} walls)")]
    OpenWallLoop(usize),
}

pub type Result<T> = std::result::Result<T, SceneError>;
