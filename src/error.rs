//! Error types for scene building
//!
//! Every fallible operation in the crate returns `Result<T, SceneError>`.
//! Clipped-away rings and points without a mesh reference are not errors;
//! they are dropped with a debug log line instead.

use thiserror::Error;

/// Errors that abort a scene build
#[derive(Debug, Error)]
pub enum SceneError {
    /// A feature carried a geometry that is not a polygon, line or point
    #[error("Unsupported geometry kind: {kind}")]
    UnsupportedGeometryKind { kind: String },

    /// Input coordinates could not be interpreted
    #[error("Invalid geometry: {message}")]
    InvalidGeometry { message: String },

    /// The requested output format name is unknown
    #[error("Unsupported output format: {name}")]
    UnsupportedFormat { name: String },

    /// Writing to the output sink failed
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration document could not be decoded
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A scene document could not be read back
    #[error("Scene parse error: {message}")]
    SceneParse { message: String },
}

impl SceneError {
    /// Creates an unsupported geometry kind error.
    pub fn unsupported_kind(kind: impl Into<String>) -> Self {
        Self::UnsupportedGeometryKind { kind: kind.into() }
    }

    /// Creates an invalid geometry error.
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }

    /// Creates a scene parse error.
    pub fn scene_parse(message: impl Into<String>) -> Self {
        Self::SceneParse {
            message: message.into(),
        }
    }
}

impl From<quick_xml::Error> for SceneError {
    fn from(err: quick_xml::Error) -> Self {
        Self::scene_parse(err.to_string())
    }
}
