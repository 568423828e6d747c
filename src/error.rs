use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A scene description that could not be turned into a `Space`.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to open scene file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("scene description is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("missing value: {field}")]
    Missing { field: String },

    #[error("value {field} has incorrect type, expected {expected}")]
    Mistyped { field: String, expected: &'static str },

    #[error("value {field} is invalid, {reason}")]
    Invalid { field: String, reason: String },
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// A render is in flight; the scene and the accumulation buffer are in use.
    #[error("a render is still in progress")]
    Busy,

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("failed to start a tracer thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("failed to export image to {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Two pixel buffers of different sizes cannot be merged.
#[derive(Debug, Error, PartialEq)]
#[error("surface is {actual:?}, expected {expected:?}")]
pub struct DimensionMismatch {
    pub expected: (usize, usize),
    pub actual: (usize, usize),
}
