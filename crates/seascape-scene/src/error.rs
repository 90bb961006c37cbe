//! Error types for the scene core.

use std::path::PathBuf;

use crate::panel::{ControlKind, ParamField};

/// Errors raised by scene mutations and event dispatch.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// A panel edit carried a value of the wrong kind for its field.
    #[error("field `{}` expects a {expected:?} value", .field.key())]
    ValueKind {
        field: ParamField,
        expected: ControlKind,
    },

    /// A panel edit named a field the panel does not bind.
    #[error("unknown panel field `{0}`")]
    UnknownField(String),
}

/// Reasons an asset load can fail. Reported once through the loader's error
/// callback; a failed load is never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    /// The resource could not be opened or read.
    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// The resource exists but holds no data.
    #[error("{path} is empty")]
    Empty { path: PathBuf },

    /// The worker delivering the resource went away before completing.
    #[error("loader for {path} stopped before completing")]
    Abandoned { path: PathBuf },
}

/// Errors a [`Renderer`](crate::Renderer) may report for a single frame.
///
/// All of them are frame-local: the render loop logs them and keeps running.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The presentation surface was lost and could not be recovered this frame.
    #[error("surface lost")]
    SurfaceLost,

    /// The GPU ran out of memory.
    #[error("out of memory")]
    OutOfMemory,

    /// Acquiring the next frame timed out; the frame is skipped.
    #[error("timeout")]
    Timeout,

    /// The renderer has no surface yet.
    #[error("renderer not ready")]
    NotReady,
}
