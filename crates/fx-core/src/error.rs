//! Error taxonomy for the effect runtime.
//!
//! Construction and start failures propagate to the host. Per-frame problems
//! are reported as [`FrameError`] to the controller, which logs them and keeps
//! the host's frame loop alive.

use thiserror::Error;

/// An option value that cannot be honoured. Raised at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{field}` must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
    #[error("`{field}` must be a finite number")]
    NotFinite { field: &'static str },
    #[error("palette must hold between 1 and {max} colors, got {len}")]
    Palette { len: usize, max: usize },
    #[error("invalid options: {0}")]
    Parse(String),
}

/// GPU context, surface or shader bring-up failed. Not recoverable for the
/// instance that hit it; the host should skip the effect.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    #[error("no compatible GPU adapter")]
    NoAdapter,
    #[error("surface creation failed: {0}")]
    Surface(String),
    #[error("device request failed: {0}")]
    Device(String),
    #[error("shader `{name}` failed to build: {reason}")]
    Shader { name: &'static str, reason: String },
    #[error("start abandoned: effect disposed while resources were loading")]
    Abandoned,
}

/// A frame that could not be presented. Tolerated; never reaches the host.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("surface lost or outdated")]
    SurfaceLost,
    #[error("surface acquire timed out")]
    Timeout,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by the lifecycle façade.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FxError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error("effect has been disposed")]
    Disposed,
    #[error("effect is not started yet")]
    NotReady,
    #[error("effect was already started")]
    AlreadyStarted,
    #[error("canvas `{0}` is already bound to a live effect")]
    AlreadyBound(String),
}

pub type FxResult<T> = Result<T, FxError>;
