use thiserror::Error;

/// Rendering-context failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("rendering context unavailable: {0}")]
    Unavailable(String),
}

/// Render-graph construction failures. All are fatal for the request:
/// no raw stream is ever substituted as a fallback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("transform processor '{0}' is not registered")]
    TransformUnavailable(String),

    #[error("raw stream has no audio track")]
    MissingAudioTrack,
}

/// Acquisition failures surfaced to the consumer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AcquireError {
    /// The platform refused access. Surfaced verbatim; no retry.
    #[error("access denied")]
    Denied,

    /// The request context was torn down before acquisition completed.
    #[error("acquisition cancelled")]
    Cancelled,

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Build(#[from] BuildError),

    /// Any other platform-side acquisition failure.
    #[error("platform acquisition failed: {0}")]
    Platform(String),
}

/// Per-frame failures in the video path. Recovered locally by re-displaying
/// the previous frame; never fatal for the stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame processor rejected frame: {0}")]
    Rejected(String),

    #[error("malformed frame: {0}")]
    Malformed(String),
}
