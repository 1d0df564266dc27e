use serde::{Deserialize, Serialize};

/// What a consumer is asking for in one acquisition request.
///
/// Immutable input to a single call; there is no device selection here —
/// the platform backend resolves capabilities to concrete devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessConstraints {
    pub wants_audio: bool,
    pub wants_video: bool,
}

impl AccessConstraints {
    /// Microphone only.
    pub fn audio() -> Self {
        Self {
            wants_audio: true,
            wants_video: false,
        }
    }

    /// Camera only.
    pub fn video() -> Self {
        Self {
            wants_audio: false,
            wants_video: true,
        }
    }

    /// Microphone and camera.
    pub fn audio_video() -> Self {
        Self {
            wants_audio: true,
            wants_video: true,
        }
    }

    /// Neither capability. The platform rejects such requests; kept so
    /// callers can express it and get the platform's own error back.
    pub fn none() -> Self {
        Self {
            wants_audio: false,
            wants_video: false,
        }
    }
}
