//! # stream-veil-core
//!
//! Platform-agnostic media-stream interception core.
//!
//! Wraps a platform's media-acquisition entry point so that every audio
//! acquisition hands the consumer a scrambled substitute: raw microphone
//! samples are perturbed on the real-time path, the raw stream is revoked,
//! and sink bindings are rewritten so no path leads back to raw audio.
//! Platform backends implement the `MediaAcquisition` trait and plug into
//! the generic `AcquisitionInterceptor`.
//!
//! ## Architecture
//!
//! ```text
//! stream-veil-core (this crate)
//! ├── traits/       ← MediaAcquisition, AccessEventSink, PermissionStore, FrameProcessor
//! ├── models/       ← AccessConstraints, MediaStream/MediaTrack, VeilConfig, errors, events
//! ├── processing/   ← SampleScrambler, SampleRing, FramePump
//! └── session/      ← AudioSubsystem, RenderGraph, StreamRegistry,
//!                     AcquisitionInterceptor, SinkHost + SinkBindingGuard
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::{ScramblePolicy, VeilConfig};
pub use models::constraints::AccessConstraints;
pub use models::error::{AcquireError, BuildError, ContextError, FrameError};
pub use models::events::AccessEvent;
pub use models::frame::VideoFrame;
pub use models::state::ContextState;
pub use models::stream::{MediaStream, MediaTrack, SampleCallback, SharedStream, StreamId, TrackId, TrackKind};
pub use processing::frame_pump::FramePump;
pub use processing::ring_buffer::SampleRing;
pub use processing::scrambler::{BlockProcessor, NoiseSource, ProcessorFactory, SampleScrambler, ScramblerFactory};
pub use session::context::AudioSubsystem;
pub use session::graph::RenderGraph;
pub use session::interceptor::{AcquisitionInterceptor, CancelToken, CurrentStreamHandle};
pub use session::registry::StreamRegistry;
pub use session::sink::{AttachInterposer, AttachPath, AttachmentObserver, MediaSink, SinkBindingGuard, SinkHost, SinkId};
pub use traits::access_events::AccessEventSink;
pub use traits::frame_processor::FrameProcessor;
pub use traits::media_acquisition::MediaAcquisition;
pub use traits::permission_store::{PermissionState, PermissionStore, CAP_CAMERA, CAP_MICROPHONE};
