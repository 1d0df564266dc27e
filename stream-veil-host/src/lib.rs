//! # stream-veil-host
//!
//! Portable in-process host backend for stream-veil.
//!
//! Provides:
//! - `HostAcquisition` — `MediaAcquisition` over synthetic devices, gated by
//!   the permission store
//! - `ToneMicrophone` — deterministic capture device on a dedicated thread
//! - `MemoryPermissionStore` — process-local consent store
//! - `LogEventSink` / `ChannelEventSink` — access-event bridges
//! - `PixelateProcessor` — local `FrameProcessor` for the video path
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use stream_veil_core::{
//!     AccessConstraints, AcquisitionInterceptor, AudioSubsystem, MediaAcquisition,
//!     SinkBindingGuard, SinkHost, StreamRegistry, VeilConfig,
//! };
//! use stream_veil_host::{HostAcquisition, MemoryPermissionStore, PromptPolicy};
//!
//! let permissions = Arc::new(MemoryPermissionStore::new());
//! let platform = HostAcquisition::new(permissions, PromptPolicy::Grant);
//!
//! let subsystem = AudioSubsystem::new(VeilConfig::default());
//! subsystem.install_default_processor();
//! let registry = StreamRegistry::new();
//! let interceptor = AcquisitionInterceptor::new(platform, subsystem.clone(), registry.clone());
//!
//! let host = SinkHost::new();
//! SinkBindingGuard::new(interceptor.current_stream_handle()).install(&host);
//!
//! subsystem.notify_user_gesture(); // from a real input event
//! let stream = interceptor.acquire(&AccessConstraints::audio())?;
//! ```

pub mod acquisition;
pub mod device;
pub mod events;
pub mod frame;
pub mod permissions;

pub use acquisition::{HostAcquisition, PromptPolicy};
pub use device::{DeviceError, ToneMicrophone};
pub use events::{ChannelEventSink, LogEventSink};
pub use frame::PixelateProcessor;
pub use permissions::MemoryPermissionStore;
