use crate::models::error::FrameError;
use crate::models::frame::VideoFrame;

/// Degrades a single video frame.
///
/// The default host implements this locally; an off-device service (e.g. an
/// HTTP endpoint that blurs faces) is another implementation of the same
/// trait. Either way a failure is a per-frame failure: the pump re-displays
/// the previous frame and retries on the next one.
pub trait FrameProcessor: Send + Sync {
    fn process(&self, frame: &VideoFrame) -> Result<VideoFrame, FrameError>;
}
