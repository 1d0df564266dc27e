use std::sync::Arc;

use crate::models::frame::VideoFrame;
use crate::traits::frame_processor::FrameProcessor;

/// Drives per-frame degradation for the video path.
///
/// Each captured frame goes through the processor; on failure the last
/// successfully processed frame is re-displayed and the next frame is tried
/// fresh. A failure therefore never propagates past one frame.
pub struct FramePump {
    processor: Arc<dyn FrameProcessor>,
    last_good: Option<VideoFrame>,
    processed: u64,
    failed: u64,
}

impl FramePump {
    pub fn new(processor: Arc<dyn FrameProcessor>) -> Self {
        Self {
            processor,
            last_good: None,
            processed: 0,
            failed: 0,
        }
    }

    /// Process one frame; returns the frame to display.
    ///
    /// `None` only while no frame has ever been processed successfully —
    /// the caller skips display for that tick.
    pub fn pump(&mut self, frame: &VideoFrame) -> Option<VideoFrame> {
        match self.processor.process(frame) {
            Ok(processed) => {
                self.processed += 1;
                self.last_good = Some(processed.clone());
                Some(processed)
            }
            Err(err) => {
                self.failed += 1;
                log::warn!("frame processing failed, re-displaying previous frame: {err}");
                self.last_good.clone()
            }
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::error::FrameError;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Inverts every byte; fails on demand.
    struct FlakyProcessor {
        fail: AtomicBool,
    }

    impl FrameProcessor for FlakyProcessor {
        fn process(&self, frame: &VideoFrame) -> Result<VideoFrame, FrameError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(FrameError::Rejected("simulated".into()));
            }
            let mut out = frame.clone();
            for byte in &mut out.data {
                *byte = !*byte;
            }
            Ok(out)
        }
    }

    #[test]
    fn failure_redisplay_previous_frame() {
        let processor = Arc::new(FlakyProcessor {
            fail: AtomicBool::new(false),
        });
        let mut pump = FramePump::new(Arc::clone(&processor) as Arc<dyn FrameProcessor>);

        let first = VideoFrame::solid(2, 2, [10, 10, 10, 255]);
        let shown_first = pump.pump(&first).unwrap();

        processor.fail.store(true, Ordering::SeqCst);
        let second = VideoFrame::solid(2, 2, [20, 20, 20, 255]);
        let shown_second = pump.pump(&second).unwrap();

        assert_eq!(shown_second, shown_first);
        assert_eq!(pump.processed(), 1);
        assert_eq!(pump.failed(), 1);

        // Recovery on the next frame.
        processor.fail.store(false, Ordering::SeqCst);
        let third = VideoFrame::solid(2, 2, [30, 30, 30, 255]);
        let shown_third = pump.pump(&third).unwrap();
        assert_ne!(shown_third, shown_first);
        assert_eq!(pump.processed(), 2);
    }

    #[test]
    fn no_frame_until_first_success() {
        let processor = Arc::new(FlakyProcessor {
            fail: AtomicBool::new(true),
        });
        let mut pump = FramePump::new(processor as Arc<dyn FrameProcessor>);

        let frame = VideoFrame::solid(1, 1, [0, 0, 0, 255]);
        assert!(pump.pump(&frame).is_none());
        assert_eq!(pump.failed(), 1);
    }
}
