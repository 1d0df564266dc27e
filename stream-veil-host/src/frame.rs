//! Local video-frame degradation.

use stream_veil_core::{FrameError, FrameProcessor, VideoFrame};

/// Block-averaging pixelation over RGBA frames.
///
/// Every `block` × `block` tile is replaced by its average color, which
/// removes identifying detail while keeping the frame displayable.
#[derive(Debug, Clone, Copy)]
pub struct PixelateProcessor {
    block: usize,
}

impl PixelateProcessor {
    pub fn new(block: usize) -> Self {
        Self {
            block: block.max(1),
        }
    }
}

impl Default for PixelateProcessor {
    fn default() -> Self {
        Self::new(16)
    }
}

impl FrameProcessor for PixelateProcessor {
    fn process(&self, frame: &VideoFrame) -> Result<VideoFrame, FrameError> {
        let width = frame.width as usize;
        let height = frame.height as usize;
        if frame.data.len() != width * height * 4 {
            return Err(FrameError::Malformed(format!(
                "buffer of {} bytes does not match {}x{} RGBA",
                frame.data.len(),
                frame.width,
                frame.height
            )));
        }

        let mut out = frame.data.clone();
        for tile_y in (0..height).step_by(self.block) {
            for tile_x in (0..width).step_by(self.block) {
                let y_end = (tile_y + self.block).min(height);
                let x_end = (tile_x + self.block).min(width);

                let mut sums = [0u64; 4];
                let mut count = 0u64;
                for y in tile_y..y_end {
                    for x in tile_x..x_end {
                        let offset = (y * width + x) * 4;
                        for channel in 0..4 {
                            sums[channel] += u64::from(frame.data[offset + channel]);
                        }
                        count += 1;
                    }
                }

                let average = [
                    (sums[0] / count) as u8,
                    (sums[1] / count) as u8,
                    (sums[2] / count) as u8,
                    (sums[3] / count) as u8,
                ];
                for y in tile_y..y_end {
                    for x in tile_x..x_end {
                        let offset = (y * width + x) * 4;
                        out[offset..offset + 4].copy_from_slice(&average);
                    }
                }
            }
        }

        Ok(VideoFrame {
            width: frame.width,
            height: frame.height,
            data: out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stream_veil_core::FramePump;

    #[test]
    fn pump_over_pixelation_degrades_frames() {
        let mut pump = FramePump::new(Arc::new(PixelateProcessor::new(2)));

        let mut data = Vec::new();
        data.extend_from_slice(&[0, 0, 0, 255]);
        data.extend_from_slice(&[200, 200, 200, 255]);
        let frame = VideoFrame::new(2, 1, data).unwrap();

        let shown = pump.pump(&frame).unwrap();
        assert_ne!(shown.data, frame.data);
        for pixel in shown.data.chunks(4) {
            assert_eq!(pixel, &[100, 100, 100, 255]);
        }
        assert_eq!(pump.processed(), 1);
    }

    #[test]
    fn solid_frames_are_unchanged() {
        let frame = VideoFrame::solid(8, 8, [100, 150, 200, 255]);
        let out = PixelateProcessor::new(4).process(&frame).unwrap();
        assert_eq!(out, frame);
    }

    #[test]
    fn tiles_collapse_to_their_average() {
        // 2x2 frame, one 2x2 tile: half black, half white.
        let mut data = Vec::new();
        data.extend_from_slice(&[0, 0, 0, 255]);
        data.extend_from_slice(&[0, 0, 0, 255]);
        data.extend_from_slice(&[200, 200, 200, 255]);
        data.extend_from_slice(&[200, 200, 200, 255]);
        let frame = VideoFrame::new(2, 2, data).unwrap();

        let out = PixelateProcessor::new(2).process(&frame).unwrap();
        for pixel in out.data.chunks(4) {
            assert_eq!(pixel, &[100, 100, 100, 255]);
        }
    }

    #[test]
    fn uneven_edges_are_still_covered() {
        let frame = VideoFrame::solid(5, 3, [10, 20, 30, 255]);
        let out = PixelateProcessor::new(2).process(&frame).unwrap();
        assert_eq!(out.data.len(), frame.data.len());
        assert_eq!(out, frame);
    }

    #[test]
    fn rejects_malformed_buffers() {
        let frame = VideoFrame {
            width: 4,
            height: 4,
            data: vec![0; 10],
        };
        assert!(matches!(
            PixelateProcessor::default().process(&frame),
            Err(FrameError::Malformed(_))
        ));
    }
}
