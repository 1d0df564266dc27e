use crate::models::error::FrameError;

/// One decoded video frame, interleaved RGBA8.
///
/// Frames cross the `FrameProcessor` seam decoded, which keeps the core
/// independent of any particular image encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl VideoFrame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(FrameError::Malformed(format!(
                "expected {expected} bytes for {width}x{height} RGBA, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A solid-color frame; useful for tests and placeholders.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(VideoFrame::new(2, 2, vec![0; 15]).is_err());
        assert!(VideoFrame::new(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn solid_fills_every_pixel() {
        let frame = VideoFrame::solid(3, 2, [1, 2, 3, 255]);
        assert_eq!(frame.data.len(), 24);
        assert_eq!(&frame.data[4..8], &[1, 2, 3, 255]);
    }
}
