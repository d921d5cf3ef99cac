use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::shared::constants::DEFAULT_JPEG_QUALITY;
use crate::shared::frame::Frame;
use crate::video::domain::frame_encoder::{EncodeError, FrameEncoder};

/// Baseline JPEG encoder for the MJPEG stream.
pub struct JpegFrameEncoder {
    quality: u8,
}

impl JpegFrameEncoder {
    /// `quality` is clamped to 1..=100.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegFrameEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl FrameEncoder for JpegFrameEncoder {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, EncodeError> {
        if frame.channels() != 3 {
            return Err(EncodeError::UnsupportedChannels(frame.channels()));
        }
        let expected = frame.width() as usize * frame.height() as usize * 3;
        if frame.data().len() != expected {
            return Err(EncodeError::BufferSize {
                width: frame.width(),
                height: frame.height(),
            });
        }

        let mut out = Vec::with_capacity(expected / 8);
        JpegEncoder::new_with_quality(&mut out, self.quality).encode(
            frame.data(),
            frame.width(),
            frame.height(),
            ExtendedColorType::Rgb8,
        )?;
        Ok(out)
    }

    fn content_type(&self) -> &'static str {
        "image/jpeg"
    }
}
