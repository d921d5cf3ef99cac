use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("frame has {0} channels, expected 3")]
    UnsupportedChannels(u8),
    #[error("frame buffer does not match {width}x{height}")]
    BufferSize { width: u32, height: u32 },
    #[error("encoding failed: {0}")]
    Codec(#[from] image::ImageError),
}

/// Compresses an annotated frame for transmission.
pub trait FrameEncoder: Send + Sync {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, EncodeError>;

    /// MIME type of the encoded payload.
    fn content_type(&self) -> &'static str;
}
