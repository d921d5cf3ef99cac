use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("unsupported capture format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to open {device}: {reason}")]
    Open { device: String, reason: String },
    #[error("{device} has no video stream")]
    NoVideoStream { device: String },
    #[error("device read failed: {0}")]
    Read(String),
    #[error("device is closed")]
    Closed,
}

/// An open physical video source.
///
/// Owned by exactly one capture loop at a time.
pub trait CaptureDevice: Send {
    /// Blocks for the next frame.
    ///
    /// `Ok(None)` means no frame was available this time and the caller
    /// should simply try again; `Err` means the device is unusable.
    fn read_frame(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Releases the device. Idempotent.
    fn close(&mut self);
}

/// Opens capture devices by numeric id.
pub trait DeviceOpener: Send + Sync {
    fn open(&self, device_id: u32) -> Result<Box<dyn CaptureDevice>, CaptureError>;
}
