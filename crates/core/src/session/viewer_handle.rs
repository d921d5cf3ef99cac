use std::sync::Arc;

use tokio::sync::watch;

use crate::session::capture_session::CaptureSession;
use crate::session::frame_broadcaster::EncodedFrame;

/// One viewer's claim on a capture session.
///
/// Holding the handle keeps the device open; dropping it gives the viewer
/// slot back. A handle outliving its session generation (the device failed
/// and was reopened since) releases nothing on drop.
pub struct ViewerHandle {
    session: Arc<CaptureSession>,
    generation: u64,
    frames: watch::Receiver<Option<EncodedFrame>>,
    released: bool,
}

impl ViewerHandle {
    pub(crate) fn new(
        session: Arc<CaptureSession>,
        generation: u64,
        frames: watch::Receiver<Option<EncodedFrame>>,
    ) -> Self {
        Self {
            session,
            generation,
            frames,
            released: false,
        }
    }

    pub fn device_id(&self) -> u32 {
        self.session.device_id()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Waits for the next published frame.
    ///
    /// Returns `None` once the session stops capturing.
    pub async fn next_frame(&mut self) -> Option<EncodedFrame> {
        loop {
            self.frames.changed().await.ok()?;
            if let Some(frame) = self.frames.borrow_and_update().clone() {
                return Some(frame);
            }
        }
    }

    /// Gives the viewer slot back now instead of on drop.
    ///
    /// Returns whether the session's viewer count changed.
    pub fn release(mut self) -> bool {
        self.released = true;
        self.session.release_generation(self.generation)
    }
}

impl Drop for ViewerHandle {
    fn drop(&mut self) {
        if !self.released {
            self.session.release_generation(self.generation);
        }
    }
}
