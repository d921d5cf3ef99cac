use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::capture::domain::capture_device::{CaptureDevice, CaptureError, DeviceOpener};
use crate::pipeline::frame_processor::FrameProcessor;
use crate::session::frame_broadcaster::{EncodedFrame, FrameBroadcaster};
use crate::session::viewer_handle::ViewerHandle;
use crate::shared::frame::Frame;
use crate::video::domain::frame_encoder::FrameEncoder;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("device {device_id}: {source}")]
    Open {
        device_id: u32,
        #[source]
        source: CaptureError,
    },
    #[error("device {device_id}: failed to start capture thread: {source}")]
    Spawn {
        device_id: u32,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a capture loop needs besides its device.
#[derive(Clone)]
pub struct SessionServices {
    pub opener: Arc<dyn DeviceOpener>,
    pub processor: Arc<Mutex<dyn FrameProcessor>>,
    pub encoder: Arc<dyn FrameEncoder>,
}

struct SessionState {
    viewers: usize,
    running: bool,
    /// Bumped on every successful device open.
    generation: u64,
    broadcaster: Option<Arc<FrameBroadcaster>>,
}

/// Shared access to one capture device.
///
/// The device is open exactly while at least one viewer holds a
/// [`ViewerHandle`] (plus the short tail until the capture loop notices the
/// last one left). All state transitions happen under `state`; the capture
/// loop only reads the `viewers` mirror between frames.
pub struct CaptureSession {
    device_id: u32,
    services: SessionServices,
    state: Mutex<SessionState>,
    viewers: AtomicUsize,
    idle: Condvar,
}

impl CaptureSession {
    pub fn new(device_id: u32, services: SessionServices) -> Self {
        Self {
            device_id,
            services,
            state: Mutex::new(SessionState {
                viewers: 0,
                running: false,
                generation: 0,
                broadcaster: None,
            }),
            viewers: AtomicUsize::new(0),
            idle: Condvar::new(),
        }
    }

    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    pub fn viewer_count(&self) -> usize {
        self.lock_state().viewers
    }

    pub fn is_capturing(&self) -> bool {
        self.lock_state().running
    }

    /// Registers a viewer, opening the device and starting the capture loop
    /// if the session is idle.
    ///
    /// Blocks while the device opens. On failure nothing changes: the viewer
    /// count stays as it was and no loop is started.
    pub fn acquire(self: &Arc<Self>) -> Result<ViewerHandle, SessionError> {
        let mut state = self.lock_state();

        if state.running {
            if let Some(broadcaster) = &state.broadcaster {
                let frames = broadcaster.subscribe();
                state.viewers += 1;
                self.viewers.store(state.viewers, Ordering::Release);
                log::debug!("Device {}: {} viewer(s)", self.device_id, state.viewers);
                return Ok(ViewerHandle::new(Arc::clone(self), state.generation, frames));
            }
        }

        let device = self
            .services
            .opener
            .open(self.device_id)
            .map_err(|source| SessionError::Open {
                device_id: self.device_id,
                source,
            })?;

        let broadcaster = Arc::new(FrameBroadcaster::new());
        let frames = broadcaster.subscribe();
        let generation = state.generation + 1;

        let session = Arc::clone(self);
        let loop_broadcaster = Arc::clone(&broadcaster);
        thread::Builder::new()
            .name(format!("capture-{}", self.device_id))
            .spawn(move || session.run_capture_loop(device, loop_broadcaster))
            .map_err(|source| SessionError::Spawn {
                device_id: self.device_id,
                source,
            })?;

        state.generation = generation;
        state.viewers = 1;
        state.running = true;
        state.broadcaster = Some(broadcaster);
        self.viewers.store(1, Ordering::Release);
        log::info!(
            "Device {}: capture started (generation {generation})",
            self.device_id
        );

        Ok(ViewerHandle::new(Arc::clone(self), generation, frames))
    }

    /// Gives back the viewer slot of a handle issued for `generation`.
    ///
    /// Stale generations are ignored. Releasing with no viewers is a logged
    /// no-op that returns `false`.
    pub(crate) fn release_generation(&self, generation: u64) -> bool {
        let mut state = self.lock_state();
        if state.generation != generation || !state.running {
            log::debug!(
                "Device {}: ignoring release from stale generation {generation}",
                self.device_id
            );
            return false;
        }
        self.decrement(&mut state)
    }

    /// Blocks until the capture loop has closed the device, or `timeout`
    /// elapses. Returns whether the session is idle.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        let state = self.lock_state();
        let (state, _) = self
            .idle
            .wait_timeout_while(state, timeout, |s| s.running)
            .unwrap_or_else(PoisonError::into_inner);
        !state.running
    }

    fn decrement(&self, state: &mut SessionState) -> bool {
        if state.viewers == 0 {
            log::warn!("Device {}: release with no viewers ignored", self.device_id);
            return false;
        }
        state.viewers -= 1;
        self.viewers.store(state.viewers, Ordering::Release);
        log::debug!("Device {}: {} viewer(s)", self.device_id, state.viewers);
        true
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_capture_loop(
        self: Arc<Self>,
        mut device: Box<dyn CaptureDevice>,
        broadcaster: Arc<FrameBroadcaster>,
    ) {
        let mut sequence = 0u64;
        loop {
            if self.viewers.load(Ordering::Acquire) == 0 && self.stop_if_unwatched(&mut *device) {
                return;
            }

            match device.read_frame() {
                Ok(None) => continue,
                Ok(Some(frame)) => {
                    if let Some(data) = self.render(frame) {
                        broadcaster.publish(EncodedFrame {
                            sequence,
                            data: data.into(),
                        });
                        sequence += 1;
                    }
                }
                Err(e) => {
                    log::error!("Device {}: capture failed: {e}", self.device_id);
                    let mut state = self.lock_state();
                    device.close();
                    state.viewers = 0;
                    self.viewers.store(0, Ordering::Release);
                    self.finish(state);
                    return;
                }
            }
        }
    }

    /// Closes the device if the count is still zero under the lock. A viewer
    /// that arrived in the meantime keeps the loop alive.
    fn stop_if_unwatched(&self, device: &mut dyn CaptureDevice) -> bool {
        let state = self.lock_state();
        if state.viewers > 0 {
            return false;
        }
        device.close();
        self.finish(state);
        true
    }

    fn finish(&self, mut state: MutexGuard<'_, SessionState>) {
        state.running = false;
        state.broadcaster = None;
        let generation = state.generation;
        drop(state);
        self.idle.notify_all();
        log::info!(
            "Device {}: capture stopped (generation {generation})",
            self.device_id
        );
    }

    /// Processes and encodes one frame. Failures drop the frame.
    fn render(&self, frame: Frame) -> Option<Vec<u8>> {
        let index = frame.index();
        let processed = {
            let mut processor = self
                .services
                .processor
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            processor.process(frame)
        };
        let processed = match processed {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Device {}: dropping frame {index}: {e}", self.device_id);
                return None;
            }
        };
        match self.services.encoder.encode(&processed) {
            Ok(data) => Some(data),
            Err(e) => {
                log::warn!("Device {}: dropping frame {index}: {e}", self.device_id);
                None
            }
        }
    }
}
