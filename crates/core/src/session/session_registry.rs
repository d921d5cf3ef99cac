use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::session::capture_session::{CaptureSession, SessionError, SessionServices};
use crate::session::viewer_handle::ViewerHandle;

/// Owns one [`CaptureSession`] per device id, created on first use.
///
/// Sessions are never removed; an idle session holds no device.
pub struct SessionRegistry {
    services: SessionServices,
    sessions: Mutex<HashMap<u32, Arc<CaptureSession>>>,
}

impl SessionRegistry {
    pub fn new(services: SessionServices) -> Self {
        Self {
            services,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn session(&self, device_id: u32) -> Arc<CaptureSession> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            sessions
                .entry(device_id)
                .or_insert_with(|| Arc::new(CaptureSession::new(device_id, self.services.clone()))),
        )
    }

    /// Joins the viewers of `device_id`, opening it if nobody is watching.
    pub fn acquire(&self, device_id: u32) -> Result<ViewerHandle, SessionError> {
        self.session(device_id).acquire()
    }

    /// Ids of the sessions currently capturing, ascending.
    pub fn active_devices(&self) -> Vec<u32> {
        let sessions: Vec<Arc<CaptureSession>> = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        let mut ids: Vec<u32> = sessions
            .iter()
            .filter(|s| s.is_capturing())
            .map(|s| s.device_id())
            .collect();
        ids.sort_unstable();
        ids
    }
}
