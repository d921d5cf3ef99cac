use std::sync::Arc;

use tokio::sync::watch;

/// One compressed frame as sent to viewers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedFrame {
    /// Position in the session's output stream, starting at 0.
    pub sequence: u64,
    pub data: Arc<[u8]>,
}

/// Latest-value fan-out from a capture loop to its viewers.
///
/// Publishing replaces the current frame instead of queueing, so a slow
/// viewer skips frames rather than holding up capture. Dropping the
/// broadcaster ends every subscriber's stream.
pub struct FrameBroadcaster {
    sender: watch::Sender<Option<EncodedFrame>>,
}

impl FrameBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    pub fn publish(&self, frame: EncodedFrame) {
        self.sender.send_replace(Some(frame));
    }

    /// Receiver that observes frames published after this call only.
    pub fn subscribe(&self) -> watch::Receiver<Option<EncodedFrame>> {
        self.sender.subscribe()
    }
}

impl Default for FrameBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
