use crate::shared::frame::Frame;

/// Turns a raw captured frame into the frame viewers see.
///
/// Shared by every capture session; implementations may hold exclusive
/// resources such as an inference session.
pub trait FrameProcessor: Send {
    fn process(&mut self, frame: Frame) -> Result<Frame, Box<dyn std::error::Error>>;
}
