use crate::detection::domain::detection_tensor::DetectionTensor;
use crate::shared::frame::Frame;

/// Domain interface for the face detection model.
///
/// Implementations own the inference session, which needs exclusive
/// access while running, hence `&mut self`.
pub trait FaceDetector: Send {
    fn infer(&mut self, frame: &Frame) -> Result<DetectionTensor, Box<dyn std::error::Error>>;
}
