use thiserror::Error;

use crate::detection::domain::detection_parser::{best_detection, parse_detections, Detection};
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::constants::DETECTION_CONFIDENCE_THRESHOLD;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no face found")]
    NoFaceFound,
    #[error("face detection failed: {0}")]
    Detection(#[source] Box<dyn std::error::Error>),
}

/// Runs the detector and turns its raw output into in-frame face boxes.
pub struct FaceLocator {
    detector: Box<dyn FaceDetector>,
    threshold: f32,
}

impl FaceLocator {
    pub fn new(detector: Box<dyn FaceDetector>) -> Self {
        Self {
            detector,
            threshold: DETECTION_CONFIDENCE_THRESHOLD,
        }
    }

    /// All faces above the confidence threshold, in detector order.
    pub fn locate(&mut self, frame: &Frame) -> Result<Vec<Detection>, PipelineError> {
        let tensor = self
            .detector
            .infer(frame)
            .map_err(PipelineError::Detection)?;
        Ok(parse_detections(
            &tensor,
            frame.width(),
            frame.height(),
            self.threshold,
        ))
    }

    /// Crops the most confident face out of `frame`.
    pub fn extract_face(&mut self, frame: &Frame) -> Result<Frame, PipelineError> {
        let detections = self.locate(frame)?;
        let best = best_detection(&detections).ok_or(PipelineError::NoFaceFound)?;
        frame.crop(&best.rect).ok_or(PipelineError::NoFaceFound)
    }
}
