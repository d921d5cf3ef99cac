//! SSD face detector using ONNX Runtime via `ort`.
//!
//! Expects a single-input model whose first output is shaped
//! `[1, 1, N, 7]` (the layout of the OpenCV res10 face detector).
use std::path::Path;

use crate::detection::domain::detection_tensor::DetectionTensor;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::constants::DETECTION_RECORD_LEN;
use crate::shared::frame::Frame;

use super::blob_params::{blob_from_frame, BlobParams};

/// SSD face detector backed by an ONNX Runtime session.
pub struct OnnxSsdDetector {
    session: ort::session::Session,
    params: BlobParams,
}

impl OnnxSsdDetector {
    /// Load an SSD ONNX model. Failure here is fatal for the server.
    pub fn new(model_path: &Path, params: BlobParams) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;
        log::info!(
            "Loaded face model {} ({}x{} input)",
            model_path.display(),
            params.input_size,
            params.input_size
        );
        Ok(Self { session, params })
    }
}

impl FaceDetector for OnnxSsdDetector {
    fn infer(&mut self, frame: &Frame) -> Result<DetectionTensor, Box<dyn std::error::Error>> {
        let blob = blob_from_frame(frame, &self.params);

        let input_value = ort::value::Tensor::from_array(blob)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("SSD model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape();
        if shape.last() != Some(&DETECTION_RECORD_LEN) {
            return Err(format!("Unexpected SSD output shape: {shape:?}").into());
        }

        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;
        Ok(DetectionTensor::new(data.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_fails_to_load() {
        let result = OnnxSsdDetector::new(
            Path::new("/nonexistent/res10_300x300_ssd.onnx"),
            BlobParams::caffe(),
        );
        assert!(result.is_err());
    }
}
