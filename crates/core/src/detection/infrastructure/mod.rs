pub mod blob_params;
pub mod onnx_ssd_detector;
