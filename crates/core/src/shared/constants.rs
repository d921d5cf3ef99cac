/// Minimum detector confidence (exclusive) for a record to count as a face.
pub const DETECTION_CONFIDENCE_THRESHOLD: f32 = 0.8;

/// Minimum similarity (exclusive) for a gallery entry to name a face.
pub const MATCH_SIMILARITY_THRESHOLD: f64 = 0.6;

/// Fields per detection record: batch, class, confidence, left, top, right, bottom.
pub const DETECTION_RECORD_LEN: usize = 7;

/// Square input resolution of the SSD face model.
pub const DETECTOR_INPUT_SIZE: u32 = 300;

pub const BOX_COLOR: [u8; 3] = [0, 255, 0];
pub const BOX_STROKE: u32 = 2;
pub const LABEL_COLOR: [u8; 3] = [0, 0, 0];
/// Each font pixel is drawn as a `LABEL_SCALE` × `LABEL_SCALE` block.
pub const LABEL_SCALE: u32 = 2;

pub const DEFAULT_JPEG_QUALITY: u8 = 80;
