use crate::shared::constants::DETECTION_RECORD_LEN;

/// Raw SSD detector output flattened to `N × 7` floats.
///
/// Each record is `[batch_id, class_id, confidence, left, top, right, bottom]`
/// with box coordinates normalized to `[0, 1]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectionTensor {
    data: Vec<f32>,
}

/// One row of a [`DetectionTensor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawDetection {
    pub batch_id: f32,
    pub class_id: f32,
    pub confidence: f32,
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl DetectionTensor {
    /// Wraps flattened detector output. A trailing partial record is ignored.
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    pub fn from_records(records: &[RawDetection]) -> Self {
        let data = records
            .iter()
            .flat_map(|r| {
                [
                    r.batch_id,
                    r.class_id,
                    r.confidence,
                    r.left,
                    r.top,
                    r.right,
                    r.bottom,
                ]
            })
            .collect();
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len() / DETECTION_RECORD_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records(&self) -> impl Iterator<Item = RawDetection> + '_ {
        self.data
            .chunks_exact(DETECTION_RECORD_LEN)
            .map(|row| RawDetection {
                batch_id: row[0],
                class_id: row[1],
                confidence: row[2],
                left: row[3],
                top: row[4],
                right: row[5],
                bottom: row[6],
            })
    }
}
