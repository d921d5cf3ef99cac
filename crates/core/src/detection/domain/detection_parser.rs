use crate::detection::domain::detection_tensor::DetectionTensor;
use crate::shared::rect::Rect;

/// A detector record that passed the confidence threshold and maps to a
/// valid in-frame rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub confidence: f32,
    pub rect: Rect,
}

/// Turns raw detector output into pixel-space detections.
///
/// Keeps records whose confidence is strictly above `threshold`, scales them
/// to a `frame_w` × `frame_h` frame, and drops records whose rectangle is
/// degenerate or leaves the frame. Output preserves tensor order.
pub fn parse_detections(
    tensor: &DetectionTensor,
    frame_w: u32,
    frame_h: u32,
    threshold: f32,
) -> Vec<Detection> {
    tensor
        .records()
        .filter(|r| r.confidence > threshold)
        .filter_map(|r| {
            let rect = Rect::from_normalized(r.left, r.top, r.right, r.bottom, frame_w, frame_h)?;
            Some(Detection {
                confidence: r.confidence,
                rect,
            })
        })
        .collect()
}

/// Highest-confidence detection, first one wins on ties.
pub fn best_detection(detections: &[Detection]) -> Option<Detection> {
    detections.iter().copied().fold(None, |best, d| match best {
        Some(b) if b.confidence >= d.confidence => Some(b),
        _ => Some(d),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detection_tensor::RawDetection;
    use crate::shared::constants::DETECTION_CONFIDENCE_THRESHOLD;
    use rstest::rstest;

    fn record(confidence: f32, left: f32, top: f32, right: f32, bottom: f32) -> RawDetection {
        RawDetection {
            batch_id: 0.0,
            class_id: 1.0,
            confidence,
            left,
            top,
            right,
            bottom,
        }
    }

    fn parse(records: &[RawDetection], w: u32, h: u32) -> Vec<Detection> {
        parse_detections(
            &DetectionTensor::from_records(records),
            w,
            h,
            DETECTION_CONFIDENCE_THRESHOLD,
        )
    }

    #[test]
    fn test_confident_record_scaled_to_pixels() {
        let dets = parse(&[record(0.95, 0.1, 0.1, 0.5, 0.5)], 300, 300);
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].rect, Rect::new(30, 30, 150, 150));
        assert_eq!(dets[0].confidence, 0.95);
    }

    #[rstest]
    #[case::low(0.5)]
    #[case::at_threshold(0.8)]
    #[case::nan(f32::NAN)]
    fn test_records_not_above_threshold_dropped(#[case] confidence: f32) {
        let dets = parse(&[record(confidence, 0.1, 0.1, 0.5, 0.5)], 300, 300);
        assert!(dets.is_empty());
    }

    #[test]
    fn test_out_of_bounds_record_dropped() {
        let dets = parse(
            &[
                record(0.9, 0.6, 0.6, 1.3, 0.9),
                record(0.9, 0.1, 0.1, 0.2, 0.2),
            ],
            300,
            300,
        );
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].rect, Rect::new(30, 30, 60, 60));
    }

    #[test]
    fn test_degenerate_record_dropped() {
        let dets = parse(&[record(0.99, 0.4, 0.4, 0.4, 0.6)], 300, 300);
        assert!(dets.is_empty());
    }

    #[test]
    fn test_empty_tensor_yields_nothing() {
        assert!(parse(&[], 640, 480).is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let dets = parse(
            &[
                record(0.85, 0.0, 0.0, 0.1, 0.1),
                record(0.99, 0.5, 0.5, 0.6, 0.6),
            ],
            100,
            100,
        );
        assert_eq!(dets[0].confidence, 0.85);
        assert_eq!(dets[1].confidence, 0.99);
    }

    #[test]
    fn test_best_detection_picks_highest_confidence() {
        let dets = parse(
            &[
                record(0.85, 0.0, 0.0, 0.1, 0.1),
                record(0.99, 0.5, 0.5, 0.6, 0.6),
                record(0.90, 0.2, 0.2, 0.3, 0.3),
            ],
            100,
            100,
        );
        let best = best_detection(&dets).unwrap();
        assert_eq!(best.rect, Rect::new(50, 50, 60, 60));
    }

    #[test]
    fn test_best_detection_tie_keeps_first() {
        let a = Detection {
            confidence: 0.9,
            rect: Rect::new(0, 0, 10, 10),
        };
        let b = Detection {
            confidence: 0.9,
            rect: Rect::new(20, 20, 30, 30),
        };
        assert_eq!(best_detection(&[a, b]), Some(a));
    }

    #[test]
    fn test_best_detection_empty() {
        assert_eq!(best_detection(&[]), None);
    }
}
