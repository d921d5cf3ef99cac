use crate::annotation::frame_annotator::{draw_label, draw_rect_outline};
use crate::identity::domain::identity_matcher::IdentityMatcher;
use crate::pipeline::face_locator::{FaceLocator, PipelineError};
use crate::pipeline::frame_processor::FrameProcessor;
use crate::shared::constants::{BOX_COLOR, BOX_STROKE, LABEL_COLOR, LABEL_SCALE};
use crate::shared::frame::Frame;
use crate::shared::rect::Rect;

/// What was drawn for one detected face.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedRegion {
    pub rect: Rect,
    pub name: Option<String>,
}

/// Detect → match → annotate, one frame at a time.
pub struct FramePipeline {
    locator: FaceLocator,
    matcher: IdentityMatcher,
}

impl FramePipeline {
    pub fn new(locator: FaceLocator, matcher: IdentityMatcher) -> Self {
        Self { locator, matcher }
    }

    /// Draws a box around every detected face and the matched name above it.
    ///
    /// Faces are cropped for matching before anything is drawn, so
    /// overlapping boxes never leak into another face's hash.
    pub fn annotate(&mut self, frame: &mut Frame) -> Result<Vec<NamedRegion>, PipelineError> {
        let detections = self.locator.locate(frame)?;

        // Hash the undrawn pixels, like the gallery photos. Cropping after
        // drawing would put the green border into every live hash.
        let regions: Vec<NamedRegion> = detections
            .iter()
            .map(|detection| NamedRegion {
                rect: detection.rect,
                name: frame
                    .crop(&detection.rect)
                    .and_then(|face| self.matcher.match_name(&face).map(str::to_owned)),
            })
            .collect();

        for region in &regions {
            draw_rect_outline(frame, &region.rect, BOX_COLOR, BOX_STROKE);
        }
        for region in &regions {
            if let Some(name) = &region.name {
                draw_label(frame, &region.rect, name, LABEL_COLOR, LABEL_SCALE);
            }
        }
        Ok(regions)
    }
}

impl FrameProcessor for FramePipeline {
    fn process(&mut self, mut frame: Frame) -> Result<Frame, Box<dyn std::error::Error>> {
        let regions = self.annotate(&mut frame)?;
        if !regions.is_empty() {
            log::trace!(
                "Frame {}: {} face(s), {} named",
                frame.index(),
                regions.len(),
                regions.iter().filter(|r| r.name.is_some()).count()
            );
        }
        Ok(frame)
    }
}
