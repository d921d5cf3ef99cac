/// Axis-aligned pixel rectangle with exclusive `right`/`bottom` edges.
///
/// Only rectangles that fit inside their frame are ever constructed through
/// [`Rect::from_normalized`]; everything downstream (drawing, cropping) can
/// rely on that.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Scales normalized `[0, 1]` model coordinates to pixels.
    ///
    /// Coordinates are truncated toward zero. Returns `None` when the result
    /// is degenerate or does not fit inside a `frame_w` × `frame_h` frame.
    pub fn from_normalized(
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        frame_w: u32,
        frame_h: u32,
    ) -> Option<Rect> {
        let fw = frame_w as f32;
        let fh = frame_h as f32;
        let rect = Rect {
            left: scale(left, fw)?,
            top: scale(top, fh)?,
            right: scale(right, fw)?,
            bottom: scale(bottom, fh)?,
        };
        rect.fits_within(frame_w, frame_h).then_some(rect)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// `0 ≤ left < right ≤ frame_w` and `0 ≤ top < bottom ≤ frame_h`.
    pub fn fits_within(&self, frame_w: u32, frame_h: u32) -> bool {
        !self.is_degenerate()
            && self.left >= 0
            && self.top >= 0
            && i64::from(self.right) <= i64::from(frame_w)
            && i64::from(self.bottom) <= i64::from(frame_h)
    }
}

/// The product is taken in `f32`, so `0.7 * 100` lands on 70.
fn scale(normalized: f32, extent: f32) -> Option<i32> {
    let px = (normalized * extent).trunc();
    if px.is_finite() && px >= i32::MIN as f32 && px < i32::MAX as f32 {
        Some(px as i32)
    } else {
        None
    }
}
