use crate::annotation::bitmap_font::{glyph, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::shared::frame::Frame;
use crate::shared::rect::Rect;

/// Gap in pixels between a label and the box it names.
const LABEL_MARGIN: i32 = 2;

/// Draws the outline of `rect` with the given stroke width, growing inwards.
///
/// Pixels outside the frame are skipped. Non-RGB frames are left untouched.
pub fn draw_rect_outline(frame: &mut Frame, rect: &Rect, color: [u8; 3], stroke: u32) {
    if rect.is_degenerate() || stroke == 0 {
        return;
    }
    let s = stroke as i32;
    let inner_right = (rect.left + s).min(rect.right);
    let inner_bottom = (rect.top + s).min(rect.bottom);

    // top and bottom bands
    fill_rect(frame, rect.left, rect.top, rect.right, inner_bottom, color);
    fill_rect(frame, rect.left, (rect.bottom - s).max(rect.top), rect.right, rect.bottom, color);
    // left and right bands
    fill_rect(frame, rect.left, rect.top, inner_right, rect.bottom, color);
    fill_rect(frame, (rect.right - s).max(rect.left), rect.top, rect.right, rect.bottom, color);
}

/// Renders `text` with its top-left corner at `(x, y)`, each glyph pixel
/// scaled to a `scale`x`scale` block. Characters without a glyph still
/// advance the cursor.
pub fn draw_text(frame: &mut Frame, x: i32, y: i32, text: &str, color: [u8; 3], scale: u32) {
    let scale = scale.max(1) as i32;
    let mut cursor = x;
    for ch in text.chars() {
        if let Some(rows) = glyph(ch) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH as i32 {
                    if (bits >> (GLYPH_WIDTH as i32 - 1 - col)) & 1 == 0 {
                        continue;
                    }
                    let px = cursor + col * scale;
                    let py = y + row as i32 * scale;
                    fill_rect(frame, px, py, px + scale, py + scale, color);
                }
            }
        }
        cursor += GLYPH_ADVANCE as i32 * scale;
    }
}

/// Pixel size of `text` rendered at `scale`.
pub fn text_size(text: &str, scale: u32) -> (u32, u32) {
    let scale = scale.max(1);
    let chars = text.chars().count() as u32;
    let width = if chars == 0 {
        0
    } else {
        (chars * GLYPH_ADVANCE - (GLYPH_ADVANCE - GLYPH_WIDTH)) * scale
    };
    (width, GLYPH_HEIGHT * scale)
}

/// Draws `name` anchored at the top-left corner of `rect`: just above the box
/// when there is room, otherwise just inside its top edge.
pub fn draw_label(frame: &mut Frame, rect: &Rect, name: &str, color: [u8; 3], scale: u32) {
    let (_, text_height) = text_size(name, scale);
    let above = rect.top - LABEL_MARGIN - text_height as i32;
    let y = if above >= 0 { above } else { rect.top + LABEL_MARGIN };
    draw_text(frame, rect.left, y, name, color, scale);
}

/// Fills the half-open box `[left, right) x [top, bottom)`, clipped to the frame.
fn fill_rect(frame: &mut Frame, left: i32, top: i32, right: i32, bottom: i32, color: [u8; 3]) {
    if frame.channels() != 3 {
        return;
    }
    let width = frame.width() as i32;
    let height = frame.height() as i32;
    let x0 = left.clamp(0, width);
    let x1 = right.clamp(0, width);
    let y0 = top.clamp(0, height);
    let y1 = bottom.clamp(0, height);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let stride = width as usize * 3;
    let data = frame.data_mut();
    for y in y0 as usize..y1 as usize {
        let row = &mut data[y * stride..(y + 1) * stride];
        for pixel in row[x0 as usize * 3..x1 as usize * 3].chunks_exact_mut(3) {
            pixel.copy_from_slice(&color);
        }
    }
}
