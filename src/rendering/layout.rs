//! Canvas sizing for wrapped lines
//!
//! The size depends only on line count, line lengths and spacing, never on
//! the glyph images, so it is known before anything is drawn.

use crate::params::{CHAR_HEIGHT_PX, CHAR_WIDTH_PX, MARGIN_PX, MAX_CHARS_IN_LINE};
use crate::wrap::char_len;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    /// Pixel dimensions of the backing buffer: truncated, at least 1x1.
    pub fn pixels(&self) -> (u32, u32) {
        (to_pixels(self.width), to_pixels(self.height))
    }
}

fn to_pixels(v: f32) -> u32 {
    if v.is_finite() && v >= 1.0 {
        v as u32
    } else {
        1
    }
}

/// Character columns reserved for the canvas.
///
/// Multi-line text always reserves the full line width; a single line
/// reserves only its own length.
pub fn width_in_chars(lines: &[String]) -> usize {
    if lines.len() > 1 {
        MAX_CHARS_IN_LINE
    } else {
        lines.first().map(|l| char_len(l)).unwrap_or(0)
    }
}

pub fn canvas_width(lines: &[String], letter_spacing: f32) -> f32 {
    let chars = width_in_chars(lines) as f32;
    chars * CHAR_WIDTH_PX + 2.0 * MARGIN_PX + (chars - 1.0) * letter_spacing
}

pub fn canvas_height(lines: &[String], line_spacing: f32) -> f32 {
    let count = lines.len() as f32;
    count * CHAR_HEIGHT_PX + (count - 1.0) * line_spacing + 2.0 * MARGIN_PX
}

pub fn canvas_size(lines: &[String], line_spacing: f32, letter_spacing: f32) -> CanvasSize {
    CanvasSize {
        width: canvas_width(lines, letter_spacing),
        height: canvas_height(lines, line_spacing),
    }
}
