//! Glyph placement: where, how big and how tilted each glyph is drawn.
//!
//! The cursor walks a fixed grid of 20x30 cells. Only the drawn glyph is
//! jittered; the cursor itself never is.

use crate::catalog::Glyph;
use crate::params::{NormalizedParameters, CHAR_HEIGHT_PX, CHAR_WIDTH_PX, MARGIN_PX};
use rand::Rng;

/// Marks drawn at half size
pub const SMALL_PUNCTUATION: [char; 7] = [',', '.', '_', '\'', '"', '^', '`'];

/// Marks that sit on the baseline instead of mid-cell
pub const LOW_PROFILE: [char; 3] = [',', '.', '_'];

pub fn is_small_punctuation(ch: char) -> bool {
    SMALL_PUNCTUATION.contains(&ch)
}

pub fn is_low_profile(ch: char) -> bool {
    LOW_PROFILE.contains(&ch)
}

/// Top-left corner of the current cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub x: f32,
    pub y: f32,
}

impl Cursor {
    pub fn origin() -> Self {
        Self {
            x: MARGIN_PX,
            y: MARGIN_PX,
        }
    }

    /// Move one cell to the right
    pub fn advance(&mut self, params: &NormalizedParameters) {
        self.x += CHAR_WIDTH_PX + params.letter_spacing;
    }

    /// Move to the start of the next line
    pub fn next_line(&mut self, params: &NormalizedParameters) {
        self.x = MARGIN_PX;
        self.y += CHAR_HEIGHT_PX + params.line_spacing;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::origin()
    }
}

/// Final geometry of one glyph draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Radians, about [`Placement::center`]
    pub rotation: f32,
}

impl Placement {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A glyph ready to be drawn
#[derive(Debug, Clone, PartialEq)]
pub struct PaintCommand {
    pub ch: char,
    pub glyph: Glyph,
    pub placement: Placement,
}

/// Uniform draw in `[-range/2, range/2)`
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, range: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * range
}

/// Compute the jittered placement of `ch` in the cell at `cursor`.
///
/// Random draws are taken in a fixed order: x offset, y offset, width,
/// height, rotation.
pub fn place_glyph<R: Rng + ?Sized>(
    ch: char,
    cursor: Cursor,
    params: &NormalizedParameters,
    rng: &mut R,
) -> Placement {
    let x = cursor.x + jitter(rng, params.max_x_offset);
    let mut y = cursor.y + jitter(rng, params.max_y_offset);

    let mut width = CHAR_WIDTH_PX + jitter(rng, params.max_size_deviation);
    let mut height = CHAR_HEIGHT_PX + jitter(rng, params.max_size_deviation);

    if is_small_punctuation(ch) {
        width *= 0.5;
        height *= 0.5;
    }

    if is_low_profile(ch) {
        y += height;
    }

    let rotation = jitter(rng, params.max_rotation).to_radians();

    Placement {
        x,
        y,
        width,
        height,
        rotation,
    }
}

/// Lay out one line of already-resolved glyphs.
///
/// `glyphs[i]` belongs to the `i`-th char of `line`; `None` entries (spaces)
/// advance the cursor without producing a command. The cursor is left at the
/// end of the line.
pub fn paint_line<R: Rng + ?Sized>(
    line: &str,
    glyphs: Vec<Option<Glyph>>,
    cursor: &mut Cursor,
    params: &NormalizedParameters,
    rng: &mut R,
) -> Vec<PaintCommand> {
    let mut commands = Vec::with_capacity(glyphs.len());
    for (ch, glyph) in line.chars().zip(glyphs) {
        if let Some(glyph) = glyph {
            let placement = place_glyph(ch, *cursor, params, rng);
            commands.push(PaintCommand {
                ch,
                glyph,
                placement,
            });
        }
        cursor.advance(params);
    }
    commands
}
