//! Fixed geometry constants and the per-request "humanization" parameters.
//!
//! Requests carry five factors in `[0, 1]`. Each one is clamped and scaled
//! into an absolute pixel (or degree) budget once, producing a
//! [`NormalizedParameters`] value that is passed explicitly through wrapping,
//! layout and drawing.

use serde::{Deserialize, Serialize};

/// Margin around the text block on every side
pub const MARGIN_PX: f32 = 10.0;
/// Width of the cell reserved per character, before jitter
pub const CHAR_WIDTH_PX: f32 = 20.0;
/// Height of the cell reserved per character, before jitter
pub const CHAR_HEIGHT_PX: f32 = 30.0;
pub const MAX_LINES: usize = 40;
pub const MAX_CHARS_IN_LINE: usize = 20;

pub const MAX_LINE_SPACING_PX: f32 = 100.0;
pub const MAX_LETTER_SPACING_PX: f32 = 40.0;
pub const MAX_X_OFFSET_PX: f32 = 25.0;
pub const MAX_Y_OFFSET_PX: f32 = 15.0;
pub const MAX_SIZE_DEVIATION_PX: f32 = 25.0;
pub const MAX_CHAR_ROTATION_DEG: f32 = 50.0;

/// Factor used when a request leaves one unset
pub const DEFAULT_FACTOR: f64 = 0.2;

/// Raw factor inputs as they arrive with a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Factors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_spacing_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_random_offset_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_random_degree_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_random_factor: Option<f64>,
}

impl Factors {
    /// All five factors set to the same value
    pub fn uniform(factor: f64) -> Self {
        Self {
            line_spacing_factor: Some(factor),
            letter_spacing_factor: Some(factor),
            position_random_offset_factor: Some(factor),
            rotation_random_degree_factor: Some(factor),
            size_random_factor: Some(factor),
        }
    }
}

/// Absolute budgets derived from [`Factors`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedParameters {
    /// Extra vertical space between lines, px
    pub line_spacing: f32,
    /// Extra horizontal space between characters, px
    pub letter_spacing: f32,
    /// Full width of the horizontal position jitter range, px
    pub max_x_offset: f32,
    /// Full width of the vertical position jitter range, px
    pub max_y_offset: f32,
    /// Full width of the size jitter range, px
    pub max_size_deviation: f32,
    /// Full width of the rotation jitter range, degrees
    pub max_rotation: f32,
}

impl NormalizedParameters {
    pub fn from_factors(factors: &Factors) -> Self {
        Self {
            line_spacing: normalize_factor(factors.line_spacing_factor, MAX_LINE_SPACING_PX),
            letter_spacing: normalize_factor(factors.letter_spacing_factor, MAX_LETTER_SPACING_PX),
            // X and Y share one input but keep distinct caps: less vertical wander
            max_x_offset: normalize_factor(factors.position_random_offset_factor, MAX_X_OFFSET_PX),
            max_y_offset: normalize_factor(factors.position_random_offset_factor, MAX_Y_OFFSET_PX),
            max_size_deviation: normalize_factor(factors.size_random_factor, MAX_SIZE_DEVIATION_PX),
            max_rotation: normalize_factor(factors.rotation_random_degree_factor, MAX_CHAR_ROTATION_DEG),
        }
    }

    /// Parameters with every jitter and spacing budget at zero
    pub fn rigid() -> Self {
        Self::from_factors(&Factors::uniform(0.0))
    }
}

impl Default for NormalizedParameters {
    fn default() -> Self {
        Self::from_factors(&Factors::default())
    }
}

/// Clamp `factor` (default 0.2) into `[0, 1]` and scale it to `max`.
pub fn normalize_factor(factor: Option<f64>, max: f32) -> f32 {
    let factor = factor.unwrap_or(DEFAULT_FACTOR);
    let factor = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
    (factor * max as f64) as f32
}
