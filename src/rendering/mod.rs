//! Lettering pipeline: wrap, size, resolve, place, draw, encode.

pub mod layout;
pub mod paint;
pub mod raster;

use crate::catalog::{resolve, Glyph, GlyphCatalog};
use crate::params::NormalizedParameters;
use crate::wrap::{sanitize_prompt, wrap_lines};
use crate::{RenderRequest, Result};
use base64::Engine as _;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

use layout::CanvasSize;
use paint::Cursor;
use raster::Canvas;

/// A finished letter image plus the metadata a caller may want to log
#[derive(Debug, Clone)]
pub struct RenderedLetter {
    pub width: u32,
    pub height: u32,
    pub line_count: usize,
    pub elapsed: Duration,
    pub png_data: Vec<u8>,
}

impl RenderedLetter {
    /// Standard base64 of the PNG bytes
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.png_data)
    }

    /// Hex SHA-256 of the PNG bytes
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }
}

/// Everything about a request that is known before any glyph is loaded
#[derive(Debug, Clone, PartialEq)]
pub struct LetterPlan {
    pub params: NormalizedParameters,
    pub lines: Vec<String>,
    pub size: CanvasSize,
    pub transparent: bool,
}

impl LetterPlan {
    pub fn new(request: &RenderRequest) -> Result<Self> {
        let params = NormalizedParameters::from_factors(&request.factors);
        let lines = wrap_lines(&sanitize_prompt(&request.prompt))?;
        let size = layout::canvas_size(&lines, params.line_spacing, params.letter_spacing);
        Ok(Self {
            params,
            lines,
            size,
            transparent: request.transparent,
        })
    }

    pub fn canvas(&self) -> Result<Canvas> {
        let (width, height) = self.size.pixels();
        Canvas::new(width, height, self.transparent)
    }
}

/// Place and draw one line of resolved glyphs, then move the cursor down.
pub fn draw_line<R: Rng + ?Sized>(
    canvas: &mut Canvas,
    line: &str,
    glyphs: Vec<Option<Glyph>>,
    cursor: &mut Cursor,
    params: &NormalizedParameters,
    rng: &mut R,
) {
    for command in paint::paint_line(line, glyphs, cursor, params, rng) {
        canvas.paint(&command);
    }
    cursor.next_line(params);
}

/// Encode a fully drawn canvas.
pub fn finish(canvas: &Canvas, plan: &LetterPlan, started: Instant) -> Result<RenderedLetter> {
    let png_data = canvas.encode_png()?;
    Ok(RenderedLetter {
        width: canvas.width(),
        height: canvas.height(),
        line_count: plan.lines.len(),
        elapsed: started.elapsed(),
        png_data,
    })
}

/// Render a request synchronously.
///
/// Per line, every glyph is resolved (variant picked and decoded) before any
/// is placed, so the random stream is consumed in the same order as by
/// [`crate::async_api::Letterer`].
pub fn render<C, R>(request: &RenderRequest, catalog: &C, rng: &mut R) -> Result<RenderedLetter>
where
    C: GlyphCatalog + ?Sized,
    R: Rng + ?Sized,
{
    let started = Instant::now();
    let plan = LetterPlan::new(request)?;
    let mut canvas = plan.canvas()?;
    let mut cursor = Cursor::origin();

    for line in &plan.lines {
        let glyphs = line
            .chars()
            .map(|ch| resolve(catalog, ch, &mut *rng))
            .collect::<Result<Vec<_>>>()?;
        draw_line(&mut canvas, line, glyphs, &mut cursor, &plan.params, rng);
    }

    finish(&canvas, &plan, started)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::params::Factors;
    use crate::rendering::paint::tests::{ConstRng, CENTERED};
    use crate::Error;
    use image::{Rgba, RgbaImage};

    fn ink() -> Glyph {
        Glyph::from_rgba(RgbaImage::from_pixel(4, 6, Rgba([0, 0, 0, 255]))).unwrap()
    }

    fn catalog(chars: &str) -> MemoryCatalog {
        chars.chars().fold(MemoryCatalog::new(), |c, ch| c.with_glyph(ch, ink()))
    }

    fn request(prompt: &str) -> RenderRequest {
        RenderRequest::new(prompt)
    }

    #[test]
    fn plan_sizes_before_drawing() {
        let plan = LetterPlan::new(&request("  HI ")).unwrap();
        assert_eq!(plan.lines, vec!["hi"]);
        assert_eq!(plan.size.pixels(), (68, 50));
    }

    #[test]
    fn renders_png_with_planned_dimensions() {
        let letter = render(&request("hi"), &catalog("hi"), &mut ConstRng(CENTERED)).unwrap();
        assert_eq!((letter.width, letter.height), (68, 50));
        assert_eq!(letter.line_count, 1);

        let decoded = image::load_from_memory(&letter.png_data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (68, 50));
    }

    #[test]
    fn glyph_lands_in_its_cell() {
        let mut req = request("a b");
        req.factors = Factors::uniform(0.0);
        let letter = render(&req, &catalog("ab"), &mut ConstRng(CENTERED)).unwrap();
        let img = image::load_from_memory(&letter.png_data).unwrap().to_rgba8();

        // Rigid layout: 'a' fills 10..30, the space cell 30..50, 'b' 50..70.
        assert_eq!(img.width(), 3 * 20 + 20);
        assert!(img.get_pixel(20, 25)[0] < 64);
        assert_eq!(img.get_pixel(40, 25)[0], 255);
        assert!(img.get_pixel(60, 25)[0] < 64);
    }

    #[test]
    fn missing_glyph_aborts_the_render() {
        let err = render(&request("ab"), &catalog("a"), &mut ConstRng(CENTERED)).unwrap_err();
        assert!(matches!(err, Error::MissingAsset { ch: 'b', code: 98 }));
    }

    #[test]
    fn too_long_prompt_fails_before_any_lookup() {
        let prompt = vec!["x".repeat(20); 41].join(" ");
        let err = render(&request(&prompt), &MemoryCatalog::new(), &mut ConstRng(CENTERED))
            .unwrap_err();
        assert!(matches!(err, Error::PromptTooLong { lines: 41, .. }));
    }

    #[test]
    fn base64_and_digest_describe_the_png() {
        let letter = render(&request("a"), &catalog("a"), &mut ConstRng(CENTERED)).unwrap();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(letter.to_base64())
            .unwrap();
        assert_eq!(decoded, letter.png_data);
        assert_eq!(letter.digest().len(), 64);
    }
}
