//! Raster canvas with a 2D transform stack.
//!
//! The pixmap starts white (or transparent). Every glyph casts its own
//! blurred grey shadow just before it is drawn, so a glyph's shadow falls
//! over the glyphs drawn before it but never over itself.

use crate::catalog::Glyph;
use crate::rendering::paint::{PaintCommand, Placement};
use crate::{Error, Result};
use image::{imageops, Rgba, RgbaImage};
use tiny_skia::{BlendMode, Color, FilterQuality, IntRect, IntSize, Pixmap, PixmapPaint, Point, Transform};

/// Soft shadow under every drawn glyph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    /// Blur radius in the 2D-canvas sense; the Gaussian sigma is half of it
    pub blur: f32,
    pub rgb: [u8; 3],
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            blur: 2.0,
            rgb: [128, 128, 128],
        }
    }
}

impl Shadow {
    /// Gaussian sigma used for the blur
    pub fn sigma(&self) -> f32 {
        self.blur / 2.0
    }

    /// How far past a glyph's edge the shadow can reach, in pixels
    pub fn reach(&self) -> i32 {
        (self.sigma() * 3.0).ceil() as i32 + 1
    }
}

const GLYPH_PAINT: PixmapPaint = PixmapPaint {
    opacity: 1.0,
    blend_mode: BlendMode::SourceOver,
    quality: FilterQuality::Bilinear,
};

pub struct Canvas {
    layer: Pixmap,
    transform: Transform,
    saved: Vec<Transform>,
    transparent: bool,
    shadow: Shadow,
}

impl Canvas {
    pub fn new(width: u32, height: u32, transparent: bool) -> Result<Self> {
        let mut layer = Pixmap::new(width, height).ok_or_else(|| {
            Error::RenderError(format!("cannot allocate a {}x{} canvas", width, height))
        })?;
        if !transparent {
            layer.fill(Color::WHITE);
        }
        Ok(Self {
            layer,
            transform: Transform::identity(),
            saved: Vec::new(),
            transparent,
            shadow: Shadow::default(),
        })
    }

    pub fn with_shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = shadow;
        self
    }

    pub fn width(&self) -> u32 {
        self.layer.width()
    }

    pub fn height(&self) -> u32 {
        self.layer.height()
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Current transform applied to draws
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Number of unmatched [`Canvas::save`] calls
    pub fn save_depth(&self) -> usize {
        self.saved.len()
    }

    pub fn save(&mut self) {
        self.saved.push(self.transform);
    }

    pub fn restore(&mut self) {
        if let Some(t) = self.saved.pop() {
            self.transform = t;
        }
    }

    pub fn translate(&mut self, tx: f32, ty: f32) {
        self.transform = self.transform.pre_translate(tx, ty);
    }

    pub fn rotate(&mut self, radians: f32) {
        self.transform = self
            .transform
            .pre_concat(Transform::from_rotate(radians.to_degrees()));
    }

    /// Draw `glyph` scaled into the `width` x `height` box at `(x, y)` under
    /// the current transform, preceded by its shadow.
    pub fn draw_image(&mut self, glyph: &Glyph, x: f32, y: f32, width: f32, height: f32) {
        let sx = width / glyph.width() as f32;
        let sy = height / glyph.height() as f32;
        let transform = self.transform.pre_translate(x, y).pre_scale(sx, sy);
        self.draw_shadow(glyph, transform);
        self.layer
            .draw_pixmap(0, 0, glyph.pixmap().as_ref(), &GLYPH_PAINT, transform, None);
    }

    /// Blur the glyph's silhouette within the area its shadow can reach and
    /// composite it onto the canvas.
    fn draw_shadow(&mut self, glyph: &Glyph, transform: Transform) {
        if self.shadow.blur <= 0.0 {
            return;
        }
        let Some(bounds) = self.shadow_bounds(glyph, transform) else {
            return;
        };
        let Some(mut scratch) = Pixmap::new(bounds.width(), bounds.height()) else {
            return;
        };
        let local = transform.post_translate(-bounds.x() as f32, -bounds.y() as f32);
        scratch.draw_pixmap(0, 0, glyph.pixmap().as_ref(), &GLYPH_PAINT, local, None);

        if let Some(shadow) = shadow_pixmap(&scratch, &self.shadow) {
            self.layer.draw_pixmap(
                bounds.x(),
                bounds.y(),
                shadow.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
    }

    /// Device-space box covering the transformed glyph plus the shadow's
    /// reach, clipped to the canvas.
    fn shadow_bounds(&self, glyph: &Glyph, transform: Transform) -> Option<IntRect> {
        let (w, h) = (glyph.width() as f32, glyph.height() as f32);
        let mut corners = [
            Point::from_xy(0.0, 0.0),
            Point::from_xy(w, 0.0),
            Point::from_xy(0.0, h),
            Point::from_xy(w, h),
        ];
        transform.map_points(&mut corners);

        let (mut left, mut top) = (f32::MAX, f32::MAX);
        let (mut right, mut bottom) = (f32::MIN, f32::MIN);
        for p in &corners {
            left = left.min(p.x);
            top = top.min(p.y);
            right = right.max(p.x);
            bottom = bottom.max(p.y);
        }
        if !(left.is_finite() && top.is_finite() && right.is_finite() && bottom.is_finite()) {
            return None;
        }

        let reach = self.shadow.reach();
        let x0 = (left.floor() as i32 - reach).max(0);
        let y0 = (top.floor() as i32 - reach).max(0);
        let x1 = (right.ceil() as i32 + reach).min(self.width() as i32);
        let y1 = (bottom.ceil() as i32 + reach).min(self.height() as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        IntRect::from_ltrb(x0, y0, x1, y1)
    }

    /// Draw a glyph rotated about its own center, leaving the transform as
    /// it was found.
    pub fn draw_rotated(&mut self, glyph: &Glyph, placement: &Placement) {
        let (cx, cy) = placement.center();
        self.save();
        self.translate(cx, cy);
        self.rotate(placement.rotation);
        self.translate(-cx, -cy);
        self.draw_image(
            glyph,
            placement.x,
            placement.y,
            placement.width,
            placement.height,
        );
        self.restore();
    }

    pub fn paint(&mut self, command: &PaintCommand) {
        self.draw_rotated(&command.glyph, &command.placement);
    }

    /// Background, shadows and glyphs drawn so far
    pub fn pixmap(&self) -> &Pixmap {
        &self.layer
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.layer
            .encode_png()
            .map_err(|e| Error::RenderError(format!("PNG encoding failed: {}", e)))
    }
}

/// Grey silhouette of `layer`, Gaussian-blurred.
fn shadow_pixmap(layer: &Pixmap, shadow: &Shadow) -> Option<Pixmap> {
    let [r, g, b] = shadow.rgb;
    let mut silhouette = RgbaImage::new(layer.width(), layer.height());
    for (dst, src) in silhouette.pixels_mut().zip(layer.pixels()) {
        *dst = Rgba([r, g, b, src.alpha()]);
    }
    let blurred = imageops::blur(&silhouette, shadow.sigma());

    let size = IntSize::from_wh(blurred.width(), blurred.height())?;
    let mut rgba = blurred.into_raw();
    premultiply_rgba_in_place(&mut rgba);
    Pixmap::from_vec(rgba, size)
}

/// Convert straight RGBA bytes to the premultiplied form tiny-skia stores.
pub fn premultiply_rgba_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_glyph(width: u32, height: u32) -> Glyph {
        let image = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
        Glyph::from_rgba(image).unwrap()
    }

    #[test]
    fn zero_sized_canvas_is_an_error() {
        assert!(matches!(Canvas::new(0, 10, false), Err(Error::RenderError(_))));
    }

    #[test]
    fn rotated_draws_restore_the_transform() {
        let mut canvas = Canvas::new(100, 60, false).unwrap();
        let glyph = black_glyph(8, 8);
        for i in 0..10 {
            let placement = Placement {
                x: 5.0 + i as f32 * 7.0,
                y: 10.0,
                width: 20.0,
                height: 30.0,
                rotation: 0.3 * (i as f32 - 5.0),
            };
            canvas.draw_rotated(&glyph, &placement);
        }
        assert!(canvas.transform().is_identity());
        assert_eq!(canvas.save_depth(), 0);
    }

    #[test]
    fn unbalanced_restore_is_harmless() {
        let mut canvas = Canvas::new(4, 4, true).unwrap();
        canvas.restore();
        assert!(canvas.transform().is_identity());
    }

    fn red_glyph(width: u32, height: u32) -> Glyph {
        let image = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]));
        Glyph::from_rgba(image).unwrap()
    }

    #[test]
    fn image_is_scaled_into_its_box() {
        let mut canvas = Canvas::new(40, 40, true).unwrap();
        canvas.draw_image(&black_glyph(2, 2), 10.0, 10.0, 20.0, 20.0);
        let layer = canvas.pixmap();
        let at = |x: u32, y: u32| layer.pixel(x, y).map(|p| p.alpha()).unwrap_or(0);
        assert_eq!(at(20, 20), 255);
        assert_eq!(at(2, 2), 0);
        assert_eq!(at(35, 35), 0);
    }

    #[test]
    fn opaque_background_is_white() {
        let canvas = Canvas::new(8, 8, false).unwrap();
        let px = canvas.pixmap().pixel(0, 0).unwrap();
        assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (255, 255, 255, 255));
    }

    #[test]
    fn transparent_background_stays_clear() {
        let canvas = Canvas::new(8, 8, true).unwrap();
        assert!(canvas.pixmap().pixels().iter().all(|p| p.alpha() == 0));
    }

    #[test]
    fn shadow_bleeds_past_the_glyph_edge() {
        let mut canvas = Canvas::new(30, 30, true).unwrap();
        canvas.draw_image(&black_glyph(1, 1), 10.0, 10.0, 10.0, 10.0);
        let out = canvas.pixmap();
        let outside = out.pixel(9, 15).unwrap();
        assert!(outside.alpha() > 0, "shadow should extend beyond the glyph");
        assert_eq!(out.pixel(0, 0).unwrap().alpha(), 0);
    }

    #[test]
    fn later_shadow_falls_on_earlier_glyph() {
        let mut canvas = Canvas::new(32, 20, false).unwrap();
        canvas.draw_image(&red_glyph(10, 10), 5.0, 5.0, 10.0, 10.0);
        canvas.draw_image(&red_glyph(10, 10), 15.0, 5.0, 10.0, 10.0);
        let out = canvas.pixmap();

        // Right edge of the first glyph sits under the second glyph's shadow
        let shaded = out.pixel(14, 10).unwrap();
        assert!(shaded.green() > 0 && shaded.red() < 255, "{shaded:?}");

        // Each glyph covers its own shadow
        let far = out.pixel(6, 10).unwrap();
        assert_eq!((far.red(), far.green(), far.blue()), (255, 0, 0));
        let own = out.pixel(17, 10).unwrap();
        assert_eq!((own.red(), own.green(), own.blue()), (255, 0, 0));
    }

    #[test]
    fn zero_blur_casts_no_shadow() {
        let mut canvas = Canvas::new(30, 30, true).unwrap().with_shadow(Shadow {
            blur: 0.0,
            ..Shadow::default()
        });
        canvas.draw_image(&black_glyph(1, 1), 10.0, 10.0, 10.0, 10.0);
        assert_eq!(canvas.pixmap().pixel(9, 15).unwrap().alpha(), 0);
    }

    #[test]
    fn premultiply_scales_color_by_alpha() {
        let mut px = [255, 128, 0, 128, 10, 20, 30, 0];
        premultiply_rgba_in_place(&mut px);
        assert_eq!(&px[..4], &[128, 64, 0, 128]);
        assert_eq!(&px[4..], &[0, 0, 0, 0]);
    }
}
