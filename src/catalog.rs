//! Glyph catalog: character to hand-drawn image variants.
//!
//! The on-disk layout is one directory per character, named by its decimal
//! code, holding any number of `.png` variants:
//!
//! ```text
//! assets/
//!   97/   a-1.png a-2.png
//!   44/   comma.png
//! ```
//!
//! A catalog is read-only and shared freely between concurrent renders.

use crate::{Error, Result};
use image::RgbaImage;
use rand::Rng;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_skia::Pixmap;

/// Extension (compared case-insensitively) of usable glyph files
pub const SUPPORTED_EXTENSION: &str = "png";

/// The space character never has a glyph; it only advances the cursor.
pub const SPACE: char = ' ';

/// A decoded glyph image, premultiplied and ready to composite.
///
/// Cloning is cheap; the pixels are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph(Arc<Pixmap>);

impl Glyph {
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Glyph(Arc::new(pixmap))
    }

    /// Build a glyph from straight (non-premultiplied) RGBA pixels.
    pub fn from_rgba(image: RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            Error::RenderError(format!("invalid glyph dimensions {}x{}", width, height))
        })?;
        let mut rgba = image.into_raw();
        crate::rendering::raster::premultiply_rgba_in_place(&mut rgba);
        pixmap.data_mut().copy_from_slice(&rgba);
        Ok(Glyph::from_pixmap(pixmap))
    }

    /// Decode a glyph file from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let image = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(source) => Error::Io {
                path: path.to_path_buf(),
                source,
            },
            other => Error::Decode {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })?;
        Glyph::from_rgba(image.to_rgba8())
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.0
    }
}

/// Source of glyph variants.
///
/// Listing and loading are split so callers can list variants, pick one with
/// their own random source, and load the chosen one (possibly on another
/// thread).
pub trait GlyphCatalog: Send + Sync {
    /// Handle to one variant; cheap to clone and send between threads
    type Variant: Clone + Send + 'static;

    /// All variants for `ch`, in a stable order.
    ///
    /// Fails with [`Error::MissingAsset`] when the character is unknown.
    /// An empty list is treated the same way by [`select_variant`].
    fn variants(&self, ch: char) -> Result<Vec<Self::Variant>>;

    /// Load the image behind a variant.
    fn load(&self, variant: &Self::Variant) -> Result<Glyph>;
}

impl<C: GlyphCatalog + ?Sized> GlyphCatalog for Arc<C> {
    type Variant = C::Variant;

    fn variants(&self, ch: char) -> Result<Vec<Self::Variant>> {
        (**self).variants(ch)
    }

    fn load(&self, variant: &Self::Variant) -> Result<Glyph> {
        (**self).load(variant)
    }
}

/// Pick one variant uniformly at random.
pub fn select_variant<V, R: Rng + ?Sized>(ch: char, mut variants: Vec<V>, rng: &mut R) -> Result<V> {
    if variants.is_empty() {
        return Err(Error::missing_asset(ch));
    }
    let len = variants.len();
    let idx = ((rng.gen::<f64>() * len as f64) as usize).min(len - 1);
    Ok(variants.swap_remove(idx))
}

/// Resolve one character to a drawable glyph.
///
/// Returns `Ok(None)` for a space without consulting the catalog.
pub fn resolve<C, R>(catalog: &C, ch: char, rng: &mut R) -> Result<Option<Glyph>>
where
    C: GlyphCatalog + ?Sized,
    R: Rng + ?Sized,
{
    if ch == SPACE {
        return Ok(None);
    }
    let variant = select_variant(ch, catalog.variants(ch)?, rng)?;
    catalog.load(&variant).map(Some)
}

/// Catalog backed by a directory tree of PNG files
#[derive(Debug, Clone)]
pub struct DirCatalog {
    root: PathBuf,
}

impl DirCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the variants of `ch`
    pub fn char_dir(&self, ch: char) -> PathBuf {
        self.root.join((ch as u32).to_string())
    }
}

impl GlyphCatalog for DirCatalog {
    type Variant = PathBuf;

    fn variants(&self, ch: char) -> Result<Vec<PathBuf>> {
        let dir = self.char_dir(ch);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::missing_asset(ch))
            }
            Err(source) => return Err(Error::Io { path: dir, source }),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| Error::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if is_supported_image(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn load(&self, variant: &PathBuf) -> Result<Glyph> {
        Glyph::open(variant)
    }
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SUPPORTED_EXTENSION))
}

/// In-memory catalog, handy for tests, benches and embedding pre-decoded sets
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    glyphs: HashMap<char, Vec<Glyph>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one variant for `ch`
    pub fn insert(&mut self, ch: char, glyph: Glyph) {
        self.glyphs.entry(ch).or_default().push(glyph);
    }

    pub fn with_glyph(mut self, ch: char, glyph: Glyph) -> Self {
        self.insert(ch, glyph);
        self
    }

    pub fn contains(&self, ch: char) -> bool {
        self.glyphs.get(&ch).is_some_and(|v| !v.is_empty())
    }
}

impl GlyphCatalog for MemoryCatalog {
    type Variant = Glyph;

    fn variants(&self, ch: char) -> Result<Vec<Glyph>> {
        self.glyphs
            .get(&ch)
            .cloned()
            .ok_or_else(|| Error::missing_asset(ch))
    }

    fn load(&self, variant: &Glyph) -> Result<Glyph> {
        Ok(variant.clone())
    }
}
