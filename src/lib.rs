//! Handletter
//!
//! Renders a short text message as a single PNG composed from hand-drawn
//! glyph images. Every character occurrence gets a randomly chosen variant
//! from a glyph catalog and is drawn with a small random offset, size change
//! and tilt, so the result reads like handwriting.
//!
//! # Pipeline
//!
//! - **Wrap**: the prompt is lower-cased, trimmed and wrapped into lines of at
//!   most 20 characters (at most 40 lines).
//! - **Layout**: the canvas size follows from the lines and spacing alone.
//! - **Resolve**: each non-space character picks one variant from the
//!   [`catalog`].
//! - **Compose**: glyphs are placed on a fixed 20x30 grid with jitter, drawn
//!   over a white (or transparent) background with a soft grey shadow.
//!
//! # Example
//!
//! ```no_run
//! use handletter::{DirCatalog, RenderRequest};
//! use rand::SeedableRng;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = DirCatalog::new("assets");
//! let request = RenderRequest::new("Dear diary,").transparent(true);
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//!
//! let letter = handletter::render(&request, &catalog, &mut rng)?;
//! std::fs::write("letter.png", &letter.png_data)?;
//! println!("{}x{} in {:?}", letter.width, letter.height, letter.elapsed);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod error;
pub use error::{Error, ErrorKind, Result};

pub mod catalog;
pub mod params;
pub mod rendering;
pub mod wrap;

// Async facade: concurrent glyph loading on the tokio blocking pool
#[cfg(feature = "async")]
pub mod async_api;

#[cfg(feature = "async")]
pub use async_api::Letterer;
pub use catalog::{DirCatalog, Glyph, GlyphCatalog, MemoryCatalog};
pub use params::{Factors, NormalizedParameters};
pub use rendering::{render, RenderedLetter};

/// One letter to render
///
/// Deserializes from the JSON shape used by the web form:
///
/// ```
/// let req: handletter::RenderRequest = serde_json::from_str(
///     r#"{"prompt": "hello", "transparent": true, "rotationRandomDegreeFactor": 0.5}"#,
/// ).unwrap();
/// assert_eq!(req.factors.rotation_random_degree_factor, Some(0.5));
/// assert_eq!(req.factors.line_spacing_factor, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Raw text; sanitized before wrapping
    pub prompt: String,
    /// Leave the background transparent instead of white
    #[serde(default)]
    pub transparent: bool,
    /// Language hint from the client; not used for rendering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(flatten)]
    pub factors: Factors,
}

impl RenderRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn with_factors(mut self, factors: Factors) -> Self {
        self.factors = factors;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidRequest(e.to_string()))
    }
}

/// Configuration for a [`Letterer`](crate::async_api::Letterer) or the CLI
///
/// # Examples
///
/// ```
/// let cfg = handletter::LettererConfig::default();
/// assert_eq!(cfg.catalog_dir, std::path::PathBuf::from("assets"));
/// assert!(cfg.seed.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LettererConfig {
    /// Root of the glyph catalog (one sub-directory per character code)
    pub catalog_dir: PathBuf,
    /// Fixed seed for reproducible output; fresh entropy per request if unset
    pub seed: Option<u64>,
}

impl Default for LettererConfig {
    fn default() -> Self {
        Self {
            catalog_dir: PathBuf::from("assets"),
            seed: None,
        }
    }
}

impl LettererConfig {
    pub const ASSETS_ENV: &'static str = "HANDLETTER_ASSETS";
    pub const SEED_ENV: &'static str = "HANDLETTER_SEED";

    /// Defaults overridden by `HANDLETTER_ASSETS` and `HANDLETTER_SEED`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(dir) = lookup(Self::ASSETS_ENV).filter(|d| !d.is_empty()) {
            config.catalog_dir = PathBuf::from(dir);
        }
        if let Some(seed) = lookup(Self::SEED_ENV).filter(|s| !s.is_empty()) {
            let seed = seed.trim().parse::<u64>().map_err(|e| {
                Error::ConfigError(format!("{} must be an unsigned integer: {}", Self::SEED_ENV, e))
            })?;
            config.seed = Some(seed);
        }
        Ok(config)
    }
}
