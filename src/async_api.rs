use crate::catalog::{select_variant, DirCatalog, Glyph, GlyphCatalog, SPACE};
use crate::rendering::{self, paint::Cursor, LetterPlan, RenderedLetter};
use crate::{Error, LettererConfig, RenderRequest, Result};
use futures::future::join_all;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Instant;

/// An async letter renderer backed by a shared, read-only glyph catalog.
///
/// Each call to [`Letterer::render`] is independent: it owns its random
/// source, parameters and canvas. Within a line, variant listing and image
/// decoding for all characters run concurrently on the blocking pool; the
/// glyphs are then drawn strictly left to right.
pub struct Letterer<C: GlyphCatalog + 'static = DirCatalog> {
    catalog: Arc<C>,
    seed: Option<u64>,
}

impl<C: GlyphCatalog + 'static> Clone for Letterer<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            seed: self.seed,
        }
    }
}

impl Letterer<DirCatalog> {
    /// Create a renderer over the directory catalog named in `config`.
    pub fn new(config: LettererConfig) -> Result<Self> {
        if !config.catalog_dir.is_dir() {
            return Err(Error::ConfigError(format!(
                "glyph catalog {} is not a directory",
                config.catalog_dir.display()
            )));
        }
        Ok(Self {
            catalog: Arc::new(DirCatalog::new(config.catalog_dir)),
            seed: config.seed,
        })
    }
}

impl<C: GlyphCatalog + 'static> Letterer<C> {
    pub fn with_catalog(catalog: C) -> Self {
        Self {
            catalog: Arc::new(catalog),
            seed: None,
        }
    }

    /// Seed every request's random source, making output reproducible.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Render a request, logging its duration and size.
    pub async fn render(&self, request: &RenderRequest) -> Result<RenderedLetter> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let res = self.render_with_rng(request, &mut rng).await;
        match &res {
            Ok(letter) => info!(
                "Image was generated! Took time: {:?}. Image size: {}x{}",
                letter.elapsed, letter.width, letter.height
            ),
            Err(e) if e.is_client_error() => warn!("Rejected letter request: {}", e),
            Err(e) => warn!("Letter rendering failed: {}", e),
        }
        res
    }

    /// Render a request with a caller-supplied random source.
    ///
    /// Consumes `rng` in the same order as [`crate::render`], so both produce
    /// identical images for identical seeds.
    pub async fn render_with_rng<R>(&self, request: &RenderRequest, rng: &mut R) -> Result<RenderedLetter>
    where
        R: Rng + Send + ?Sized,
    {
        let started = Instant::now();
        let plan = LetterPlan::new(request)?;
        let mut canvas = plan.canvas()?;
        let mut cursor = Cursor::origin();

        for line in &plan.lines {
            let glyphs = self.load_line(line, rng).await?;
            rendering::draw_line(&mut canvas, line, glyphs, &mut cursor, &plan.params, rng);
        }

        rendering::finish(&canvas, &plan, started)
    }

    async fn load_line<R>(&self, line: &str, rng: &mut R) -> Result<Vec<Option<Glyph>>>
    where
        R: Rng + Send + ?Sized,
    {
        // Collected in line order so the leftmost failure is the one reported.
        let listings = join_all(line.chars().map(|ch| self.list(ch)))
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        // Picks draw from the request's stream in line order.
        let picks = line
            .chars()
            .zip(listings)
            .map(|(ch, variants)| variants.map(|v| select_variant(ch, v, &mut *rng)).transpose())
            .collect::<Result<Vec<_>>>()?;

        join_all(picks.into_iter().map(|pick| self.load(pick)))
            .await
            .into_iter()
            .collect()
    }

    async fn list(&self, ch: char) -> Result<Option<Vec<C::Variant>>> {
        if ch == SPACE {
            return Ok(None);
        }
        let catalog = Arc::clone(&self.catalog);
        blocking(move || catalog.variants(ch)).await.map(Some)
    }

    async fn load(&self, variant: Option<C::Variant>) -> Result<Option<Glyph>> {
        let Some(variant) = variant else {
            return Ok(None);
        };
        let catalog = Arc::clone(&self.catalog);
        blocking(move || catalog.load(&variant)).await.map(Some)
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::RenderError(format!("glyph loader task failed: {}", e)))?
}
