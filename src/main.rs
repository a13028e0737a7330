use anyhow::Context;
use clap::Parser;
use handletter::{DirCatalog, LettererConfig, RenderRequest};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Read, Write};
use std::path::PathBuf;

/// Render text as a hand-lettered PNG
#[derive(Debug, Parser)]
#[command(name = "handletter", version, about)]
struct Cli {
    /// Text to render; read from stdin when omitted
    prompt: Option<String>,

    /// JSON request file (same shape as the web form); flags override it
    #[arg(long, conflicts_with = "prompt")]
    request: Option<PathBuf>,

    /// Glyph catalog directory [env: HANDLETTER_ASSETS]
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Seed for reproducible output [env: HANDLETTER_SEED]
    #[arg(long)]
    seed: Option<u64>,

    /// Leave the background transparent
    #[arg(long)]
    transparent: bool,

    #[arg(long, value_name = "0..1")]
    line_spacing: Option<f64>,

    #[arg(long, value_name = "0..1")]
    letter_spacing: Option<f64>,

    #[arg(long, value_name = "0..1")]
    position_jitter: Option<f64>,

    #[arg(long, value_name = "0..1")]
    rotation_jitter: Option<f64>,

    #[arg(long, value_name = "0..1")]
    size_jitter: Option<f64>,

    /// Output file; `-` writes raw PNG bytes to stdout
    #[arg(short, long, default_value = "letter.png")]
    output: PathBuf,

    /// Print the PNG as base64 instead of writing a file
    #[arg(long)]
    base64: bool,
}

impl Cli {
    fn request(&self) -> anyhow::Result<RenderRequest> {
        let mut request = match (&self.request, &self.prompt) {
            (Some(path), _) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed reading {}", path.display()))?;
                RenderRequest::from_json(&json)?
            }
            (None, Some(prompt)) => RenderRequest::new(prompt.clone()),
            (None, None) => {
                let mut prompt = String::new();
                io::stdin()
                    .read_to_string(&mut prompt)
                    .context("failed reading prompt from stdin")?;
                RenderRequest::new(prompt)
            }
        };

        if self.transparent {
            request.transparent = true;
        }
        let f = &mut request.factors;
        override_factor(&mut f.line_spacing_factor, self.line_spacing);
        override_factor(&mut f.letter_spacing_factor, self.letter_spacing);
        override_factor(&mut f.position_random_offset_factor, self.position_jitter);
        override_factor(&mut f.rotation_random_degree_factor, self.rotation_jitter);
        override_factor(&mut f.size_random_factor, self.size_jitter);
        Ok(request)
    }

    fn config(&self) -> anyhow::Result<LettererConfig> {
        let mut config = LettererConfig::from_env()?;
        if let Some(dir) = &self.assets {
            config.catalog_dir = dir.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn override_factor(slot: &mut Option<f64>, value: Option<f64>) {
    if value.is_some() {
        *slot = value;
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.config()?;
    let request = cli.request()?;

    let catalog = DirCatalog::new(&config.catalog_dir);
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let letter = handletter::render(&request, &catalog, &mut rng)?;
    info!(
        "Image was generated! Took time: {:?}. Image size: {}x{} ({} lines, sha256 {})",
        letter.elapsed,
        letter.width,
        letter.height,
        letter.line_count,
        letter.digest()
    );

    if cli.base64 {
        println!("{}", letter.to_base64());
    } else if cli.output.as_os_str() == "-" {
        let mut out = io::stdout().lock();
        out.write_all(&letter.png_data)?;
        out.flush()?;
    } else {
        std::fs::write(&cli.output, &letter.png_data)
            .with_context(|| format!("failed writing {}", cli.output.display()))?;
    }
    Ok(())
}
