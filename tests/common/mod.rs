//! Shared helpers: build throwaway glyph catalogs on disk.

#![allow(dead_code)]

use image::{ImageFormat, Rgba, RgbaImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A catalog directory holding one or more variants per character
pub struct TestCatalog {
    pub dir: TempDir,
}

impl TestCatalog {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp catalog"),
        }
    }

    /// Catalog with `variants` solid dark glyphs for every char in `chars`
    pub fn with_chars(chars: &str, variants: usize) -> Self {
        let catalog = Self::new();
        for ch in chars.chars().filter(|c| *c != ' ') {
            for i in 0..variants {
                catalog.add_glyph(ch, &format!("{}.png", i), 8 + i as u32, 12);
            }
        }
        catalog
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn char_dir(&self, ch: char) -> std::path::PathBuf {
        let dir = self.path().join((ch as u32).to_string());
        fs::create_dir_all(&dir).expect("create char dir");
        dir
    }

    pub fn add_glyph(&self, ch: char, file: &str, width: u32, height: u32) {
        let image = RgbaImage::from_pixel(width, height, Rgba([30, 30, 30, 255]));
        image
            .save_with_format(self.char_dir(ch).join(file), ImageFormat::Png)
            .expect("write glyph png");
    }

    pub fn add_file(&self, ch: char, file: &str, contents: &[u8]) {
        fs::write(self.char_dir(ch).join(file), contents).expect("write file");
    }
}
