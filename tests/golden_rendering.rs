mod common;

use std::fs;
use std::path::PathBuf;

use common::TestCatalog;
use handletter::{DirCatalog, Factors, RenderRequest};
use rand::rngs::StdRng;
use rand::SeedableRng;

const MARGIN: u32 = 10;
const CELL_W: u32 = 20;
const CELL_H: u32 = 30;
const INK: [u8; 4] = [30, 30, 30, 255];
const PAPER: [u8; 4] = [255, 255, 255, 255];

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

fn render_fixture() -> handletter::RenderedLetter {
    let glyphs = TestCatalog::with_chars("thequickbrownfx,.'", 3);
    let catalog = DirCatalog::new(glyphs.path());
    let request = RenderRequest::new("The quick, brown 'fox'.");
    handletter::render(&request, &catalog, &mut StdRng::seed_from_u64(1234)).expect("render fixture")
}

/// No jitter or spacing: every glyph fills its grid cell exactly.
fn render_rigid() -> handletter::RenderedLetter {
    let glyphs = TestCatalog::with_chars("thequickbrownfxjmpsvlazydg", 2);
    let catalog = DirCatalog::new(glyphs.path());
    let request = RenderRequest::new("The quick brown fox jumps over the lazy dog")
        .with_factors(Factors::uniform(0.0));
    handletter::render(&request, &catalog, &mut StdRng::seed_from_u64(1234)).expect("render rigid")
}

/// Render each grid cell as `#` (ink at its center) or `.` (bare paper).
fn cell_map(letter: &handletter::RenderedLetter) -> String {
    let img = image::load_from_memory(&letter.png_data).unwrap().to_rgba8();
    let cols = (img.width() - 2 * MARGIN) / CELL_W;
    let rows = (img.height() - 2 * MARGIN) / CELL_H;

    let mut out = String::new();
    for row in 0..rows {
        for col in 0..cols {
            let x = MARGIN + col * CELL_W + CELL_W / 2;
            let y = MARGIN + row * CELL_H + CELL_H / 2;
            let px = img.get_pixel(x, y).0;
            let close = |want: [u8; 4]| px.iter().zip(want).all(|(a, b)| a.abs_diff(b) <= 1);
            out.push(if close(INK) {
                '#'
            } else if px == PAPER {
                '.'
            } else {
                '?'
            });
        }
        out.push('\n');
    }
    out
}

#[test]
fn same_seed_gives_identical_png() {
    assert_eq!(render_fixture().png_data, render_fixture().png_data);
}

#[test]
fn rigid_letter_matches_cell_golden() {
    let letter = render_rigid();
    assert_eq!((letter.width, letter.height), (420, 110));

    let expected_path = golden_path("rigid_fox.cells");
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::write(&expected_path, cell_map(&letter)).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    let exp = fs::read_to_string(&expected_path).expect("unable to read golden");
    assert_eq!(cell_map(&letter), exp);
}

#[test]
fn golden_letter_matches_digest() {
    let letter = render_fixture();

    let expected_path = golden_path("quick_fox.sha256");
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::write(&expected_path, letter.digest()).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    // The digest pins the exact encoder output; record it with UPDATE_GOLDENS=1.
    if let Ok(exp) = fs::read_to_string(&expected_path) {
        assert_eq!(letter.digest(), exp.trim());
    }
}
