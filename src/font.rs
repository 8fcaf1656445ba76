//! Glyph measurement and painting.
//!
//! The layout engine talks to fonts only through [`FontBackend`], so tests
//! can substitute a deterministic backend for a real TrueType face.

use std::fs;
use std::path::Path;

use rusttype::{point, Font, Scale};

use crate::canvas::Canvas;
use crate::error::Error;

/// Ink extent of a rendered string, relative to the baseline origin.
///
/// Coordinates grow rightwards and downwards: `y_min` is negative for ink
/// above the baseline, `y_max` positive for descenders below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextMetrics {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl TextMetrics {
    pub fn width(&self) -> i32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> i32 {
        self.y_max - self.y_min
    }
}

/// Measures and paints text for the layout engine.
pub trait FontBackend {
    /// Bounding box of `text` rendered at `size` pixels, without painting.
    fn measure(&self, text: &str, size: u32) -> Result<TextMetrics, Error>;

    /// Paint `text` onto `canvas` with the baseline origin at `(x, y)`.
    ///
    /// Errors reported here are cosmetic: the layout engine logs them and
    /// keeps the structurally valid canvas.
    fn paint(
        &self,
        canvas: &mut Canvas,
        text: &str,
        size: u32,
        x: i32,
        y: i32,
    ) -> Result<(), Error>;
}

/// Coverage above which an anti-aliased glyph pixel becomes ink.
const INK_COVERAGE: f32 = 0.5;

/// A TrueType face loaded from a font file.
pub struct TrueTypeFont {
    font: Font<'static>,
}

impl TrueTypeFont {
    /// Load a `.ttf`/`.otf` file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = fs::read(path)
            .map_err(|_| Error::FontLoad(path.display().to_string()))?;
        let font = Font::try_from_vec(data)
            .ok_or_else(|| Error::FontLoad(path.display().to_string()))?;
        Ok(TrueTypeFont { font })
    }
}

impl FontBackend for TrueTypeFont {
    fn measure(&self, text: &str, size: u32) -> Result<TextMetrics, Error> {
        let scale = Scale::uniform(size as f32);
        let mut metrics: Option<TextMetrics> = None;
        for glyph in self.font.layout(text, scale, point(0.0, 0.0)) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                let m = metrics.get_or_insert(TextMetrics {
                    x_min: bb.min.x,
                    y_min: bb.min.y,
                    x_max: bb.max.x,
                    y_max: bb.max.y,
                });
                m.x_min = m.x_min.min(bb.min.x);
                m.y_min = m.y_min.min(bb.min.y);
                m.x_max = m.x_max.max(bb.max.x);
                m.y_max = m.y_max.max(bb.max.y);
            }
        }
        // whitespace-only text has no ink extent at all
        Ok(metrics.unwrap_or_default())
    }

    fn paint(
        &self,
        canvas: &mut Canvas,
        text: &str,
        size: u32,
        x: i32,
        y: i32,
    ) -> Result<(), Error> {
        let scale = Scale::uniform(size as f32);
        for glyph in self.font.layout(text, scale, point(x as f32, y as f32)) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, coverage| {
                    if coverage > INK_COVERAGE {
                        canvas.set(bb.min.x + gx as i32, bb.min.y + gy as i32, true);
                    }
                });
            }
        }
        Ok(())
    }
}
