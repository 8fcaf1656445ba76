//! Render settings threaded through layout and encoding.

/// Horizontal alignment of text lines within their block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Read-mostly settings consumed by the layout engine and the encoder.
///
/// Populated once before the pipeline runs, immutable during a run.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub align: Align,
    /// Path to the TrueType font file used for text jobs.
    pub font_file: String,
    /// Explicit font size in pixels; `0` selects automatic fitting.
    pub font_size: u32,
    pub debug: bool,
    /// Luma cutoff when reducing loaded images to black and white; pixels
    /// darker than or equal to this become ink.
    pub threshold: u8,
    /// Scales the effective line height used by the fit check; `100` keeps
    /// the font's own extent, smaller values pack lines tighter.
    pub line_spacing_percent: u32,
    /// Print white on black.
    pub invert: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            align: Align::Left,
            font_file: String::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
            font_size: 0,
            debug: false,
            threshold: 128,
            line_spacing_percent: 100,
            invert: false,
        }
    }
}

impl RenderConfig {
    pub fn align(self, align: Align) -> Self {
        RenderConfig { align, ..self }
    }

    pub fn font_file(self, font_file: impl Into<String>) -> Self {
        RenderConfig {
            font_file: font_file.into(),
            ..self
        }
    }

    pub fn font_size(self, font_size: u32) -> Self {
        RenderConfig { font_size, ..self }
    }

    pub fn invert(self, invert: bool) -> Self {
        RenderConfig { invert, ..self }
    }
}
