//! Text fitting and layout.
//!
//! Given the lines of one text job and the tape's pixel budget, pick a
//! single font size that fits every line, then paint the lines onto a fresh
//! canvas with baseline compensation and horizontal alignment.

use log::{debug, warn};

use crate::canvas::Canvas;
use crate::config::{Align, RenderConfig};
use crate::error::Error;
use crate::font::FontBackend;

/// Smallest font size the automatic search will try.
const MIN_FONT_PX: u32 = 4;

/// Search ceiling. The backend measures any size without failing, so the
/// scan needs an explicit upper bound.
const MAX_FONT_PX: u32 = 1024;

/// Largest font size whose rendered height fits `want_px`, by linear scan.
///
/// The contract is only "largest size that fits"; the scan order is an
/// implementation detail kept local to this function.
fn find_font_size(
    backend: &dyn FontBackend,
    want_px: u32,
    text: &str,
) -> Result<u32, Error> {
    let mut best = 0;
    for size in MIN_FONT_PX..=MAX_FONT_PX {
        match backend.measure(text, size) {
            Ok(m) if m.height() <= want_px as i32 => best = size,
            _ => break,
        }
    }
    if best == 0 {
        return Err(Error::SizeNotFound(want_px));
    }
    Ok(best)
}

/// Vertical delta between the line's ink bottom and a reference glyph's.
///
/// Compensates for descenders so lines with and without them share a
/// visual baseline.
fn baseline_offset(
    backend: &dyn FontBackend,
    text: &str,
    size: u32,
) -> Result<i32, Error> {
    let reference = backend.measure("o", size)?;
    let line = backend.measure(text, size)?;
    debug!(
        "baseline offset: reference {} line {}",
        reference.y_max, line.y_max
    );
    Ok(line.y_max - reference.y_max)
}

/// Lay out and paint one text job onto a fresh canvas of height
/// `print_width` (the tape's printable pixel count).
///
/// The font size is the configured override, or the minimum over all lines
/// of the largest per-line size that fits `print_width / line_count`. The
/// canvas width is the widest line's extent. A paint failure is logged and
/// does not abort: the canvas stays structurally valid.
pub fn render_text(
    backend: &dyn FontBackend,
    lines: &[String],
    print_width: u32,
    cfg: &RenderConfig,
) -> Result<Canvas, Error> {
    let count = lines.len() as u32;
    debug!(
        "render_text(): {} lines, align = {:?}, {}px of tape",
        count, cfg.align, print_width
    );

    let size = if cfg.font_size > 0 {
        cfg.font_size
    } else {
        let mut min_fit = 0;
        for line in lines {
            let fit = find_font_size(backend, print_width / count, line)?;
            if min_fit == 0 || fit < min_fit {
                min_fit = fit;
            }
        }
        min_fit
    };
    if size == 0 {
        return Err(Error::SizeNotFound(print_width));
    }
    debug!("using font size {}", size);

    let mut canvas_width = 0;
    for line in lines {
        let w = backend.measure(line, size)?.width();
        if w > canvas_width {
            canvas_width = w;
        }
    }
    if canvas_width <= 0 {
        return Err(Error::ZeroWidthText);
    }
    let canvas_width = canvas_width as u32;

    let mut canvas = Canvas::new(canvas_width, print_width);

    let mut max_height = 0;
    for line in lines {
        let h = backend.measure(line, size)?.height();
        if h > max_height {
            max_height = h;
        }
    }
    let line_height = (max_height as u32) * cfg.line_spacing_percent / 100;
    if line_height * count > print_width {
        return Err(Error::LinesTooTall {
            lines: count,
            line_height,
            available: print_width,
        });
    }
    let unused = print_width - line_height * count;

    for (i, line) in lines.iter().enumerate() {
        let metrics = backend.measure(line, size)?;
        let ofs = baseline_offset(backend, line, size)?;
        let mut pos = (i as u32 * (print_width / count)) as i32 + max_height - ofs;
        pos += ((unused / count) / 2) as i32;
        let off_x = -metrics.x_min;
        let align_ofs = match cfg.align {
            Align::Left => 0,
            Align::Center => (canvas_width as i32 - metrics.width()) / 2,
            Align::Right => canvas_width as i32 - metrics.width(),
        };
        if let Err(err) = backend.paint(&mut canvas, line, size, off_x + align_ofs, pos) {
            warn!("painting line {} failed: {}", i, err);
        }
    }
    Ok(canvas)
}
