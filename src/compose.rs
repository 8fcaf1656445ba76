//! Pure bitmap operations used to assemble the output strip.
//!
//! `append` is the fold operator of the print pipeline: each job produces a
//! canvas, and the strip is built by concatenating them end to end.

use crate::canvas::Canvas;

/// Width of the cut-here marker in pixels.
pub const CUTMARK_WIDTH: u32 = 9;

/// Largest accepted padding length in pixels.
pub const PADDING_MAX: u32 = 256;

/// Concatenate two canvases end to end.
///
/// The result is as tall as the taller input and as wide as both inputs
/// together; `first` lands at x offset 0, `second` right after it. `None`
/// is the identity element, and two absent inputs yield `None`.
pub fn append(first: Option<Canvas>, second: Option<Canvas>) -> Option<Canvas> {
    let width = first.as_ref().map_or(0, |c| c.width())
        + second.as_ref().map_or(0, |c| c.width());
    let height = first
        .as_ref()
        .map_or(0, |c| c.height())
        .max(second.as_ref().map_or(0, |c| c.height()));
    if width == 0 || height == 0 {
        return None;
    }
    let mut out = Canvas::new(width, height);
    let mut x = 0;
    if let Some(c) = &first {
        out.copy_from(c, 0, 0);
        x = c.width();
    }
    if let Some(c) = &second {
        out.copy_from(c, x, 0);
    }
    Some(out)
}

/// A dashed vertical "cut here" line, 3 px blank then 3 px ink, centered in
/// a [`CUTMARK_WIDTH`] wide strip spanning the full tape height.
pub fn cutmark(print_width: u32) -> Canvas {
    let mut out = Canvas::new(CUTMARK_WIDTH, print_width);
    for y in 0..print_width {
        if y % 6 >= 3 {
            out.set((CUTMARK_WIDTH / 2) as i32, y as i32, true);
        }
    }
    out
}

/// Blank tape of the given length in pixels.
///
/// Lengths outside `[1, PADDING_MAX]` silently become 1 instead of failing.
pub fn padding(print_width: u32, length: u32) -> Canvas {
    let length = if length < 1 || length > PADDING_MAX {
        1
    } else {
        length
    };
    Canvas::new(length, print_width)
}
