//! Label compositor and printer driver for Brother P-Touch tape printers.
//!
//! Queued print jobs (text blocks, images, cut marks, padding) are composed
//! into one monochrome strip sized to the installed tape, then streamed
//! column by column as bit-packed raster lines - or written to a PNG file
//! instead of printing.
//!
//! # Example
//!
//! ```rust,no_run
//! use ptlabel::{pipeline, JobQueue, RenderConfig, Target, TrueTypeFont};
//!
//! let mut queue = JobQueue::new();
//! queue.add_text("hello\\nworld", true).unwrap();
//! queue.push_cutmark();
//!
//! let cfg = RenderConfig::default();
//! let font = TrueTypeFont::open(&cfg.font_file).unwrap();
//! pipeline::run(
//!     queue,
//!     &cfg,
//!     &font,
//!     Target::Png { path: "label.png".into(), print_width: 76 },
//! )
//! .unwrap();
//! ```

pub mod canvas;
pub mod compose;
pub mod config;
pub mod device;
pub mod error;
pub mod font;
pub mod imagefile;
pub mod job;
pub mod media;
pub mod model;
pub mod pipeline;
pub mod printer;
pub mod text;

pub use crate::{
    canvas::Canvas,
    config::{Align, RenderConfig},
    device::{Capability, Device},
    error::{Error, PrinterError},
    font::{FontBackend, TextMetrics, TrueTypeFont},
    job::{Job, JobQueue, MAX_LINES},
    model::Model,
    pipeline::{PrintOptions, Target},
    printer::Printer,
};

/// Print width in pixels assumed for 12mm tape when composing without a
/// printer attached (`--writepng` with no `--force-tape-width`).
pub const DEFAULT_TAPE_WIDTH_PX: u32 = 76;
