//! Drives the job queue through layout and composition, then streams the
//! finished strip to a printer or a PNG file.
//!
//! Strictly sequential: each job is produced and folded before the next
//! one begins, and a failure anywhere aborts the whole run with no partial
//! output.

use log::{debug, info};

use crate::canvas::Canvas;
use crate::compose::{append, cutmark, padding};
use crate::config::RenderConfig;
use crate::device::{Capability, Device};
use crate::error::Error;
use crate::font::FontBackend;
use crate::imagefile;
use crate::job::{Job, JobQueue};
use crate::text::render_text;

/// Printer-side options for one run.
#[derive(Debug, Clone)]
pub struct PrintOptions {
    /// Skip the final feed and cut so consecutive labels stay joined.
    pub chain: bool,
    /// Cut before the label begins, to minimize waste in chain mode.
    pub precut: bool,
    /// Number of identical prints.
    pub copies: u32,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            chain: false,
            precut: false,
            copies: 1,
        }
    }
}

/// Where a run sends the composed strip.
pub enum Target<'a> {
    Printer {
        device: &'a mut dyn Device,
        options: PrintOptions,
    },
    Png {
        path: String,
        print_width: u32,
    },
}

/// Consume the queue and fold every job's canvas into one strip.
///
/// Returns `None` for an empty queue. With the invert flag set the
/// finished composite is flipped as a whole, not per job.
pub fn compose(
    queue: JobQueue,
    backend: &dyn FontBackend,
    print_width: u32,
    cfg: &RenderConfig,
) -> Result<Option<Canvas>, Error> {
    let mut out: Option<Canvas> = None;
    for job in queue {
        let part = match job {
            Job::Text(lines) => render_text(backend, &lines, print_width, cfg)?,
            Job::Image(path) => imagefile::load(&path, cfg.threshold)?,
            Job::Cutmark => cutmark(print_width),
            Job::Pad(length) => padding(print_width, length),
        };
        out = append(out, Some(part));
    }
    Ok(match out {
        Some(c) if cfg.invert => Some(c.inverted()),
        other => other,
    })
}

/// Set bit `pixel` in a raster line, counted from the printable edge.
/// Out-of-range pixels are dropped.
fn rasterline_set_pixel(line: &mut [u8], pixel: i64) {
    if pixel < 0 || pixel >= (line.len() * 8) as i64 {
        return;
    }
    let pixel = pixel as usize;
    line[(line.len() - 1) - pixel / 8] |= 1 << (pixel % 8);
}

/// Stream one copy of the strip to the device.
///
/// The strip is centered on the print head; columns walk left to right,
/// each packed bottom-up to match the head's bit ordering. Preamble
/// commands are sequenced by capability, chain after precut so a precut
/// can land before a chained run.
pub fn print(
    device: &mut dyn Device,
    canvas: &Canvas,
    options: &PrintOptions,
) -> Result<(), Error> {
    let tape_width = device.tape_width_px();
    let max_px = device.max_head_px();
    if canvas.height() > tape_width {
        return Err(Error::ImageTooLarge {
            width: canvas.width(),
            height: canvas.height(),
            max: tape_width,
        });
    }
    debug!("strip size {}px x {}px", canvas.width(), canvas.height());

    let offset = (max_px / 2) as i64 - (canvas.height() / 2) as i64;
    let caps = device.capabilities();
    if caps.contains(Capability::PACKBITS) {
        debug!("enable packbits mode");
        device.enable_compression()?;
    }
    device.raster_start()?;
    if caps.contains(Capability::INFO_CMD) {
        debug!("send print information command");
        device.send_info(canvas.width())?;
    }
    if caps.contains(Capability::VENDOR_MAGIC) {
        debug!("send vendor magic commands");
        device.send_vendor_magic()?;
    }
    if caps.contains(Capability::PRECUT) && options.precut {
        debug!("send precut command");
        device.send_precut()?;
    }
    if caps.contains(Capability::VENDOR_MAGIC) && options.chain {
        debug!("send chain command");
        device.send_chain()?;
    }

    let mut line = vec![0u8; (max_px / 8) as usize];
    for x in 0..canvas.width() {
        for byte in line.iter_mut() {
            *byte = 0;
        }
        for i in 0..canvas.height() {
            if canvas.get(x, canvas.height() - 1 - i) {
                rasterline_set_pixel(&mut line, offset + i as i64);
            }
        }
        device.send_raster_line(&line)?;
    }
    Ok(())
}

/// Run the whole pipeline: compose the queue, then print it (repeating for
/// copies, reusing the finished strip read-only) or write it to a PNG.
pub fn run(
    queue: JobQueue,
    cfg: &RenderConfig,
    backend: &dyn FontBackend,
    target: Target,
) -> Result<(), Error> {
    let print_width = match &target {
        Target::Printer { device, .. } => device.tape_width_px().min(device.max_head_px()),
        Target::Png { print_width, .. } => *print_width,
    };

    let out = match compose(queue, backend, print_width, cfg)? {
        Some(canvas) => canvas,
        None => {
            info!("nothing to print");
            return Ok(());
        }
    };

    match target {
        Target::Png { path, .. } => imagefile::save(&out, &path),
        Target::Printer { device, options } => {
            for i in 0..options.copies {
                print(device, &out, &options)?;
                device.finalize(options.chain || i + 1 < options.copies)?;
            }
            Ok(())
        }
    }
}
