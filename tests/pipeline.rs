//! Integration tests for the full compose → encode chain, driven against
//! an in-memory device that records the command stream.

use ptlabel::{
    pipeline, Align, Canvas, Capability, Device, Error, FontBackend, JobQueue, PrintOptions,
    RenderConfig, Target, TextMetrics,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Deterministic font: every glyph cell is `size` px square, no descenders.
struct FakeFont;

impl FontBackend for FakeFont {
    fn measure(&self, text: &str, size: u32) -> Result<TextMetrics, Error> {
        let size = size as i32;
        Ok(TextMetrics {
            x_min: 0,
            y_min: -size,
            x_max: size * text.chars().count() as i32,
            y_max: 0,
        })
    }

    fn paint(
        &self,
        canvas: &mut Canvas,
        text: &str,
        size: u32,
        x: i32,
        y: i32,
    ) -> Result<(), Error> {
        let m = self.measure(text, size)?;
        for py in (y + m.y_min)..(y + m.y_max) {
            for px in (x + m.x_min)..(x + m.x_max) {
                canvas.set(px, py, true);
            }
        }
        Ok(())
    }
}

/// Records every protocol call; optionally fails after N raster lines.
struct MockDevice {
    tape_px: u32,
    max_px: u32,
    caps: Capability,
    commands: Vec<String>,
    lines: Vec<Vec<u8>>,
    fail_after_lines: Option<usize>,
}

impl MockDevice {
    fn new(tape_px: u32, max_px: u32, caps: Capability) -> Self {
        MockDevice {
            tape_px,
            max_px,
            caps,
            commands: Vec::new(),
            lines: Vec::new(),
            fail_after_lines: None,
        }
    }
}

impl Device for MockDevice {
    fn tape_width_px(&self) -> u32 {
        self.tape_px
    }

    fn max_head_px(&self) -> u32 {
        self.max_px
    }

    fn capabilities(&self) -> Capability {
        self.caps
    }

    fn enable_compression(&mut self) -> Result<(), Error> {
        self.commands.push("compression".into());
        Ok(())
    }

    fn raster_start(&mut self) -> Result<(), Error> {
        self.commands.push("raster_start".into());
        Ok(())
    }

    fn send_info(&mut self, width_px: u32) -> Result<(), Error> {
        self.commands.push(format!("info({})", width_px));
        Ok(())
    }

    fn send_vendor_magic(&mut self) -> Result<(), Error> {
        self.commands.push("magic".into());
        Ok(())
    }

    fn send_precut(&mut self) -> Result<(), Error> {
        self.commands.push("precut".into());
        Ok(())
    }

    fn send_chain(&mut self) -> Result<(), Error> {
        self.commands.push("chain".into());
        Ok(())
    }

    fn send_raster_line(&mut self, line: &[u8]) -> Result<(), Error> {
        if let Some(limit) = self.fail_after_lines {
            if self.lines.len() >= limit {
                return Err(Error::ShortWrite(0));
            }
        }
        self.lines.push(line.to_vec());
        Ok(())
    }

    fn finalize(&mut self, more_follows: bool) -> Result<(), Error> {
        self.commands.push(format!("finalize({})", more_follows));
        Ok(())
    }
}

fn text_queue(text: &str) -> JobQueue {
    let mut queue = JobQueue::new();
    queue.add_text(text, true).unwrap();
    queue
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

#[test]
fn queue_folds_into_one_strip() {
    let mut queue = text_queue("Hello");
    queue.push_cutmark();
    queue.push_pad(10);

    let cfg = RenderConfig::default();
    let out = pipeline::compose(queue, &FakeFont, 40, &cfg).unwrap().unwrap();

    // "Hello" lays out at size 40, five glyph cells wide, then 9px of
    // cutmark and 10px of padding
    assert_eq!(out.width(), 5 * 40 + 9 + 10);
    assert_eq!(out.height(), 40);
}

#[test]
fn empty_queue_composes_to_nothing() {
    let cfg = RenderConfig::default();
    let out = pipeline::compose(JobQueue::new(), &FakeFont, 40, &cfg).unwrap();
    assert!(out.is_none());
}

#[test]
fn invert_flips_the_finished_composite() {
    let mut queue = JobQueue::new();
    queue.push_pad(5);

    let cfg = RenderConfig::default().invert(true);
    let out = pipeline::compose(queue, &FakeFont, 8, &cfg).unwrap().unwrap();
    for x in 0..5 {
        for y in 0..8 {
            assert!(out.get(x, y), "pixel ({}, {}) should be ink", x, y);
        }
    }
}

#[test]
fn layout_failure_aborts_composition() {
    // 3px of tape fits no font size (the scan starts at 4)
    let cfg = RenderConfig::default();
    let err = pipeline::compose(text_queue("abc"), &FakeFont, 3, &cfg).unwrap_err();
    assert!(matches!(err, Error::SizeNotFound(_)));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn bad_image_path_aborts_composition() {
    let mut queue = JobQueue::new();
    queue.push_image("/nonexistent/label.png");
    let cfg = RenderConfig::default();
    let err = pipeline::compose(queue, &FakeFont, 40, &cfg).unwrap_err();
    assert!(matches!(err, Error::ImageLoad(_)));
}

// ---------------------------------------------------------------------------
// Raster encoding
// ---------------------------------------------------------------------------

#[test]
fn columns_encode_bottom_up_with_centering_offset() {
    // 2x4 strip on an 8px head: one raster byte per column, offset
    // (8/2)-(4/2) = 2
    let mut canvas = Canvas::new(2, 4);
    canvas.set(0, 3, true); // bottom row -> bit offset+0
    canvas.set(0, 0, true); // top row -> bit offset+3
    canvas.set(1, 1, true); // -> bit offset+2

    let mut dev = MockDevice::new(8, 8, Capability::empty());
    pipeline::print(&mut dev, &canvas, &PrintOptions::default()).unwrap();

    assert_eq!(dev.lines, vec![vec![0x24], vec![0x10]]);
    assert_eq!(dev.commands, vec!["raster_start"]);
}

#[test]
fn preamble_follows_capabilities_in_order() {
    let canvas = Canvas::new(3, 4);
    let caps = Capability::PACKBITS
        | Capability::INFO_CMD
        | Capability::VENDOR_MAGIC
        | Capability::PRECUT;
    let mut dev = MockDevice::new(8, 8, caps);
    let options = PrintOptions {
        chain: true,
        precut: true,
        copies: 1,
    };
    pipeline::print(&mut dev, &canvas, &options).unwrap();

    assert_eq!(
        dev.commands,
        vec![
            "compression",
            "raster_start",
            "info(3)",
            "magic",
            "precut",
            "chain"
        ]
    );
    assert_eq!(dev.lines.len(), 3);
}

#[test]
fn precut_and_chain_are_opt_in() {
    let canvas = Canvas::new(1, 4);
    let caps = Capability::VENDOR_MAGIC | Capability::PRECUT;
    let mut dev = MockDevice::new(8, 8, caps);
    pipeline::print(&mut dev, &canvas, &PrintOptions::default()).unwrap();
    assert_eq!(dev.commands, vec!["raster_start", "magic"]);
}

#[test]
fn oversized_strip_fails_before_any_device_io() {
    let canvas = Canvas::new(2, 6);
    let mut dev = MockDevice::new(4, 8, Capability::empty());
    let err = pipeline::print(&mut dev, &canvas, &PrintOptions::default()).unwrap_err();
    assert!(matches!(err, Error::ImageTooLarge { height: 6, max: 4, .. }));
    assert_eq!(err.exit_code(), 4);
    assert!(dev.commands.is_empty());
    assert!(dev.lines.is_empty());
}

#[test]
fn raster_write_failure_aborts_remaining_columns() {
    let canvas = Canvas::new(5, 4);
    let mut dev = MockDevice::new(8, 8, Capability::empty());
    dev.fail_after_lines = Some(2);
    let err = pipeline::print(&mut dev, &canvas, &PrintOptions::default()).unwrap_err();
    assert_eq!(err.exit_code(), 5);
    assert_eq!(dev.lines.len(), 2);
}

// ---------------------------------------------------------------------------
// Full runs
// ---------------------------------------------------------------------------

#[test]
fn copies_reuse_the_strip_and_keep_the_label_until_the_last() {
    let mut dev = MockDevice::new(16, 16, Capability::empty());
    let cfg = RenderConfig::default();
    let options = PrintOptions {
        chain: false,
        precut: false,
        copies: 3,
    };
    pipeline::run(
        text_queue("ab"),
        &cfg,
        &FakeFont,
        Target::Printer {
            device: &mut dev,
            options,
        },
    )
    .unwrap();

    let finalizes: Vec<&String> = dev
        .commands
        .iter()
        .filter(|c| c.starts_with("finalize"))
        .collect();
    assert_eq!(finalizes, ["finalize(true)", "finalize(true)", "finalize(false)"]);
    // 16px budget -> size 16, two glyph cells, three copies of 32 columns
    assert_eq!(dev.lines.len(), 3 * 32);
}

#[test]
fn chain_mode_never_ejects() {
    let mut dev = MockDevice::new(16, 16, Capability::empty());
    let cfg = RenderConfig::default();
    let options = PrintOptions {
        chain: true,
        precut: false,
        copies: 1,
    };
    pipeline::run(
        text_queue("a"),
        &cfg,
        &FakeFont,
        Target::Printer {
            device: &mut dev,
            options,
        },
    )
    .unwrap();
    assert!(dev.commands.contains(&"finalize(true)".to_string()));
}

#[test]
fn layout_failure_reaches_no_device() {
    let mut dev = MockDevice::new(3, 8, Capability::empty());
    let cfg = RenderConfig::default();
    let err = pipeline::run(
        text_queue("too long a line for this width"),
        &cfg,
        &FakeFont,
        Target::Printer {
            device: &mut dev,
            options: PrintOptions::default(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::SizeNotFound(_)));
    assert!(dev.commands.is_empty());
    assert!(dev.lines.is_empty());
}

#[test]
fn alignment_is_threaded_through_the_pipeline() {
    let mut queue = JobQueue::new();
    queue.add_text("ab\\na", true).unwrap();
    let cfg = RenderConfig::default().align(Align::Right);
    let out = pipeline::compose(queue, &FakeFont, 16, &cfg).unwrap().unwrap();
    // second line is one 8px cell, right-aligned in a 16px wide canvas
    assert!(!out.get(0, 12));
    assert!(out.get(15, 12));
}
