//! Command line front end.
//!
//! Print commands (`--text`, `--image`, `--cutmark`, `--pad`, `--newline`)
//! are replayed in their original argv order to build the job queue, so
//! `--text A --cutmark --text B` composes exactly in that order.

use std::process;

use clap::{Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;

use ptlabel::{
    pipeline, Align, Device, Error, JobQueue, Model, PrintOptions, Printer, RenderConfig,
    Target, TrueTypeFont, DEFAULT_TAPE_WIDTH_PX,
};

fn cli() -> Command {
    Command::new("ptlabel")
        .about("Print labels with images or text on a Brother P-Touch")
        .arg(
            Arg::new("debug")
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Enable debug output"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .help("Enable verbose output (same as --debug)"),
        )
        .arg(
            Arg::new("invert")
                .long("invert")
                .action(ArgAction::SetTrue)
                .help("Invert output (print white on black background)"),
        )
        .arg(
            Arg::new("font")
                .long("font")
                .value_name("file")
                .help("Use font <file>"),
        )
        .arg(
            Arg::new("fontsize")
                .long("fontsize")
                .value_name("size")
                .value_parser(clap::value_parser!(u32))
                .default_value("0")
                .help("Manually set font size"),
        )
        .arg(
            Arg::new("writepng")
                .long("writepng")
                .value_name("file")
                .help("Instead of printing, write output to png <file>"),
        )
        .arg(
            Arg::new("force-tape-width")
                .long("force-tape-width")
                .value_name("px")
                .value_parser(clap::value_parser!(u32))
                .requires("writepng")
                .conflicts_with("info")
                .help("Set tape width in pixels, for --writepng without a printer connected"),
        )
        .arg(
            Arg::new("copies")
                .long("copies")
                .value_name("number")
                .value_parser(clap::value_parser!(u32))
                .default_value("1")
                .help("Sets the number of identical prints"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("seconds")
                .value_parser(clap::value_parser!(u64))
                .default_value("1")
                .help("Timeout waiting for the previous job to finish, 0 means infinity"),
        )
        .arg(
            Arg::new("threshold")
                .long("threshold")
                .value_name("0-255")
                .value_parser(clap::value_parser!(u8))
                .default_value("128")
                .help("Black/white threshold for loaded images"),
        )
        .arg(
            Arg::new("line-spacing")
                .long("line-spacing")
                .value_name("percent")
                .value_parser(clap::value_parser!(u32))
                .default_value("100")
                .help("Line spacing percent, values below 100 pack lines tighter"),
        )
        .arg(
            Arg::new("align")
                .long("align")
                .short('a')
                .value_name("l|c|r")
                .default_value("l")
                .help("Align text (when printing multiple lines)"),
        )
        .arg(
            Arg::new("text")
                .long("text")
                .short('t')
                .value_name("text")
                .action(ArgAction::Append)
                .help("Print a line of text; \\n inside the text starts a new line"),
        )
        .arg(
            Arg::new("newline")
                .long("newline")
                .short('n')
                .value_name("text")
                .action(ArgAction::Append)
                .help("Add text as a new line of the preceding text block"),
        )
        .arg(
            Arg::new("image")
                .long("image")
                .short('i')
                .value_name("file")
                .action(ArgAction::Append)
                .help("Print the given image, which must be a black/white png ('-' reads stdin)"),
        )
        .arg(
            Arg::new("pad")
                .long("pad")
                .short('p')
                .value_name("n")
                .value_parser(clap::value_parser!(u32))
                .action(ArgAction::Append)
                .help("Add n pixels of blank tape"),
        )
        .arg(
            Arg::new("cutmark")
                .long("cutmark")
                .short('c')
                .action(ArgAction::Count)
                .help("Print a mark where the tape should be cut"),
        )
        .arg(
            Arg::new("chain")
                .long("chain")
                .action(ArgAction::SetTrue)
                .help("Skip the final feed of the label and any automatic cut"),
        )
        .arg(
            Arg::new("precut")
                .long("precut")
                .action(ArgAction::SetTrue)
                .help("Add a cut before the label (for chain mode cuts with minimal waste)"),
        )
        .arg(
            Arg::new("info")
                .long("info")
                .action(ArgAction::SetTrue)
                .help("Show info about the detected tape"),
        )
        .arg(
            Arg::new("list-supported")
                .long("list-supported")
                .action(ArgAction::SetTrue)
                .help("Show printers supported by this version"),
        )
}

enum Cmd {
    Text(String),
    Newline(String),
    Image(String),
    Pad(u32),
    Cutmark,
}

/// Replay the print commands in argv order into a job queue.
fn build_queue(matches: &ArgMatches) -> Result<JobQueue, Error> {
    let mut entries: Vec<(usize, Cmd)> = Vec::new();

    if let (Some(values), Some(indices)) =
        (matches.get_many::<String>("text"), matches.indices_of("text"))
    {
        for (value, index) in values.zip(indices) {
            entries.push((index, Cmd::Text(value.clone())));
        }
    }
    if let (Some(values), Some(indices)) = (
        matches.get_many::<String>("newline"),
        matches.indices_of("newline"),
    ) {
        for (value, index) in values.zip(indices) {
            entries.push((index, Cmd::Newline(value.clone())));
        }
    }
    if let (Some(values), Some(indices)) = (
        matches.get_many::<String>("image"),
        matches.indices_of("image"),
    ) {
        for (value, index) in values.zip(indices) {
            entries.push((index, Cmd::Image(value.clone())));
        }
    }
    if let (Some(values), Some(indices)) =
        (matches.get_many::<u32>("pad"), matches.indices_of("pad"))
    {
        for (value, index) in values.zip(indices) {
            entries.push((index, Cmd::Pad(*value)));
        }
    }
    if let Some(indices) = matches.indices_of("cutmark") {
        for index in indices {
            entries.push((index, Cmd::Cutmark));
        }
    }

    entries.sort_by_key(|(index, _)| *index);

    let mut queue = JobQueue::new();
    for (_, cmd) in entries {
        match cmd {
            Cmd::Text(text) => queue.add_text(&text, true)?,
            Cmd::Newline(text) => queue.add_text(&text, false)?,
            Cmd::Image(path) => queue.push_image(path),
            Cmd::Pad(length) => queue.push_pad(length),
            Cmd::Cutmark => queue.push_cutmark(),
        }
    }
    Ok(queue)
}

fn render_config(matches: &ArgMatches, debug: bool) -> RenderConfig {
    let mut cfg = RenderConfig::default();
    cfg.debug = debug;
    if let Some(font) = matches.get_one::<String>("font") {
        cfg.font_file = font.clone();
    }
    cfg.font_size = *matches.get_one::<u32>("fontsize").unwrap();
    cfg.threshold = *matches.get_one::<u8>("threshold").unwrap();
    cfg.line_spacing_percent = *matches.get_one::<u32>("line-spacing").unwrap();
    cfg.invert = matches.get_flag("invert");
    cfg.align = match matches.get_one::<String>("align").unwrap().as_str() {
        "c" | "center" => Align::Center,
        "r" | "right" => Align::Right,
        _ => Align::Left,
    };
    cfg
}

fn run(matches: &ArgMatches, cfg: &RenderConfig) -> Result<(), Error> {
    let queue = build_queue(matches)?;
    let timeout = *matches.get_one::<u64>("timeout").unwrap();

    if matches.get_flag("info") {
        let mut printer = Printer::open()?;
        printer.init()?;
        printer.request_status(timeout)?;
        println!(
            "maximum printing width for this printer is {}px",
            printer.max_head_px()
        );
        println!(
            "maximum printing width for this tape is {}px",
            printer.tape_width_px()
        );
        if let Some(status) = printer.status() {
            println!("media width = {} mm", status.media_width);
        }
        return Ok(());
    }

    let font = TrueTypeFont::open(&cfg.font_file)?;

    if let Some(path) = matches.get_one::<String>("writepng") {
        let print_width = matches
            .get_one::<u32>("force-tape-width")
            .copied()
            .unwrap_or(DEFAULT_TAPE_WIDTH_PX);
        return pipeline::run(
            queue,
            cfg,
            &font,
            Target::Png {
                path: path.clone(),
                print_width,
            },
        );
    }

    let mut printer = Printer::open()?;
    printer.init()?;
    printer.request_status(timeout)?;
    if printer.tape_width_px() == 0 {
        return Err(Error::NoMediaInstalled);
    }

    let options = PrintOptions {
        chain: matches.get_flag("chain"),
        precut: matches.get_flag("precut"),
        copies: *matches.get_one::<u32>("copies").unwrap(),
    };
    pipeline::run(
        queue,
        cfg,
        &font,
        Target::Printer {
            device: &mut printer,
            options,
        },
    )
}

fn main() {
    let matches = cli().get_matches();
    let debug = matches.get_flag("debug") || matches.get_flag("verbose");
    env_logger::Builder::from_default_env()
        .filter_level(if debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    if matches.get_flag("list-supported") {
        println!("supported printers:");
        for model in Model::ALL.iter() {
            println!("  {}", model.name());
        }
        return;
    }

    let cfg = render_config(&matches, debug);
    if let Err(err) = run(&matches, &cfg) {
        eprintln!("ptlabel: {}", err);
        process::exit(err.exit_code());
    }
}
