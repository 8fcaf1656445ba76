//! Error types for label composition and printing.
//!
//! Failures are grouped into four classes - input, layout, size and device -
//! and each class maps to its own process exit code so scripts can tell a
//! bad image path from a dead printer.

use thiserror::Error;

/// Main error type for composing and printing labels.
#[derive(Error, Debug)]
pub enum Error {
    // -- input --
    /// An image job's file could not be read or decoded.
    #[error("cannot load image '{0}'")]
    ImageLoad(String),

    #[error("writing image '{0}' failed")]
    ImageSave(String),

    /// A text continuation would exceed the per-job line limit.
    ///
    /// This aborts input processing; lines are never silently dropped.
    #[error("only up to {0} lines are supported")]
    TooManyLines(usize),

    // -- layout --
    /// No font size renders every line within its share of the tape height.
    #[error("no font size fits {0}px of tape")]
    SizeNotFound(u32),

    #[error("font '{0}' could not be loaded")]
    FontLoad(String),

    /// The font backend reported a zero-width rendering for every line.
    #[error("rendered text has no width")]
    ZeroWidthText,

    #[error("{lines} lines of {line_height}px do not fit {available}px of tape")]
    LinesTooTall {
        lines: u32,
        line_height: u32,
        available: u32,
    },

    // -- size --
    /// The composed strip is taller than the installed tape. Detected once,
    /// after full composition, before any device I/O.
    #[error("image is too large ({width}px x {height}px), maximum printing width for this tape is {max}px")]
    ImageTooLarge { width: u32, height: u32, max: u32 },

    // -- device --
    /// USB communication error.
    ///
    /// Wraps underlying rusb errors for device communication issues,
    /// timeouts, or permission problems.
    #[error(transparent)]
    UsbError(#[from] rusb::Error),

    /// Printer device is not connected or not responding.
    #[error("device is offline")]
    DeviceOffline,

    #[error("can't read device list, permission issue ?")]
    DeviceListNotReadable,

    #[error("device is missing a bulk endpoint")]
    MissingEndpoint,

    /// A bulk write transferred fewer bytes than supplied.
    #[error("short write to printer ({0} bytes)")]
    ShortWrite(usize),

    #[error("status request returned no response")]
    ReadStatusTimeout,

    /// No media width was reported by the printer status.
    #[error("no tape is installed in the printer")]
    NoMediaInstalled,

    /// Hardware-level printer error reported by the device itself.
    #[error(transparent)]
    PrinterError(#[from] PrinterError),
}

impl Error {
    /// Process exit code for this failure class.
    ///
    /// 2 = input, 3 = layout, 4 = size, 5 = device.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ImageLoad(_) | Error::ImageSave(_) | Error::TooManyLines(_) => 2,
            Error::SizeNotFound(_)
            | Error::FontLoad(_)
            | Error::ZeroWidthText
            | Error::LinesTooTall { .. } => 3,
            Error::ImageTooLarge { .. } => 4,
            _ => 5,
        }
    }
}

/// Hardware-specific errors reported by the printer.
///
/// These are parsed from the two error bytes of the printer's status
/// response and indicate physical problems that need user intervention.
#[derive(Error, Debug)]
pub enum PrinterError {
    #[error("no media is installed")]
    NoMedia,

    #[error("end of media")]
    EndOfMedia,

    #[error("cutter jam")]
    CutterJam,

    #[error("printer is in use")]
    PrinterInUse,

    #[error("printer is offline")]
    PrinterOffline,

    #[error("installed media does not match")]
    InvalidMedia,

    #[error("expansion buffer is full")]
    BufferFull,

    #[error("communication error")]
    CommunicationError,

    #[error("cover is open")]
    CoverOpen,

    #[error("media can not be fed")]
    FeedMediaFail,

    #[error("system error")]
    SystemError,

    #[error("unknown error")]
    UnknownError((u8, u8)),
}

impl PrinterError {
    /// Parse the printer error from a 32-byte status buffer.
    ///
    /// Bytes 8 and 9 carry the error bits. Returns `UnknownError((0, 0))`
    /// when no error bit is set.
    pub fn from_buf(buf: [u8; 32]) -> Self {
        let err_1 = buf[8];
        let err_2 = buf[9];

        match err_1 {
            0b0000_0001 => Self::NoMedia,
            0b0000_0010 => Self::EndOfMedia,
            0b0000_0100 => Self::CutterJam,
            0b0001_0000 => Self::PrinterInUse,
            0b0010_0000 => Self::PrinterOffline,
            _ => match err_2 {
                0b0000_0001 => Self::InvalidMedia,
                0b0000_0010 => Self::BufferFull,
                0b0000_0100 => Self::CommunicationError,
                0b0001_0000 => Self::CoverOpen,
                0b0100_0000 => Self::FeedMediaFail,
                0b1000_0000 => Self::SystemError,
                _ => Self::UnknownError((err_1, err_2)),
            },
        }
    }

    /// Check if this represents a "no error" state.
    pub fn is_no_error(&self) -> bool {
        matches!(self, Self::UnknownError((0, 0)))
    }
}
