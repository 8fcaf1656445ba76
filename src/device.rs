//! Wire-level interface the raster encoder drives.
//!
//! The pipeline decides *whether* and *in what order* protocol commands are
//! sent; the byte sequences themselves are owned by the implementation
//! behind this trait.

use bitflags::bitflags;

use crate::error::Error;

bitflags! {
    /// Per-model protocol quirks reported by the device.
    pub struct Capability: u32 {
        /// Raster lines may be packbits run-length compressed.
        const PACKBITS = 0b0000_0001;
        /// Needs the print information command before raster data.
        const INFO_CMD = 0b0000_0010;
        /// Needs the D460BT-style vendor preamble.
        const VENDOR_MAGIC = 0b0000_0100;
        /// Can cut before a label starts.
        const PRECUT = 0b0000_1000;
    }
}

/// A raster-capable tape printer, as the print pipeline sees it.
pub trait Device {
    /// Printable pixels across the installed tape.
    fn tape_width_px(&self) -> u32;

    /// Pixels addressable by the print head; one raster line carries
    /// `max_head_px() / 8` bytes.
    fn max_head_px(&self) -> u32;

    fn capabilities(&self) -> Capability;

    fn enable_compression(&mut self) -> Result<(), Error>;

    fn raster_start(&mut self) -> Result<(), Error>;

    /// Informational pre-command carrying the strip's pixel width.
    fn send_info(&mut self, width_px: u32) -> Result<(), Error>;

    fn send_vendor_magic(&mut self) -> Result<(), Error>;

    fn send_precut(&mut self) -> Result<(), Error>;

    fn send_chain(&mut self) -> Result<(), Error>;

    /// One bit-packed column of print data, `max_head_px() / 8` bytes.
    fn send_raster_line(&mut self, line: &[u8]) -> Result<(), Error>;

    /// End the current page. With `more_follows` the label is not ejected,
    /// so another copy (or a chained label) can follow.
    fn finalize(&mut self, more_follows: bool) -> Result<(), Error>;
}
