//! USB transport and P-Touch command protocol.
//!
//! Everything byte-level lives here, behind the [`Device`] trait: the
//! pipeline never sees a command sequence, only the capability flags that
//! gate them.

use std::thread;
use std::time::Duration;

use log::{debug, info};
use rusb::{Context, Device as UsbDevice, DeviceDescriptor, DeviceHandle, Direction, TransferType, UsbContext};

use crate::device::{Capability, Device};
use crate::error::{Error, PrinterError};
use crate::media::{self, MediaType};
use crate::model::Model;

/// Brother's USB vendor id.
const VENDOR_ID: u16 = 0x04f9;

#[derive(Debug, Clone, Copy)]
struct Endpoint {
    config: u8,
    iface: u8,
    setting: u8,
    address: u8,
}

/// A P-Touch printer attached over USB.
pub struct Printer {
    handle: DeviceHandle<Context>,
    endpoint_out: Endpoint,
    endpoint_in: Endpoint,
    model: Model,
    status: Option<Status>,
    compress: bool,
}

impl Printer {
    /// Open the first supported printer on the bus.
    pub fn open() -> Result<Self, Error> {
        let context = Context::new()?;
        let (mut device, device_desc, mut handle, model) = Self::find_printer(&context)?;
        handle.reset()?;

        let endpoint_in =
            Self::find_endpoint(&mut device, &device_desc, Direction::In, TransferType::Bulk)
                .ok_or(Error::MissingEndpoint)?;
        let endpoint_out =
            Self::find_endpoint(&mut device, &device_desc, Direction::Out, TransferType::Bulk)
                .ok_or(Error::MissingEndpoint)?;

        handle.set_auto_detach_kernel_driver(true)?;
        let has_kernel_driver = matches!(handle.kernel_driver_active(0), Ok(true));
        info!("kernel driver support is {}", has_kernel_driver);
        handle.set_active_configuration(1)?;
        handle.claim_interface(0)?;
        handle.set_alternate_setting(0, 0)?;

        info!("opened {}", model.name());
        Ok(Printer {
            handle,
            endpoint_out,
            endpoint_in,
            model,
            status: None,
            compress: false,
        })
    }

    fn find_printer(
        context: &Context,
    ) -> Result<(UsbDevice<Context>, DeviceDescriptor, DeviceHandle<Context>, Model), Error> {
        let devices = match context.devices() {
            Ok(d) => d,
            Err(err) => {
                debug!("{:?}", err);
                return Err(Error::DeviceListNotReadable);
            }
        };
        for device in devices.iter() {
            let device_desc = match device.device_descriptor() {
                Ok(d) => d,
                Err(err) => {
                    debug!("{:?}", err);
                    continue;
                }
            };
            if device_desc.vendor_id() != VENDOR_ID {
                continue;
            }
            let model = match Model::from_pid(device_desc.product_id()) {
                Some(m) => m,
                None => {
                    debug!(
                        "skipping unsupported Brother device {:04x}",
                        device_desc.product_id()
                    );
                    continue;
                }
            };
            match device.open() {
                Ok(handle) => return Ok((device, device_desc, handle, model)),
                Err(err) => {
                    debug!("failed to open device: {:?}", err);
                    continue;
                }
            }
        }
        Err(Error::DeviceOffline)
    }

    fn find_endpoint(
        device: &mut UsbDevice<Context>,
        device_desc: &DeviceDescriptor,
        direction: Direction,
        transfer_type: TransferType,
    ) -> Option<Endpoint> {
        for n in 0..device_desc.num_configurations() {
            let config_desc = match device.config_descriptor(n) {
                Ok(c) => c,
                Err(_) => continue,
            };
            for interface in config_desc.interfaces() {
                for interface_desc in interface.descriptors() {
                    for endpoint_desc in interface_desc.endpoint_descriptors() {
                        if endpoint_desc.direction() == direction
                            && endpoint_desc.transfer_type() == transfer_type
                        {
                            return Some(Endpoint {
                                config: config_desc.number(),
                                iface: interface_desc.interface_number(),
                                setting: interface_desc.setting_number(),
                                address: endpoint_desc.address(),
                            });
                        }
                    }
                }
            }
        }
        None
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    fn write(&self, buf: &[u8]) -> Result<usize, Error> {
        let timeout = Duration::from_secs(10);
        let n = self
            .handle
            .write_bulk(self.endpoint_out.address, buf, timeout)?;
        if n == buf.len() {
            Ok(n)
        } else {
            debug!(
                "write error: bytes wrote {} != bytes supplied {}, possibly timeout ?",
                n,
                buf.len()
            );
            Err(Error::ShortWrite(n))
        }
    }

    /// Reset the printer into a known state: an invalidation run of zero
    /// bytes, then ESC @.
    pub fn init(&self) -> Result<(), Error> {
        let mut buf = vec![0u8; 64];
        buf.extend_from_slice(&[0x1b, 0x40]);
        self.write(&buf)?;
        Ok(())
    }

    /// Request and read the printer status, waiting up to `timeout_secs`
    /// for the printer to become ready (`0` waits forever).
    ///
    /// The parsed status is kept for later tape width queries.
    pub fn request_status(&mut self, timeout_secs: u64) -> Result<&Status, Error> {
        self.write(&[0x1b, 0x69, 0x53])?; // ESC i S
        let read_timeout = Duration::from_secs(1);
        let mut tries: u64 = 0;
        loop {
            let mut buf = [0u8; 32];
            match self
                .handle
                .read_bulk(self.endpoint_in.address, &mut buf, read_timeout)
            {
                Ok(32) => {
                    debug!("raw status: {:x?}", buf);
                    let status = Status::from_buf(buf);
                    debug!("parsed status: {:?}", status);
                    if !status.error.is_no_error() {
                        return Err(Error::PrinterError(status.error));
                    }
                    if status.phase == Phase::Receiving {
                        return Ok(self.status.insert(status));
                    }
                    // previous job still printing
                    thread::sleep(Duration::from_secs(1));
                }
                Ok(_) => thread::sleep(Duration::from_secs(1)),
                Err(e) => return Err(Error::UsbError(e)),
            }
            tries += 1;
            if timeout_secs != 0 && tries >= timeout_secs {
                return Err(Error::ReadStatusTimeout);
            }
        }
    }

    fn media_width_mm(&self) -> u8 {
        self.status.as_ref().map_or(0, |s| s.media_width)
    }
}

impl Device for Printer {
    fn tape_width_px(&self) -> u32 {
        media::width_px(self.media_width_mm())
            .unwrap_or(0)
            .min(self.max_head_px())
    }

    fn max_head_px(&self) -> u32 {
        self.model.max_px()
    }

    fn capabilities(&self) -> Capability {
        self.model.capabilities()
    }

    fn enable_compression(&mut self) -> Result<(), Error> {
        self.write(&[0x4d, 0x02])?; // M: packbits mode
        self.compress = true;
        Ok(())
    }

    fn raster_start(&mut self) -> Result<(), Error> {
        self.write(&[0x1b, 0x69, 0x61, 0x01])?; // ESC i a: raster transfer mode
        Ok(())
    }

    fn send_info(&mut self, width_px: u32) -> Result<(), Error> {
        // ESC i z: print information. 0x84 marks the kind and width fields
        // as valid; the strip length in px follows little-endian.
        let mut buf = vec![
            0x1b,
            0x69,
            0x7a,
            0x84,
            match self.status.as_ref().map(|s| s.media_type) {
                Some(MediaType::HeatShrink) => 0x11,
                Some(MediaType::NonLaminated) => 0x03,
                _ => 0x01,
            },
            self.media_width_mm(),
            0x00,
        ];
        buf.extend_from_slice(&width_px.to_le_bytes());
        buf.extend_from_slice(&[0x00, 0x00]);
        self.write(&buf)?;
        Ok(())
    }

    fn send_vendor_magic(&mut self) -> Result<(), Error> {
        // D460BT refuses raster data without this feed preamble
        self.write(&[0x1b, 0x69, 0x64, 0x00, 0x00])?; // ESC i d
        Ok(())
    }

    fn send_precut(&mut self) -> Result<(), Error> {
        self.write(&[0x1b, 0x69, 0x4d, 0x40])?; // ESC i M: auto cut bit
        Ok(())
    }

    fn send_chain(&mut self) -> Result<(), Error> {
        self.write(&[0x1b, 0x69, 0x4b, 0x00])?; // ESC i K: no cut at end
        Ok(())
    }

    fn send_raster_line(&mut self, line: &[u8]) -> Result<(), Error> {
        let payload;
        let data = if self.compress {
            payload = pack_bits(line);
            &payload[..]
        } else {
            line
        };
        let mut buf = Vec::with_capacity(3 + data.len());
        buf.push(0x47); // G: raster graphics transfer
        buf.extend_from_slice(&(data.len() as u16).to_le_bytes());
        buf.extend_from_slice(data);
        self.write(&buf)?;
        Ok(())
    }

    fn finalize(&mut self, more_follows: bool) -> Result<(), Error> {
        if more_follows {
            self.write(&[0x0c])?; // FF: print without eject
        } else {
            self.write(&[0x1a])?; // Control-Z: print then eject
        }
        Ok(())
    }
}

/// Packbits run-length encoding of one raster line.
fn pack_bits(data: &[u8]) -> Vec<u8> {
    let mut packed = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let mut run_length = 1;
        let run_value = data[i];

        while i + run_length < data.len() && run_length < 127 && data[i + run_length] == run_value
        {
            run_length += 1;
        }

        if run_length > 1 {
            packed.push(-(run_length as i8 - 1) as u8);
            packed.push(run_value);
            i += run_length;
        } else {
            let mut literal_run = 1;
            while i + literal_run < data.len()
                && literal_run < 128
                && data[i + literal_run] != data[i + literal_run - 1]
            {
                literal_run += 1;
            }

            packed.push(literal_run as u8 - 1);
            packed.extend_from_slice(&data[i..i + literal_run]);
            i += literal_run;
        }
    }

    packed
}

///
/// Status received from the printer decoded to a Rust friendly type.
///
#[derive(Debug)]
pub struct Status {
    pub model_code: u8,
    pub media_width: u8,
    pub media_type: MediaType,
    error: PrinterError,
    phase: Phase,
}

impl Status {
    fn from_buf(buf: [u8; 32]) -> Self {
        Status {
            model_code: buf[4],
            media_width: buf[10],
            media_type: MediaType::from_code(buf[11]),
            error: PrinterError::from_buf(buf),
            phase: Phase::from_code(buf[19]),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Phase {
    Receiving,
    Printing,
    Waiting,
}

impl Phase {
    fn from_code(code: u8) -> Self {
        match code {
            0x00 => Self::Receiving,
            0x01 => Self::Printing,
            _ => Self::Waiting,
        }
    }
}
