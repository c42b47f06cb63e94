//! Character device channel
//!
//! Writes straight to a printer device node such as `/dev/usb/lp0`. The
//! printer name is the device path.

use super::{DocumentInfo, RawPrinterChannel, write_counted};
use crate::error::ChannelError;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};

/// Device file channel
#[derive(Debug, Clone, Default)]
pub struct DeviceChannel;

impl DeviceChannel {
    pub fn new() -> Self {
        Self
    }
}

impl RawPrinterChannel for DeviceChannel {
    type Handle = File;

    fn open(&mut self, printer: &str) -> Result<File, ChannelError> {
        OpenOptions::new()
            .write(true)
            .open(printer)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ChannelError::NotFound(printer.to_string()),
                ErrorKind::ResourceBusy | ErrorKind::WouldBlock => {
                    ChannelError::Busy(printer.to_string())
                }
                _ => ChannelError::Io(e),
            })
    }

    fn start_doc(&mut self, _file: &mut File, _doc: &DocumentInfo) -> Result<(), ChannelError> {
        Ok(())
    }

    fn start_page(&mut self, _file: &mut File) -> Result<(), ChannelError> {
        Ok(())
    }

    fn write(&mut self, file: &mut File, data: &[u8]) -> Result<usize, ChannelError> {
        write_counted(file, data)
    }

    fn end_page(&mut self, _file: &mut File) -> Result<(), ChannelError> {
        Ok(())
    }

    fn end_doc(&mut self, file: &mut File) -> Result<(), ChannelError> {
        file.flush()?;
        Ok(())
    }

    fn close(&mut self, file: File) -> Result<(), ChannelError> {
        drop(file);
        Ok(())
    }
}
