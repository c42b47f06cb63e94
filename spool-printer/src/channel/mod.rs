//! Raw printer channels
//!
//! A channel is the device binding underneath a spool job. Supports:
//! - Windows spooler (winspool, datatype RAW)
//! - Raw TCP printers (port 9100)
//! - Character device files (`/dev/usb/lp0`)
//! - In-memory fake for tests and dry runs

mod device;
mod memory;
mod socket;
#[cfg(windows)]
mod windows;

pub use device::DeviceChannel;
pub use memory::{Call, MemoryChannel, MemoryHandle};
pub use socket::SocketChannel;
#[cfg(windows)]
pub use windows::WindowsSpoolChannel;

use crate::error::ChannelError;

/// Spooler datatype that passes bytes through unmodified
pub const RAW_DATATYPE: &str = "RAW";

/// Document metadata submitted with `start_doc`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub name: String,
    pub datatype: String,
}

impl DocumentInfo {
    /// A RAW document with the given name
    pub fn raw(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            datatype: RAW_DATATYPE.to_string(),
        }
    }
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self::raw("Raw Document")
    }
}

/// Capability interface over a raw printer device
///
/// Calls are blocking. A handle returned by [`open`](Self::open) is released
/// by passing it to [`close`](Self::close), which consumes it.
/// [`SpoolJob`](crate::SpoolJob) guarantees the call order and that every
/// reachable cleanup call is made exactly once.
pub trait RawPrinterChannel {
    type Handle;

    /// Acquire exclusive access to the named printer
    fn open(&mut self, printer: &str) -> Result<Self::Handle, ChannelError>;

    fn start_doc(&mut self, handle: &mut Self::Handle, doc: &DocumentInfo)
    -> Result<(), ChannelError>;

    fn start_page(&mut self, handle: &mut Self::Handle) -> Result<(), ChannelError>;

    /// Submit `data`, returning how many bytes the device accepted
    fn write(&mut self, handle: &mut Self::Handle, data: &[u8]) -> Result<usize, ChannelError>;

    fn end_page(&mut self, handle: &mut Self::Handle) -> Result<(), ChannelError>;

    fn end_doc(&mut self, handle: &mut Self::Handle) -> Result<(), ChannelError>;

    fn close(&mut self, handle: Self::Handle) -> Result<(), ChannelError>;
}

impl<C: RawPrinterChannel + ?Sized> RawPrinterChannel for &mut C {
    type Handle = C::Handle;

    fn open(&mut self, printer: &str) -> Result<Self::Handle, ChannelError> {
        (**self).open(printer)
    }

    fn start_doc(
        &mut self,
        handle: &mut Self::Handle,
        doc: &DocumentInfo,
    ) -> Result<(), ChannelError> {
        (**self).start_doc(handle, doc)
    }

    fn start_page(&mut self, handle: &mut Self::Handle) -> Result<(), ChannelError> {
        (**self).start_page(handle)
    }

    fn write(&mut self, handle: &mut Self::Handle, data: &[u8]) -> Result<usize, ChannelError> {
        (**self).write(handle, data)
    }

    fn end_page(&mut self, handle: &mut Self::Handle) -> Result<(), ChannelError> {
        (**self).end_page(handle)
    }

    fn end_doc(&mut self, handle: &mut Self::Handle) -> Result<(), ChannelError> {
        (**self).end_doc(handle)
    }

    fn close(&mut self, handle: Self::Handle) -> Result<(), ChannelError> {
        (**self).close(handle)
    }
}

/// Write to a stream until done or failed, returning the accepted count
///
/// Used by stream-backed channels: a failure after partial progress is
/// reported as a short count so the job sees `WriteIncomplete`.
pub(crate) fn write_counted<W: std::io::Write>(
    stream: &mut W,
    data: &[u8],
) -> Result<usize, ChannelError> {
    let mut written = 0;
    while written < data.len() {
        match stream.write(&data[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) if written == 0 => return Err(e.into()),
            Err(e) => {
                tracing::warn!(written, total = data.len(), error = %e, "Write stopped early");
                break;
            }
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};

    /// Accepts `limit` bytes, then errors
    struct Limited {
        buf: Vec<u8>,
        limit: usize,
    }

    impl Write for Limited {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            let room = self.limit - self.buf.len();
            if room == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "full"));
            }
            let n = room.min(data.len()).min(3);
            self.buf.extend_from_slice(&data[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_counted_full() {
        let mut w = Limited {
            buf: Vec::new(),
            limit: 100,
        };
        assert_eq!(write_counted(&mut w, b"0123456789").unwrap(), 10);
        assert_eq!(w.buf, b"0123456789");
    }

    #[test]
    fn test_write_counted_short() {
        let mut w = Limited {
            buf: Vec::new(),
            limit: 7,
        };
        assert_eq!(write_counted(&mut w, b"0123456789").unwrap(), 7);
    }

    #[test]
    fn test_write_counted_immediate_error() {
        let mut w = Limited {
            buf: Vec::new(),
            limit: 0,
        };
        assert!(matches!(
            write_counted(&mut w, b"x"),
            Err(ChannelError::Io(_))
        ));
    }

    #[test]
    fn test_document_info_default_is_raw() {
        let doc = DocumentInfo::default();
        assert_eq!(doc.datatype, "RAW");
        assert_eq!(DocumentInfo::raw("QRCode Print Job").name, "QRCode Print Job");
    }
}
