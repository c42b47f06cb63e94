//! # spool-printer
//!
//! Raw ESC/POS printing: build the byte stream, then push it through a raw
//! (driver-bypassing) printer channel.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS bit-image raster encoding (24-dot bands)
//! - Plain-text wrapping and framing (ASCII or GBK)
//! - The raw spool job protocol with guaranteed cleanup
//! - Channels: Windows spooler, TCP port 9100, device files, in-memory
//!
//! Producing the content (QR payloads, photos, receipt text) stays with the
//! caller; printer discovery is out of scope.
//!
//! ## Example
//!
//! ```
//! use spool_printer::{DocumentInfo, MemoryChannel, MonoBitmap, raster, send};
//!
//! // 1x24 all-dark column
//! let bitmap = MonoBitmap::from_fn(1, 24, |_, _| true);
//! let data = raster::encode(&bitmap);
//!
//! let mut channel = MemoryChannel::new();
//! let report = send(&mut channel, "POS-80", &DocumentInfo::raw("QRCode Print Job"), &data)
//!     .expect("job failed");
//! assert_eq!(report.bytes_written, data.len());
//! ```

mod channel;
mod encoding;
mod error;
#[cfg(feature = "image")]
mod picture;
mod printer;
#[cfg(feature = "qr")]
mod qr;
pub mod raster;
mod spool;
mod text;

// Re-exports
pub use channel::{
    Call, DeviceChannel, DocumentInfo, MemoryChannel, MemoryHandle, RAW_DATATYPE, RawPrinterChannel,
    SocketChannel,
};
pub use encoding::{Charset, gbk_width};
pub use error::{ChannelError, PrintError, PrintResult, SpoolError, SpoolFailure, SpoolStep};
pub use printer::{Printer, SpoolPrinter};
pub use raster::{Bitmap, MonoBitmap};
pub use spool::{JobReport, JobState, SpoolJob, send};
pub use text::{Alignment, TextFormatter, TextLayout, TrimPolicy, WrapOptions, wrap};

#[cfg(feature = "image")]
pub use picture::ImageBitmap;

#[cfg(feature = "qr")]
pub use qr::{DEFAULT_MODULE_PX, qr_bitmap};
#[cfg(feature = "qr")]
pub use qrcode::EcLevel;

#[cfg(windows)]
pub use channel::WindowsSpoolChannel;
