//! Error types for the printer library

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Device-level failure reported by a [`RawPrinterChannel`](crate::RawPrinterChannel)
#[derive(Debug, Error)]
pub enum ChannelError {
    /// No printer (or device node) with this name exists
    #[error("Printer not found: {0}")]
    NotFound(String),

    /// The device exists but cannot be acquired exclusively right now
    #[error("Printer busy: {0}")]
    Busy(String),

    /// The spooler or device refused the request
    #[error("Rejected: {0}")]
    Rejected(String),

    /// An OS spooler call failed with a platform error code
    #[error("{call} failed (os error {code})")]
    Os { call: &'static str, code: u32 },

    /// IO error talking to the device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One step of the raw spooler protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpoolStep {
    Open,
    StartDocument,
    StartPage,
    Write,
    EndPage,
    EndDocument,
    Close,
}

impl fmt::Display for SpoolStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpoolStep::Open => "open",
            SpoolStep::StartDocument => "start document",
            SpoolStep::StartPage => "start page",
            SpoolStep::Write => "write",
            SpoolStep::EndPage => "end page",
            SpoolStep::EndDocument => "end document",
            SpoolStep::Close => "close",
        };
        f.write_str(name)
    }
}

/// Failure of a single spool job step
#[derive(Debug, Error)]
pub enum SpoolError {
    /// The printer could not be opened (unknown name or busy device)
    #[error("Device unavailable: {printer}: {source}")]
    DeviceUnavailable {
        printer: String,
        #[source]
        source: ChannelError,
    },

    /// The spooler refused to start the document or page
    #[error("Spooler rejected {step}: {source}")]
    SpoolRejected {
        step: SpoolStep,
        #[source]
        source: ChannelError,
    },

    /// The device accepted fewer bytes than were submitted
    #[error("Incomplete write: {written} of {expected} bytes accepted")]
    WriteIncomplete {
        written: usize,
        expected: usize,
        #[source]
        source: Option<ChannelError>,
    },

    /// A cleanup step (end page, end document, close) failed
    #[error("Cleanup step {step} failed: {source}")]
    CleanupFailed {
        step: SpoolStep,
        #[source]
        source: ChannelError,
    },

    /// An operation was called out of protocol order
    #[error("Cannot {step} while job is {state}")]
    InvalidState {
        step: SpoolStep,
        state: crate::spool::JobState,
    },
}

impl SpoolError {
    /// The protocol step this error belongs to
    pub fn step(&self) -> SpoolStep {
        match self {
            SpoolError::DeviceUnavailable { .. } => SpoolStep::Open,
            SpoolError::SpoolRejected { step, .. } => *step,
            SpoolError::WriteIncomplete { .. } => SpoolStep::Write,
            SpoolError::CleanupFailed { step, .. } => *step,
            SpoolError::InvalidState { step, .. } => *step,
        }
    }
}

/// Outcome of a failed [`send`](crate::send)
///
/// `error` is the first failure; failures of the best-effort cleanup that
/// followed it are kept in `suppressed`, in call order.
#[derive(Debug)]
pub struct SpoolFailure {
    pub error: SpoolError,
    pub suppressed: Vec<SpoolError>,
}

impl SpoolFailure {
    pub fn new(error: SpoolError) -> Self {
        Self {
            error,
            suppressed: Vec::new(),
        }
    }

    /// Step that caused the job to fail
    pub fn step(&self) -> SpoolStep {
        self.error.step()
    }
}

impl From<SpoolError> for SpoolFailure {
    fn from(error: SpoolError) -> Self {
        Self::new(error)
    }
}

impl fmt::Display for SpoolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if !self.suppressed.is_empty() {
            write!(f, " ({} cleanup failure(s) suppressed", self.suppressed.len())?;
            for e in &self.suppressed {
                write!(f, "; {}", e)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::error::Error for SpoolFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// The spool job failed
    #[error("Print job failed: {0}")]
    Spool(#[from] SpoolFailure),

    /// The blocking print task could not be joined
    #[error("Task join failed: {0}")]
    Join(String),

    /// Invalid printer or payload configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Image is wider than the raster header can express
    #[error("Image too wide: {0} px (max 65535)")]
    ImageTooWide(u32),

    /// Image decoding error
    #[cfg(feature = "image")]
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// QR symbol could not be generated
    #[cfg(feature = "qr")]
    #[error("QR code error: {0}")]
    Qr(#[from] qrcode::types::QrError),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
