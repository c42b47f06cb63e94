//! Raw spool job
//!
//! Drives one document through a [`RawPrinterChannel`]:
//!
//! ```text
//! open ─► start_doc ─► start_page ─► write ─► end_page ─► end_doc ─► close
//! ```
//!
//! Every step reports its own result. Once a state is reached, the matching
//! cleanup (end page, end document, close) is always attempted exactly once,
//! whether the job finishes normally, fails midway, or is dropped.
//!
//! Calls block until the device answers. The spooler path has no timeout,
//! so a hung device blocks the caller indefinitely.

use crate::channel::{DocumentInfo, RawPrinterChannel};
use crate::error::{SpoolError, SpoolFailure, SpoolStep};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// Lifecycle state of a spool job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Closed,
    Opened,
    DocStarted,
    PageStarted,
    PageEnded,
    DocEnded,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Closed => "closed",
            JobState::Opened => "opened",
            JobState::DocStarted => "document started",
            JobState::PageStarted => "page started",
            JobState::PageEnded => "page ended",
            JobState::DocEnded => "document ended",
        };
        f.write_str(name)
    }
}

/// Summary of a successful job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub printer: String,
    pub document: String,
    pub bytes_written: usize,
}

/// An open printer with at most one document in progress
///
/// The printer handle is owned by the job and released when the job is
/// finished, closed or dropped. A job borrows its channel mutably, so a
/// channel cannot run two jobs at once.
pub struct SpoolJob<'c, C: RawPrinterChannel> {
    channel: &'c mut C,
    handle: Option<C::Handle>,
    printer: String,
    state: JobState,
    doc_open: bool,
    page_open: bool,
    write_failed: bool,
    bytes_written: usize,
}

impl<'c, C: RawPrinterChannel> SpoolJob<'c, C> {
    /// Open the named printer
    ///
    /// On failure nothing else is attempted and there is nothing to clean up.
    #[instrument(skip(channel))]
    pub fn open(channel: &'c mut C, printer: &str) -> Result<Self, SpoolError> {
        let handle = channel
            .open(printer)
            .map_err(|source| SpoolError::DeviceUnavailable {
                printer: printer.to_string(),
                source,
            })?;
        debug!("Printer opened");

        Ok(Self {
            channel,
            handle: Some(handle),
            printer: printer.to_string(),
            state: JobState::Opened,
            doc_open: false,
            page_open: false,
            write_failed: false,
            bytes_written: 0,
        })
    }

    pub fn printer(&self) -> &str {
        &self.printer
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Bytes accepted by the device so far
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    fn invalid(&self, step: SpoolStep) -> SpoolError {
        SpoolError::InvalidState {
            step,
            state: self.state,
        }
    }

    /// Start a document (`Opened` → `DocStarted`)
    pub fn start_document(&mut self, doc: &DocumentInfo) -> Result<(), SpoolError> {
        let step = SpoolStep::StartDocument;
        if self.state != JobState::Opened {
            return Err(self.invalid(step));
        }
        let Some(handle) = self.handle.as_mut() else {
            return Err(self.invalid(step));
        };

        self.channel
            .start_doc(handle, doc)
            .map_err(|source| SpoolError::SpoolRejected { step, source })?;
        debug!(doc = %doc.name, datatype = %doc.datatype, "Document started");
        self.doc_open = true;
        self.state = JobState::DocStarted;
        Ok(())
    }

    /// Start the page (`DocStarted` → `PageStarted`)
    pub fn start_page(&mut self) -> Result<(), SpoolError> {
        let step = SpoolStep::StartPage;
        if self.state != JobState::DocStarted {
            return Err(self.invalid(step));
        }
        let Some(handle) = self.handle.as_mut() else {
            return Err(self.invalid(step));
        };

        self.channel
            .start_page(handle)
            .map_err(|source| SpoolError::SpoolRejected { step, source })?;
        debug!("Page started");
        self.page_open = true;
        self.state = JobState::PageStarted;
        Ok(())
    }

    /// Submit `data` in one call
    ///
    /// A short or failed write is terminal: later writes on this job are
    /// refused and nothing is retried.
    pub fn write(&mut self, data: &[u8]) -> Result<(), SpoolError> {
        let step = SpoolStep::Write;
        if self.state != JobState::PageStarted || self.write_failed {
            return Err(self.invalid(step));
        }
        let Some(handle) = self.handle.as_mut() else {
            return Err(self.invalid(step));
        };

        let expected = data.len();
        match self.channel.write(handle, data) {
            Ok(written) if written >= expected => {
                self.bytes_written += expected;
                debug!(bytes = expected, "Data written");
                Ok(())
            }
            Ok(written) => {
                self.write_failed = true;
                self.bytes_written += written;
                Err(SpoolError::WriteIncomplete {
                    written,
                    expected,
                    source: None,
                })
            }
            Err(source) => {
                self.write_failed = true;
                Err(SpoolError::WriteIncomplete {
                    written: 0,
                    expected,
                    source: Some(source),
                })
            }
        }
    }

    /// End the page (`PageStarted` → `PageEnded`)
    ///
    /// Attempted once; the page counts as ended even if the call fails.
    pub fn end_page(&mut self) -> Result<(), SpoolError> {
        let step = SpoolStep::EndPage;
        if !self.page_open {
            return Err(self.invalid(step));
        }
        let Some(handle) = self.handle.as_mut() else {
            return Err(self.invalid(step));
        };

        self.page_open = false;
        self.state = JobState::PageEnded;
        self.channel
            .end_page(handle)
            .map_err(|source| SpoolError::CleanupFailed { step, source })?;
        debug!("Page ended");
        Ok(())
    }

    /// End the document (→ `DocEnded`); the page must be ended first
    ///
    /// Attempted once; the document counts as ended even if the call fails.
    pub fn end_document(&mut self) -> Result<(), SpoolError> {
        let step = SpoolStep::EndDocument;
        if !self.doc_open || self.page_open {
            return Err(self.invalid(step));
        }
        let Some(handle) = self.handle.as_mut() else {
            return Err(self.invalid(step));
        };

        self.doc_open = false;
        self.state = JobState::DocEnded;
        self.channel
            .end_doc(handle)
            .map_err(|source| SpoolError::CleanupFailed { step, source })?;
        debug!("Document ended");
        Ok(())
    }

    /// Finish the job and release the printer, returning the first failure
    ///
    /// Later failures are logged.
    pub fn close(self) -> Result<(), SpoolError> {
        let printer = self.printer.clone();
        let mut errors = self.finish().into_iter();
        let first = errors.next();
        for e in errors {
            warn!(printer = %printer, error = %e, "Cleanup failed during close");
        }
        match first {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Run every cleanup step still owed, in order, and release the printer
    ///
    /// Returns the failures of those steps; one failing step never prevents
    /// the next from being attempted.
    pub fn finish(mut self) -> Vec<SpoolError> {
        self.unwind()
    }

    fn unwind(&mut self) -> Vec<SpoolError> {
        let mut errors = Vec::new();

        if self.page_open
            && let Err(e) = self.end_page()
        {
            errors.push(e);
        }

        if self.doc_open
            && let Err(e) = self.end_document()
        {
            errors.push(e);
        }

        if let Some(handle) = self.handle.take() {
            self.state = JobState::Closed;
            match self.channel.close(handle) {
                Ok(()) => debug!("Printer closed"),
                Err(source) => errors.push(SpoolError::CleanupFailed {
                    step: SpoolStep::Close,
                    source,
                }),
            }
        }

        errors
    }
}

impl<C: RawPrinterChannel> Drop for SpoolJob<'_, C> {
    fn drop(&mut self) {
        if self.handle.is_none() {
            return;
        }

        warn!(printer = %self.printer, state = %self.state, "Spool job dropped before close");
        for e in self.unwind() {
            warn!(printer = %self.printer, error = %e, "Cleanup failed during drop");
        }
    }
}

/// Send one RAW document to a printer
///
/// Runs open, start document, start page, write, end page, end document and
/// close. Succeeds only if every step succeeds. Otherwise the first failure
/// is returned, after every cleanup step reachable from the failing state
/// has been attempted; cleanup failures are attached as suppressed errors.
#[instrument(skip(channel, doc, data), fields(doc = %doc.name, data_len = data.len()))]
pub fn send<C: RawPrinterChannel>(
    channel: &mut C,
    printer: &str,
    doc: &DocumentInfo,
    data: &[u8],
) -> Result<JobReport, SpoolFailure> {
    let mut job = SpoolJob::open(channel, printer).inspect_err(|e| {
        warn!(error = %e, "Failed to open printer");
    })?;

    let primary = submit(&mut job, doc, data).err();
    let bytes_written = job.bytes_written();
    let mut cleanup = job.finish().into_iter();

    let failure = match primary {
        Some(error) => SpoolFailure {
            error,
            suppressed: cleanup.collect(),
        },
        None => match cleanup.next() {
            Some(error) => SpoolFailure {
                error,
                suppressed: cleanup.collect(),
            },
            None => {
                info!(bytes = bytes_written, "Print job sent successfully");
                return Ok(JobReport {
                    printer: printer.to_string(),
                    document: doc.name.clone(),
                    bytes_written,
                });
            }
        },
    };

    warn!(
        step = %failure.step(),
        error = %failure.error,
        suppressed = failure.suppressed.len(),
        "Print job failed"
    );
    Err(failure)
}

fn submit<C: RawPrinterChannel>(
    job: &mut SpoolJob<'_, C>,
    doc: &DocumentInfo,
    data: &[u8],
) -> Result<(), SpoolError> {
    job.start_document(doc)?;
    job.start_page()?;
    job.write(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{Call, MemoryChannel};

    #[test]
    fn test_manual_lifecycle() {
        let mut channel = MemoryChannel::new();
        let probe = channel.clone();

        let mut job = SpoolJob::open(&mut channel, "POS-80").unwrap();
        assert_eq!(job.state(), JobState::Opened);
        job.start_document(&DocumentInfo::raw("doc")).unwrap();
        assert_eq!(job.state(), JobState::DocStarted);
        job.start_page().unwrap();
        job.write(b"ab").unwrap();
        job.write(b"cd").unwrap();
        assert_eq!(job.bytes_written(), 4);
        job.end_page().unwrap();
        assert_eq!(job.state(), JobState::PageEnded);
        job.end_document().unwrap();
        assert_eq!(job.state(), JobState::DocEnded);
        job.close().unwrap();

        assert_eq!(probe.output(), b"abcd");
        assert_eq!(probe.open_handles(), 0);
    }

    #[test]
    fn test_out_of_order_calls_rejected() {
        let mut channel = MemoryChannel::new();
        let probe = channel.clone();

        let mut job = SpoolJob::open(&mut channel, "POS-80").unwrap();
        let err = job.start_page().unwrap_err();
        assert!(matches!(
            err,
            SpoolError::InvalidState {
                step: SpoolStep::StartPage,
                state: JobState::Opened
            }
        ));
        assert!(job.write(b"x").is_err());
        assert!(job.end_page().is_err());
        assert!(job.end_document().is_err());
        job.close().unwrap();

        // Only open and close reached the device
        assert_eq!(probe.steps(), vec![SpoolStep::Open, SpoolStep::Close]);
    }

    #[test]
    fn test_write_after_short_write_refused() {
        let mut channel = MemoryChannel::new().accept_at_most(1);
        let probe = channel.clone();

        let mut job = SpoolJob::open(&mut channel, "POS-80").unwrap();
        job.start_document(&DocumentInfo::default()).unwrap();
        job.start_page().unwrap();
        assert!(matches!(
            job.write(b"abc"),
            Err(SpoolError::WriteIncomplete {
                written: 1,
                expected: 3,
                ..
            })
        ));
        assert!(matches!(
            job.write(b"abc"),
            Err(SpoolError::InvalidState { .. })
        ));
        assert!(job.finish().is_empty());

        let writes = probe
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Write(_)))
            .count();
        assert_eq!(writes, 1);
    }

    #[test]
    fn test_drop_unwinds_open_page() {
        let mut channel = MemoryChannel::new();
        let probe = channel.clone();

        {
            let mut job = SpoolJob::open(&mut channel, "POS-80").unwrap();
            job.start_document(&DocumentInfo::default()).unwrap();
            job.start_page().unwrap();
        }

        assert_eq!(
            probe.steps(),
            vec![
                SpoolStep::Open,
                SpoolStep::StartDocument,
                SpoolStep::StartPage,
                SpoolStep::EndPage,
                SpoolStep::EndDocument,
                SpoolStep::Close,
            ]
        );
        assert_eq!(probe.open_handles(), 0);
    }

    #[test]
    fn test_end_document_requires_ended_page() {
        let mut channel = MemoryChannel::new();
        let mut job = SpoolJob::open(&mut channel, "POS-80").unwrap();
        job.start_document(&DocumentInfo::default()).unwrap();
        job.start_page().unwrap();
        assert!(matches!(
            job.end_document(),
            Err(SpoolError::InvalidState {
                step: SpoolStep::EndDocument,
                ..
            })
        ));
        assert!(job.finish().is_empty());
    }

    #[test]
    fn test_close_returns_first_cleanup_failure() {
        let mut channel = MemoryChannel::new()
            .fail_on(SpoolStep::EndPage)
            .fail_on(SpoolStep::EndDocument)
            .fail_on(SpoolStep::Close);
        let probe = channel.clone();

        let mut job = SpoolJob::open(&mut channel, "POS-80").unwrap();
        job.start_document(&DocumentInfo::default()).unwrap();
        job.start_page().unwrap();
        let err = job.close().unwrap_err();

        assert_eq!(err.step(), SpoolStep::EndPage);
        // later failures did not stop the remaining steps
        assert_eq!(
            probe.steps()[3..],
            [SpoolStep::EndPage, SpoolStep::EndDocument, SpoolStep::Close]
        );
        assert_eq!(probe.open_handles(), 0);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(JobState::PageStarted.to_string(), "page started");
        let err = SpoolError::InvalidState {
            step: SpoolStep::Write,
            state: JobState::Opened,
        };
        assert_eq!(err.to_string(), "Cannot write while job is opened");
    }
}
