//! Printer adapters for sending ESC/POS data
//!
//! [`SpoolPrinter`] binds a channel to a printer name and document name, and
//! exposes the blocking spool job both synchronously and through the async
//! [`Printer`] trait.

use crate::channel::{DocumentInfo, RawPrinterChannel};
use crate::error::{PrintError, PrintResult};
use crate::spool::{JobReport, SpoolJob, send};
use tracing::{info, instrument, warn};

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send raw ESC/POS data to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<JobReport>;

    /// Check if the printer can be opened
    async fn is_online(&self) -> bool;
}

/// A named printer reached through a raw channel
///
/// ```ignore
/// use spool_printer::{Printer, SocketChannel, SpoolPrinter, raster};
///
/// let printer = SpoolPrinter::new(SocketChannel::new(), "192.168.1.100:9100")
///     .with_document("QRCode Print Job");
/// printer.print(&raster::encode(&bitmap)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SpoolPrinter<C> {
    channel: C,
    name: String,
    document: DocumentInfo,
}

impl<C: RawPrinterChannel> SpoolPrinter<C> {
    /// Create a printer with a specific name
    pub fn new(channel: C, name: &str) -> Self {
        Self {
            channel,
            name: name.to_string(),
            document: DocumentInfo::default(),
        }
    }

    /// Set the spooler document name
    pub fn with_document(mut self, name: impl Into<String>) -> Self {
        self.document = DocumentInfo::raw(name);
        self
    }

    /// Get the printer name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &DocumentInfo {
        &self.document
    }

    /// Send raw ESC/POS data synchronously (for use from sync/blocking contexts)
    #[instrument(skip(self, data), fields(printer = %self.name, data_len = data.len()))]
    pub fn print_sync(&mut self, data: &[u8]) -> PrintResult<JobReport> {
        info!("Submitting print job");
        Ok(send(&mut self.channel, &self.name, &self.document, data)?)
    }

    /// Open and immediately close the printer
    pub fn probe(&mut self) -> bool {
        match SpoolJob::open(&mut self.channel, &self.name) {
            Ok(job) => job.close().is_ok(),
            Err(e) => {
                warn!(printer = %self.name, error = %e, "Printer offline");
                false
            }
        }
    }
}

impl<C> Printer for SpoolPrinter<C>
where
    C: RawPrinterChannel + Clone + Send + 'static,
{
    async fn print(&self, data: &[u8]) -> PrintResult<JobReport> {
        // Spooling is blocking, run it off the async workers
        let mut printer = self.clone();
        let data = data.to_vec();

        tokio::task::spawn_blocking(move || printer.print_sync(&data))
            .await
            .map_err(|e| PrintError::Join(e.to_string()))?
    }

    async fn is_online(&self) -> bool {
        let mut printer = self.clone();
        tokio::task::spawn_blocking(move || printer.probe())
            .await
            .unwrap_or(false)
    }
}
