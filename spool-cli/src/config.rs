//! CLI configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | SPOOL_PRINTER | - | printer name, `host[:port]` or device path |
//! | SPOOL_CHANNEL | `spooler` (Windows) / `device` | `spooler`, `socket` or `device` |
//! | SPOOL_DOC_NAME | per payload | spooler document name |
//! | SPOOL_CONNECT_TIMEOUT_MS | 5000 | socket connect timeout |
//! | SPOOL_WRITE_TIMEOUT_MS | 30000 | socket write timeout, 0 = none |
//! | LOG_LEVEL | info | used when RUST_LOG is unset |
//! | LOG_DIR | - | directory for daily rolling log files |
//!
//! Command-line flags take precedence over the environment.

use clap::ValueEnum;
use std::time::Duration;

/// Device binding used to reach the printer
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChannelKind {
    /// Operating system spooler (Windows)
    Spooler,
    /// Raw TCP, port 9100 by default
    Socket,
    /// Printer device file, e.g. /dev/usb/lp0
    Device,
}

impl Default for ChannelKind {
    fn default() -> Self {
        if cfg!(windows) {
            ChannelKind::Spooler
        } else {
            ChannelKind::Device
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub printer: Option<String>,
    pub channel: ChannelKind,
    pub doc_name: Option<String>,
    pub connect_timeout_ms: u64,
    /// 0 disables the write timeout
    pub write_timeout_ms: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            printer: non_empty("SPOOL_PRINTER"),
            channel: non_empty("SPOOL_CHANNEL")
                .and_then(|v| ChannelKind::from_str(v.trim(), true).ok())
                .unwrap_or_default(),
            doc_name: non_empty("SPOOL_DOC_NAME"),
            connect_timeout_ms: non_empty("SPOOL_CONNECT_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            write_timeout_ms: non_empty("SPOOL_WRITE_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30000),
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: non_empty("LOG_DIR"),
        }
    }

    /// Override with values given on the command line
    pub fn with_overrides(
        mut self,
        printer: Option<String>,
        channel: Option<ChannelKind>,
        doc_name: Option<String>,
    ) -> Self {
        if printer.is_some() {
            self.printer = printer;
        }
        if let Some(channel) = channel {
            self.channel = channel;
        }
        if doc_name.is_some() {
            self.doc_name = doc_name;
        }
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        (self.write_timeout_ms > 0).then(|| Duration::from_millis(self.write_timeout_ms))
    }
}
