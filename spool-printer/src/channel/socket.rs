//! Raw TCP channel (port 9100)
//!
//! Most thermal printers accept raw ESC/POS on TCP port 9100. There is no
//! document or page framing on the wire, so those steps only check the
//! connection; `end_doc` flushes and `close` shuts the socket down.

use super::{DocumentInfo, RawPrinterChannel, write_counted};
use crate::error::ChannelError;
use std::io::{ErrorKind, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;

/// Default raw printing port
pub const DEFAULT_PORT: u16 = 9100;

/// Network printer channel
///
/// The printer name is `host` or `host:port`.
#[derive(Debug, Clone)]
pub struct SocketChannel {
    connect_timeout: Duration,
    write_timeout: Option<Duration>,
}

impl SocketChannel {
    pub fn new() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            write_timeout: Some(Duration::from_secs(30)),
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set write timeout (`None` blocks until the printer drains)
    pub fn with_write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout = timeout;
        self
    }

    fn resolve(printer: &str) -> Result<SocketAddr, ChannelError> {
        let not_found = || ChannelError::NotFound(printer.to_string());

        if let Ok(addr) = printer.parse::<SocketAddr>() {
            return Ok(addr);
        }
        // Bare IP literal, IPv6 with or without brackets
        let bare = printer.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = bare.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, DEFAULT_PORT));
        }

        let addrs = if printer.contains(':') {
            printer.to_socket_addrs()
        } else {
            (printer, DEFAULT_PORT).to_socket_addrs()
        };
        addrs.map_err(|_| not_found())?.next().ok_or_else(not_found)
    }
}

impl Default for SocketChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl RawPrinterChannel for SocketChannel {
    type Handle = TcpStream;

    fn open(&mut self, printer: &str) -> Result<TcpStream, ChannelError> {
        let addr = Self::resolve(printer)?;
        debug!(%addr, "Connecting to printer");

        let stream = TcpStream::connect_timeout(&addr, self.connect_timeout).map_err(|e| {
            match e.kind() {
                // The printer serves one connection at a time
                ErrorKind::ConnectionRefused | ErrorKind::TimedOut => {
                    ChannelError::Busy(format!("{}: {}", addr, e))
                }
                _ => ChannelError::Io(e),
            }
        })?;
        stream.set_write_timeout(self.write_timeout)?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    fn start_doc(
        &mut self,
        stream: &mut TcpStream,
        _doc: &DocumentInfo,
    ) -> Result<(), ChannelError> {
        stream.peer_addr()?;
        Ok(())
    }

    fn start_page(&mut self, stream: &mut TcpStream) -> Result<(), ChannelError> {
        stream.peer_addr()?;
        Ok(())
    }

    fn write(&mut self, stream: &mut TcpStream, data: &[u8]) -> Result<usize, ChannelError> {
        write_counted(stream, data)
    }

    fn end_page(&mut self, _stream: &mut TcpStream) -> Result<(), ChannelError> {
        Ok(())
    }

    fn end_doc(&mut self, stream: &mut TcpStream) -> Result<(), ChannelError> {
        stream.flush()?;
        Ok(())
    }

    fn close(&mut self, stream: TcpStream) -> Result<(), ChannelError> {
        match stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
