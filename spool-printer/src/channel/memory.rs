//! In-memory channel
//!
//! Records every protocol call and captures written bytes. Clones share
//! state, so a test can keep one clone for inspection while a job consumes
//! another. Failures can be injected per step.

use super::{DocumentInfo, RawPrinterChannel};
use crate::error::{ChannelError, SpoolStep};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// A protocol call as observed by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(String),
    StartDoc { name: String, datatype: String },
    StartPage,
    Write(usize),
    EndPage,
    EndDoc,
    Close,
}

impl Call {
    /// The protocol step this call belongs to
    pub fn step(&self) -> SpoolStep {
        match self {
            Call::Open(_) => SpoolStep::Open,
            Call::StartDoc { .. } => SpoolStep::StartDocument,
            Call::StartPage => SpoolStep::StartPage,
            Call::Write(_) => SpoolStep::Write,
            Call::EndPage => SpoolStep::EndPage,
            Call::EndDoc => SpoolStep::EndDocument,
            Call::Close => SpoolStep::Close,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    printers: Option<Vec<String>>,
    failures: HashSet<SpoolStep>,
    accept_limit: Option<usize>,
    calls: Vec<Call>,
    output: Vec<u8>,
    open_handles: usize,
    next_handle: u32,
}

/// Handle issued by [`MemoryChannel`]
#[derive(Debug)]
pub struct MemoryHandle {
    id: u32,
}

impl MemoryHandle {
    pub fn id(&self) -> u32 {
        self.id
    }
}

/// In-memory printer device
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    state: Arc<Mutex<State>>,
}

impl MemoryChannel {
    /// A device that accepts any printer name and every call
    pub fn new() -> Self {
        Self::default()
    }

    /// Only these printer names can be opened
    pub fn with_printers<I, S>(self, printers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().printers = Some(printers.into_iter().map(Into::into).collect());
        self
    }

    /// Make the given step fail
    pub fn fail_on(self, step: SpoolStep) -> Self {
        self.lock().failures.insert(step);
        self
    }

    /// Accept at most `limit` bytes per write
    pub fn accept_at_most(self, limit: usize) -> Self {
        self.lock().accept_limit = Some(limit);
        self
    }

    /// Calls observed so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Steps observed so far, in order
    pub fn steps(&self) -> Vec<SpoolStep> {
        self.lock().calls.iter().map(Call::step).collect()
    }

    /// Bytes accepted by the device so far
    pub fn output(&self) -> Vec<u8> {
        self.lock().output.clone()
    }

    /// Handles opened and not yet closed
    pub fn open_handles(&self) -> usize {
        self.lock().open_handles
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a call and return the injected failure for its step, if any
    fn record(&self, call: Call) -> Result<(), ChannelError> {
        let mut state = self.lock();
        let step = call.step();
        state.calls.push(call);
        if state.failures.contains(&step) {
            return Err(ChannelError::Rejected(format!("injected {} failure", step)));
        }
        Ok(())
    }
}

impl RawPrinterChannel for MemoryChannel {
    type Handle = MemoryHandle;

    fn open(&mut self, printer: &str) -> Result<MemoryHandle, ChannelError> {
        self.record(Call::Open(printer.to_string()))?;

        let mut state = self.lock();
        if let Some(printers) = &state.printers
            && !printers.iter().any(|p| p == printer)
        {
            return Err(ChannelError::NotFound(printer.to_string()));
        }
        state.open_handles += 1;
        state.next_handle += 1;
        Ok(MemoryHandle {
            id: state.next_handle,
        })
    }

    fn start_doc(
        &mut self,
        _handle: &mut MemoryHandle,
        doc: &DocumentInfo,
    ) -> Result<(), ChannelError> {
        self.record(Call::StartDoc {
            name: doc.name.clone(),
            datatype: doc.datatype.clone(),
        })
    }

    fn start_page(&mut self, _handle: &mut MemoryHandle) -> Result<(), ChannelError> {
        self.record(Call::StartPage)
    }

    fn write(&mut self, _handle: &mut MemoryHandle, data: &[u8]) -> Result<usize, ChannelError> {
        self.record(Call::Write(data.len()))?;

        let mut state = self.lock();
        let accepted = state.accept_limit.map_or(data.len(), |l| l.min(data.len()));
        state.output.extend_from_slice(&data[..accepted]);
        Ok(accepted)
    }

    fn end_page(&mut self, _handle: &mut MemoryHandle) -> Result<(), ChannelError> {
        self.record(Call::EndPage)
    }

    fn end_doc(&mut self, _handle: &mut MemoryHandle) -> Result<(), ChannelError> {
        self.record(Call::EndDoc)
    }

    fn close(&mut self, _handle: MemoryHandle) -> Result<(), ChannelError> {
        // The handle is released even when the close call reports failure
        {
            let mut state = self.lock();
            state.open_handles = state.open_handles.saturating_sub(1);
        }
        self.record(Call::Close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_printer() {
        let mut channel = MemoryChannel::new().with_printers(["POS-80"]);
        assert!(matches!(
            channel.open("Other"),
            Err(ChannelError::NotFound(name)) if name == "Other"
        ));
        assert_eq!(channel.open_handles(), 0);
        assert!(channel.open("POS-80").is_ok());
        assert_eq!(channel.open_handles(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let probe = MemoryChannel::new().accept_at_most(2);
        let mut channel = probe.clone();
        let mut handle = channel.open("any").unwrap();
        assert_eq!(channel.write(&mut handle, b"abcd").unwrap(), 2);
        channel.close(handle).unwrap();

        assert_eq!(probe.output(), b"ab");
        assert_eq!(
            probe.calls(),
            vec![Call::Open("any".to_string()), Call::Write(4), Call::Close]
        );
        assert_eq!(probe.open_handles(), 0);
    }
}
