//! Windows spooler channel
//!
//! Drives the winspool raw printing calls (`OpenPrinterW`,
//! `StartDocPrinterW`, `StartPagePrinter`, `WritePrinter`, `EndPagePrinter`,
//! `EndDocPrinter`, `ClosePrinter`). With datatype `RAW` the spooler forwards
//! the bytes to the port without driver translation.

use super::{DocumentInfo, RawPrinterChannel};
use crate::error::ChannelError;
use core::ffi::c_void;
use windows::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_INVALID_PRINTER_NAME, ERROR_SHARING_VIOLATION, GetLastError,
};
use windows::Win32::Graphics::Printing::{
    ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, OpenPrinterW, PRINTER_HANDLE,
    StartDocPrinterW, StartPagePrinter, WritePrinter,
};
use windows::core::{PCWSTR, PWSTR};

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn last_error(call: &'static str) -> ChannelError {
    let code = unsafe { GetLastError() }.0;
    ChannelError::Os { call, code }
}

/// Windows spooler channel
///
/// The printer name is the installed printer's name.
#[derive(Debug, Clone, Default)]
pub struct WindowsSpoolChannel;

impl WindowsSpoolChannel {
    pub fn new() -> Self {
        Self
    }
}

impl RawPrinterChannel for WindowsSpoolChannel {
    type Handle = PRINTER_HANDLE;

    fn open(&mut self, printer: &str) -> Result<PRINTER_HANDLE, ChannelError> {
        let mut handle = PRINTER_HANDLE::default();
        let name_w = to_wide(printer);

        let opened =
            unsafe { OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None) };
        if opened.is_ok() {
            return Ok(handle);
        }

        let err = last_error("OpenPrinterW");
        Err(match err {
            ChannelError::Os { code, .. } if code == ERROR_INVALID_PRINTER_NAME.0 => {
                ChannelError::NotFound(printer.to_string())
            }
            ChannelError::Os { code, .. }
                if code == ERROR_SHARING_VIOLATION.0 || code == ERROR_ACCESS_DENIED.0 =>
            {
                ChannelError::Busy(printer.to_string())
            }
            other => other,
        })
    }

    fn start_doc(
        &mut self,
        handle: &mut PRINTER_HANDLE,
        doc: &DocumentInfo,
    ) -> Result<(), ChannelError> {
        let doc_name_w = to_wide(&doc.name);
        let datatype_w = to_wide(&doc.datatype);
        let doc_info = DOC_INFO_1W {
            pDocName: PWSTR(doc_name_w.as_ptr() as *mut _),
            pOutputFile: PWSTR::null(),
            pDatatype: PWSTR(datatype_w.as_ptr() as *mut _),
        };

        let job_id = unsafe { StartDocPrinterW(*handle, 1, &doc_info as *const DOC_INFO_1W) };
        if job_id == 0 {
            return Err(last_error("StartDocPrinterW"));
        }
        Ok(())
    }

    fn start_page(&mut self, handle: &mut PRINTER_HANDLE) -> Result<(), ChannelError> {
        if !unsafe { StartPagePrinter(*handle) }.as_bool() {
            return Err(last_error("StartPagePrinter"));
        }
        Ok(())
    }

    fn write(&mut self, handle: &mut PRINTER_HANDLE, data: &[u8]) -> Result<usize, ChannelError> {
        let len = u32::try_from(data.len())
            .map_err(|_| ChannelError::Rejected(format!("{} bytes exceed one write", data.len())))?;

        let mut written: u32 = 0;
        let ok = unsafe {
            WritePrinter(
                *handle,
                data.as_ptr() as *const c_void,
                len,
                &mut written,
            )
        };

        if !ok.as_bool() && written == 0 {
            return Err(last_error("WritePrinter"));
        }
        Ok(written as usize)
    }

    fn end_page(&mut self, handle: &mut PRINTER_HANDLE) -> Result<(), ChannelError> {
        if !unsafe { EndPagePrinter(*handle) }.as_bool() {
            return Err(last_error("EndPagePrinter"));
        }
        Ok(())
    }

    fn end_doc(&mut self, handle: &mut PRINTER_HANDLE) -> Result<(), ChannelError> {
        if !unsafe { EndDocPrinter(*handle) }.as_bool() {
            return Err(last_error("EndDocPrinter"));
        }
        Ok(())
    }

    fn close(&mut self, handle: PRINTER_HANDLE) -> Result<(), ChannelError> {
        unsafe { ClosePrinter(handle) }.map_err(|_| last_error("ClosePrinter"))
    }
}
