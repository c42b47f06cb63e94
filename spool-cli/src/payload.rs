//! Turns a subcommand into ESC/POS bytes plus a default document name

use anyhow::{Context, Result};
use clap::ValueEnum;
use spool_printer::{
    Alignment, Bitmap, Charset, EcLevel, ImageBitmap, MonoBitmap, TextFormatter, TrimPolicy,
    qr_bitmap, raster,
};
use std::io::Read;
use std::path::Path;
use tracing::info;

pub const QR_DOCUMENT: &str = "QRCode Print Job";
pub const TEXT_DOCUMENT: &str = "Text Print Job";
pub const IMAGE_DOCUMENT: &str = "Image Print Job";
pub const RAW_DOCUMENT: &str = "Raw Document";

#[derive(Debug)]
pub struct Payload {
    pub document: &'static str,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EcArg {
    L,
    M,
    Q,
    H,
}

impl From<EcArg> for EcLevel {
    fn from(ec: EcArg) -> Self {
        match ec {
            EcArg::L => EcLevel::L,
            EcArg::M => EcLevel::M,
            EcArg::Q => EcLevel::Q,
            EcArg::H => EcLevel::H,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    /// ESC a per line, 48 columns
    Aligned,
    /// Left margin and paper feed, 45 columns
    Margin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TrimArg {
    Keep,
    Trailing,
}

impl From<TrimArg> for TrimPolicy {
    fn from(trim: TrimArg) -> Self {
        match trim {
            TrimArg::Keep => TrimPolicy::Keep,
            TrimArg::Trailing => TrimPolicy::TrimTrailing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlignArg {
    Left,
    Center,
    Right,
}

impl From<AlignArg> for Alignment {
    fn from(align: AlignArg) -> Self {
        match align {
            AlignArg::Left => Alignment::Left,
            AlignArg::Center => Alignment::Center,
            AlignArg::Right => Alignment::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CharsetArg {
    Ascii,
    Gbk,
}

impl From<CharsetArg> for Charset {
    fn from(charset: CharsetArg) -> Self {
        match charset {
            CharsetArg::Ascii => Charset::Ascii,
            CharsetArg::Gbk => Charset::Gbk,
        }
    }
}

/// Text subcommand options
#[derive(Debug, Clone)]
pub struct TextOptions {
    pub layout: LayoutArg,
    pub column: Option<usize>,
    pub trim: Option<TrimArg>,
    pub align: AlignArg,
    pub charset: CharsetArg,
}

impl TextOptions {
    pub fn formatter(&self) -> TextFormatter {
        let mut formatter = match self.layout {
            LayoutArg::Aligned => TextFormatter::aligned(self.align.into()),
            LayoutArg::Margin => TextFormatter::margin_block(),
        };
        if let Some(column) = self.column {
            formatter = formatter.with_column(column);
        }
        if let Some(trim) = self.trim {
            formatter = formatter.with_trim(trim.into());
        }
        formatter.with_charset(self.charset.into())
    }
}

/// Render a QR symbol with the raster module size
pub fn qr_symbol(text: &str, module_px: u16, ec: EcArg) -> Result<MonoBitmap> {
    let bitmap = qr_bitmap(text, module_px, ec.into()).context("Failed to render QR code")?;
    info!(
        width = bitmap.width(),
        height = bitmap.height(),
        "Rendered QR code"
    );
    Ok(bitmap)
}

pub fn qr(bitmap: &MonoBitmap) -> Payload {
    Payload {
        document: QR_DOCUMENT,
        data: raster::encode(bitmap),
    }
}

/// Save a bitmap as a grayscale PNG
pub fn save_png(bitmap: &MonoBitmap, path: &Path) -> Result<()> {
    bitmap
        .to_gray_image()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Saved QR image");
    Ok(())
}

pub fn text(text: &str, options: &TextOptions) -> Payload {
    Payload {
        document: TEXT_DOCUMENT,
        data: options.formatter().format(text),
    }
}

pub fn image(path: &Path) -> Result<Payload> {
    let bitmap = ImageBitmap::open(path)
        .with_context(|| format!("Failed to load image {}", path.display()))?;
    Ok(Payload {
        document: IMAGE_DOCUMENT,
        data: raster::encode(&bitmap),
    })
}

pub fn raw(path: &Path) -> Result<Payload> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Payload {
        document: RAW_DOCUMENT,
        data,
    })
}

/// Use the argument if given, otherwise read all of stdin
pub fn text_or_stdin(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read text from stdin")?;
            Ok(buf.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(layout: LayoutArg) -> TextOptions {
        TextOptions {
            layout,
            column: None,
            trim: None,
            align: AlignArg::Left,
            charset: CharsetArg::Ascii,
        }
    }

    #[test]
    fn test_margin_layout_frames_text() {
        let payload = text("hello", &options(LayoutArg::Margin));
        assert_eq!(payload.document, TEXT_DOCUMENT);
        assert!(
            payload
                .data
                .starts_with(&[0x1D, 0x4C, 0x10, 0x00, 0x1B, 0x4A, 40])
        );
    }

    #[test]
    fn test_aligned_layout_uses_alignment() {
        let mut opts = options(LayoutArg::Aligned);
        opts.align = AlignArg::Center;
        let payload = text("hi", &opts);
        assert_eq!(payload.data, vec![0x1B, 0x61, 0x01, b'h', b'i', 0x0A]);
    }

    #[test]
    fn test_column_override() {
        let mut opts = options(LayoutArg::Aligned);
        opts.column = Some(5);
        assert_eq!(opts.formatter().wrap_options().column, 5);
    }

    #[test]
    fn test_qr_payload_is_raster() {
        let payload = qr(&qr_symbol("hello", 2, EcArg::L).unwrap());
        assert_eq!(payload.document, QR_DOCUMENT);
        assert_eq!(&payload.data[..5], &[0x1B, 0x40, 0x1B, 0x33, 0x00]);
        assert_eq!(&payload.data[payload.data.len() - 2..], &[0x1B, 0x32]);
    }

    #[test]
    fn test_qr_png_keeps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("QRCode.png");
        let symbol = qr_symbol("hello", 3, EcArg::L).unwrap();

        save_png(&symbol, &path).unwrap();

        let saved = ImageBitmap::open(&path).unwrap();
        assert_eq!(saved.width(), symbol.width());
        assert_eq!(saved.height(), symbol.height());
        // quiet zone light, finder corner dark
        assert!(!saved.is_dark(0, 0));
        assert!(saved.is_dark(12, 12));
    }

    #[test]
    fn test_raw_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.bin");
        std::fs::write(&path, [0x1B, 0x40, 0x0A]).unwrap();

        let payload = raw(&path).unwrap();
        assert_eq!(payload.document, RAW_DOCUMENT);
        assert_eq!(payload.data, vec![0x1B, 0x40, 0x0A]);
    }

    #[test]
    fn test_raw_missing_file() {
        assert!(raw(Path::new("/nonexistent/job.bin")).is_err());
    }
}
