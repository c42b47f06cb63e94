//! QR symbols as raster bitmaps
//!
//! Symbol encoding is delegated to the `qrcode` crate; this module only
//! scales the module matrix into a [`MonoBitmap`].

use crate::error::{PrintError, PrintResult};
use crate::raster::MonoBitmap;
use qrcode::{Color, EcLevel, QrCode};
use tracing::debug;

/// Pixels per QR module
pub const DEFAULT_MODULE_PX: u16 = 20;

/// Light modules around the symbol on each side
pub const QUIET_ZONE: u16 = 4;

/// Render `data` as a QR bitmap
///
/// Each module becomes a `module_px` x `module_px` square, with a 4-module
/// quiet zone around the symbol.
pub fn qr_bitmap(data: &str, module_px: u16, ec_level: EcLevel) -> PrintResult<MonoBitmap> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), ec_level)?;
    let modules = code.width();
    let colors = code.to_colors();

    let module_px = module_px.max(1);
    let side_modules = u16::try_from(modules)
        .ok()
        .and_then(|m| m.checked_add(2 * QUIET_ZONE))
        .ok_or_else(|| PrintError::InvalidConfig(format!("QR symbol too large: {}", modules)))?;
    let side = side_modules
        .checked_mul(module_px)
        .ok_or(PrintError::ImageTooWide(side_modules as u32 * module_px as u32))?;
    debug!(modules, side, "QR symbol rendered");

    let offset = (QUIET_ZONE * module_px) as u32;
    let px = module_px as u32;
    let bitmap = MonoBitmap::from_fn(side, side as u32, |x, y| {
        let (x, y) = (x as u32, y);
        if x < offset || y < offset {
            return false;
        }
        let mx = ((x - offset) / px) as usize;
        let my = ((y - offset) / px) as usize;
        mx < modules && my < modules && colors[my * modules + mx] == Color::Dark
    });

    Ok(bitmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Bitmap;

    #[test]
    fn test_qr_dimensions() {
        // "hello" fits a version 1 symbol: 21 modules + 8 quiet
        let bmp = qr_bitmap("hello", 2, EcLevel::L).unwrap();
        assert_eq!(bmp.width(), 29 * 2);
        assert_eq!(bmp.height(), 29 * 2);
    }

    #[test]
    fn test_quiet_zone_and_finder() {
        let bmp = qr_bitmap("hello", 1, EcLevel::L).unwrap();
        assert!(!bmp.is_dark(0, 0));
        assert!(!bmp.is_dark(3, 3));
        // top-left finder pattern corner
        assert!(bmp.is_dark(4, 4));
        assert!(bmp.is_dark(10, 4));
    }

    #[test]
    fn test_symbol_too_large_for_header() {
        let result = qr_bitmap("hello", 3000, EcLevel::L);
        assert!(matches!(result, Err(PrintError::ImageTooWide(_))));
    }
}
