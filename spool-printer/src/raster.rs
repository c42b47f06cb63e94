//! ESC/POS bit-image raster encoder
//!
//! Converts a 1-bit bitmap into `ESC *` 24-dot double-density bands:
//!
//! ```text
//! ESC @                    reset
//! ESC 3 0                  line spacing 0, bands touch
//! ┌ ESC * 33 nL nH         band header, width = nL + 256 * nH
//! │ [b0 b1 b2] * width     3 vertical bytes per column, MSB = top row
//! └ LF                     print band
//!   ... one band per 24 rows
//! ESC 2                    restore default line spacing
//! ```

/// Rows covered by one band
pub const BAND_HEIGHT: u32 = 24;

/// `ESC @` - Initialize printer
pub const RESET: [u8; 2] = [0x1B, 0x40];

/// `ESC 3 0` - Line spacing 0 dots
pub const LINE_SPACING_ZERO: [u8; 3] = [0x1B, 0x33, 0x00];

/// `ESC 2` - Default line spacing
pub const LINE_SPACING_DEFAULT: [u8; 2] = [0x1B, 0x32];

/// `ESC *` mode 33: 24-dot double density
pub const MODE_24_DOT_DOUBLE: u8 = 33;

/// Brightness below this is printed as ink
pub const DARK_THRESHOLD: f32 = 0.5;

/// A rectangular bitmap the encoder can sample
///
/// Width is a `u16` because the band header carries it in two bytes.
/// The encoder only calls [`is_dark`](Bitmap::is_dark) for
/// `x < width()` and `y < height()`.
pub trait Bitmap {
    fn width(&self) -> u16;
    fn height(&self) -> u32;
    fn is_dark(&self, x: u16, y: u32) -> bool;
}

impl<B: Bitmap + ?Sized> Bitmap for &B {
    fn width(&self) -> u16 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn is_dark(&self, x: u16, y: u32) -> bool {
        (**self).is_dark(x, y)
    }
}

/// HSL lightness of an RGB color, in `0.0..=1.0`
pub fn brightness(r: u8, g: u8, b: u8) -> f32 {
    let max = r.max(g).max(b) as f32;
    let min = r.min(g).min(b) as f32;
    (max + min) / 2.0 / 255.0
}

/// Whether an RGB color counts as ink
pub fn is_dark_rgb(r: u8, g: u8, b: u8) -> bool {
    brightness(r, g, b) < DARK_THRESHOLD
}

/// Owned 1-bit bitmap, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonoBitmap {
    width: u16,
    height: u32,
    pixels: Vec<bool>,
}

impl MonoBitmap {
    /// Create an all-light bitmap
    pub fn new(width: u16, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![false; width as usize * height as usize],
        }
    }

    /// Create a bitmap by sampling `f(x, y)` for every pixel
    pub fn from_fn(width: u16, height: u32, mut f: impl FnMut(u16, u32) -> bool) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Set a single pixel; out-of-range coordinates are ignored
    pub fn set(&mut self, x: u16, y: u32, dark: bool) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.pixels[idx] = dark;
        }
    }

    fn index(&self, x: u16, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl Bitmap for MonoBitmap {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_dark(&self, x: u16, y: u32) -> bool {
        self.pixels[self.index(x, y)]
    }
}

/// Encode a bitmap as an ESC/POS raster stream
///
/// Never fails. A 0x0 bitmap yields only the reset/spacing prologue and the
/// spacing restore.
pub fn encode<B: Bitmap + ?Sized>(bitmap: &B) -> Vec<u8> {
    let width = bitmap.width();
    let height = bitmap.height();
    let bands = height.div_ceil(BAND_HEIGHT);
    let band_len = 5 + 3 * width as usize + 1;

    let mut buf = Vec::with_capacity(7 + bands as usize * band_len);
    buf.extend_from_slice(&RESET);
    buf.extend_from_slice(&LINE_SPACING_ZERO);

    for band in 0..bands {
        let top = band * BAND_HEIGHT;
        let [lo, hi] = width.to_le_bytes();
        buf.extend_from_slice(&[0x1B, 0x2A, MODE_24_DOT_DOUBLE, lo, hi]);

        for x in 0..width {
            for k in 0..3 {
                buf.push(column_slice(bitmap, x, top + k * 8, height));
            }
        }

        buf.push(0x0A);
    }

    buf.extend_from_slice(&LINE_SPACING_DEFAULT);
    buf
}

/// Pack 8 vertical pixels starting at `y0` into one byte, top row in the MSB
fn column_slice<B: Bitmap + ?Sized>(bitmap: &B, x: u16, y0: u32, height: u32) -> u8 {
    let mut slice = 0u8;
    for b in 0..8 {
        let y = y0 + b;
        if y < height && bitmap.is_dark(x, y) {
            slice |= 1 << (7 - b);
        }
    }
    slice
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brightness_threshold() {
        assert!(is_dark_rgb(0, 0, 0));
        assert!(!is_dark_rgb(255, 255, 255));
        // Pure red has lightness exactly 0.5: not dark
        assert!(!is_dark_rgb(255, 0, 0));
        assert!(is_dark_rgb(127, 127, 127));
        assert!(!is_dark_rgb(128, 128, 128));
    }

    #[test]
    fn test_from_fn_and_set() {
        let mut bmp = MonoBitmap::from_fn(3, 2, |x, y| x as u32 == y);
        assert!(bmp.is_dark(0, 0));
        assert!(bmp.is_dark(1, 1));
        assert!(!bmp.is_dark(2, 1));

        bmp.set(2, 1, true);
        bmp.set(9, 9, true);
        assert!(bmp.is_dark(2, 1));
    }

    #[test]
    fn test_column_slice_bit_order() {
        // Only row 0 dark -> MSB
        let bmp = MonoBitmap::from_fn(1, 8, |_, y| y == 0);
        assert_eq!(column_slice(&bmp, 0, 0, 8), 0x80);

        // Only row 7 dark -> LSB
        let bmp = MonoBitmap::from_fn(1, 8, |_, y| y == 7);
        assert_eq!(column_slice(&bmp, 0, 0, 8), 0x01);
    }

    #[test]
    fn test_single_row_band() {
        let bmp = MonoBitmap::from_fn(2, 1, |_, _| true);
        let data = encode(&bmp);
        assert_eq!(
            data,
            vec![
                0x1B, 0x40, 0x1B, 0x33, 0x00, // prologue
                0x1B, 0x2A, 33, 2, 0, // header
                0x80, 0x00, 0x00, 0x80, 0x00, 0x00, // two columns
                0x0A, 0x1B, 0x32,
            ]
        );
    }
}
