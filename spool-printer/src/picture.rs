//! Image files as raster bitmaps

use crate::error::{PrintError, PrintResult};
use crate::raster::{Bitmap, MonoBitmap, is_dark_rgb};
use image::{DynamicImage, GrayImage, Luma, RgbImage};
use std::path::Path;
use tracing::{info, instrument};

/// A decoded image sampled with the raster brightness threshold
///
/// Alpha is ignored; only the RGB brightness decides ink.
#[derive(Debug, Clone)]
pub struct ImageBitmap {
    rgb: RgbImage,
    width: u16,
}

impl ImageBitmap {
    /// Wrap a decoded image
    ///
    /// Fails if the image is wider than a band header can describe.
    pub fn new(img: &DynamicImage) -> PrintResult<Self> {
        let width =
            u16::try_from(img.width()).map_err(|_| PrintError::ImageTooWide(img.width()))?;
        Ok(Self {
            rgb: img.to_rgb8(),
            width,
        })
    }

    /// Decode an image file
    #[instrument]
    pub fn open(path: &Path) -> PrintResult<Self> {
        let img = image::open(path)?;
        info!(width = img.width(), height = img.height(), "image opened");
        Self::new(&img)
    }
}

impl Bitmap for ImageBitmap {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u32 {
        self.rgb.height()
    }

    fn is_dark(&self, x: u16, y: u32) -> bool {
        let [r, g, b] = self.rgb.get_pixel(x as u32, y).0;
        is_dark_rgb(r, g, b)
    }
}

impl MonoBitmap {
    /// Render as 8-bit grayscale, ink black on white
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width() as u32, self.height(), |x, y| {
            if self.is_dark(x as u16, y) {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        })
    }
}
