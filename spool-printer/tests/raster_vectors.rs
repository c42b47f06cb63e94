use spool_printer::raster::{self, BAND_HEIGHT};
use spool_printer::{Bitmap, MonoBitmap};

const PROLOGUE: [u8; 5] = [0x1B, 0x40, 0x1B, 0x33, 0x00];
const EPILOGUE: [u8; 2] = [0x1B, 0x32];

/// Claims every pixel is dark, including ones outside its own bounds
struct AllDark {
    width: u16,
    height: u32,
}

impl Bitmap for AllDark {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_dark(&self, _x: u16, y: u32) -> bool {
        assert!(y < self.height, "sampled row {} beyond height {}", y, self.height);
        true
    }
}

/// Count `ESC * 33` band headers in an encoded stream
fn band_headers(data: &[u8], width: u16) -> usize {
    let [lo, hi] = width.to_le_bytes();
    data.windows(5)
        .filter(|w| *w == [0x1B, 0x2A, 33, lo, hi])
        .count()
}

#[test]
fn test_empty_bitmap() {
    let data = raster::encode(&MonoBitmap::new(0, 0));
    assert_eq!(data, vec![0x1B, 0x40, 0x1B, 0x33, 0x00, 0x1B, 0x32]);
}

#[test]
fn test_single_dark_column_vector() {
    let bitmap = MonoBitmap::from_fn(1, 24, |_, _| true);
    let data = raster::encode(&bitmap);
    assert_eq!(
        data,
        vec![
            0x1B, 0x40, // reset
            0x1B, 0x33, 0x00, // line spacing 0
            0x1B, 0x2A, 0x21, 0x01, 0x00, // band header, width 1
            0xFF, 0xFF, 0xFF, // column 0
            0x0A, // band LF
            0x1B, 0x32, // restore spacing
        ]
    );
}

#[test]
fn test_short_bitmap_has_one_band() {
    for height in 1..=BAND_HEIGHT {
        let bitmap = MonoBitmap::new(3, height);
        let data = raster::encode(&bitmap);
        assert_eq!(band_headers(&data, 3), 1, "height {}", height);
        assert_eq!(data.len(), 5 + 5 + 3 * 3 + 1 + 2);
        assert_eq!(data[data.len() - 3], 0x0A);
    }
}

#[test]
fn test_band_count_is_ceil_of_height() {
    for (height, bands) in [(0, 0), (1, 1), (24, 1), (25, 2), (48, 2), (49, 3), (100, 5)] {
        let data = raster::encode(&MonoBitmap::new(2, height));
        assert_eq!(data.len(), 7 + bands * (5 + 2 * 3 + 1), "height {}", height);
        // all-light pixels never collide with the header pattern
        assert_eq!(band_headers(&data, 2), bands, "height {}", height);
    }
}

#[test]
fn test_rows_beyond_height_are_blank() {
    // 10 rows: first slice full, second slice only top 2 rows, third empty
    let data = raster::encode(&AllDark {
        width: 1,
        height: 10,
    });
    assert_eq!(&data[5..10], &[0x1B, 0x2A, 33, 1, 0]);
    assert_eq!(&data[10..13], &[0xFF, 0xC0, 0x00]);
    assert_eq!(data[13], 0x0A);
}

#[test]
fn test_last_band_partial() {
    let data = raster::encode(&AllDark {
        width: 2,
        height: 30,
    });
    // band 0: full columns
    assert_eq!(&data[10..16], &[0xFF; 6]);
    // band 1 starts after LF: 6 rows dark
    let band1 = 10 + 6 + 1;
    assert_eq!(&data[band1..band1 + 5], &[0x1B, 0x2A, 33, 2, 0]);
    assert_eq!(
        &data[band1 + 5..band1 + 11],
        &[0xFC, 0x00, 0x00, 0xFC, 0x00, 0x00]
    );
    assert_eq!(&data[data.len() - 2..], &EPILOGUE);
}

#[test]
fn test_slices_follow_rows() {
    // one dark pixel per slice: rows 0, 9 and 23
    let bitmap = MonoBitmap::from_fn(1, 24, |_, y| matches!(y, 0 | 9 | 23));
    let data = raster::encode(&bitmap);
    assert_eq!(&data[10..13], &[0x80, 0x40, 0x01]);
}

#[test]
fn test_columns_left_to_right() {
    let bitmap = MonoBitmap::from_fn(3, 8, |x, y| x == 2 && y == 0);
    let data = raster::encode(&bitmap);
    assert_eq!(
        &data[10..19],
        &[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00]
    );
}

#[test]
fn test_wide_header_split() {
    let cases: [(u16, u8, u8); 4] = [(255, 0xFF, 0x00), (256, 0x00, 0x01), (257, 0x01, 0x01), (576, 0x40, 0x02)];
    for (width, lo, hi) in cases {
        let data = raster::encode(&MonoBitmap::new(width, 1));
        assert_eq!(&data[5..10], &[0x1B, 0x2A, 33, lo, hi], "width {}", width);
        assert_eq!(data.len(), 7 + 5 + 3 * width as usize + 1);
    }
}

#[test]
fn test_max_width_header() {
    let data = raster::encode(&AllDark {
        width: u16::MAX,
        height: 1,
    });
    assert_eq!(&data[5..10], &[0x1B, 0x2A, 33, 0xFF, 0xFF]);
}

#[test]
fn test_zero_width_with_height() {
    let data = raster::encode(&MonoBitmap::new(0, 30));
    let mut expected = PROLOGUE.to_vec();
    for _ in 0..2 {
        expected.extend_from_slice(&[0x1B, 0x2A, 33, 0, 0, 0x0A]);
    }
    expected.extend_from_slice(&EPILOGUE);
    assert_eq!(data, expected);
}

#[test]
fn test_encoding_is_deterministic() {
    let bitmap = MonoBitmap::from_fn(37, 53, |x, y| (x as u32 * 7 + y * 3) % 5 == 0);
    assert_eq!(raster::encode(&bitmap), raster::encode(&bitmap));
}
