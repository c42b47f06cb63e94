//! Text charsets for ESC/POS printers
//!
//! Printers only understand bytes in their active code page. This module
//! provides:
//! - ASCII output (non-ASCII characters become `?`)
//! - GBK output for Chinese printers, including the Chinese mode framing
//! - Printed-width calculation in encoded bytes

/// Text charset sent to the printer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Charset {
    /// 7-bit ASCII, anything else is replaced with `?`
    #[default]
    Ascii,
    /// GBK (Chinese printers), double-width characters take 2 bytes
    Gbk,
}

impl Charset {
    /// Encode text to printer bytes
    pub fn encode(self, s: &str) -> Vec<u8> {
        match self {
            Charset::Ascii => s
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
            Charset::Gbk => {
                let (cow, _, _) = encoding_rs::GBK.encode(s);
                cow.into_owned()
            }
        }
    }

    /// Printed width of a string (in single-width columns)
    pub fn width(self, s: &str) -> usize {
        match self {
            Charset::Ascii => s.chars().count(),
            Charset::Gbk => gbk_width(s),
        }
    }

    /// Commands selecting this charset, sent before the text
    pub fn prologue(self) -> &'static [u8] {
        match self {
            Charset::Ascii => &[],
            // FS & - Enable Chinese mode, FS C 1 - Select GBK code page
            Charset::Gbk => &[0x1C, 0x26, 0x1C, 0x43, 0x01],
        }
    }

    /// Commands restoring the default charset, sent after the text
    pub fn epilogue(self) -> &'static [u8] {
        match self {
            Charset::Ascii => &[],
            // FS . - Exit Chinese mode
            Charset::Gbk => &[0x1C, 0x2E],
        }
    }
}

/// Get the GBK byte width of a string
///
/// Chinese characters are 2 bytes in GBK, ASCII is 1 byte.
pub fn gbk_width(s: &str) -> usize {
    let (cow, _, _) = encoding_rs::GBK.encode(s);
    cow.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gbk_width() {
        assert_eq!(gbk_width("hello"), 5);
        assert_eq!(gbk_width("你好"), 4);
        assert_eq!(gbk_width("AB中文CD"), 8);
    }

    #[test]
    fn test_ascii_replaces_non_ascii() {
        assert_eq!(Charset::Ascii.encode("café"), b"caf?".to_vec());
        assert_eq!(Charset::Ascii.width("café"), 4);
    }

    #[test]
    fn test_gbk_encode() {
        assert_eq!(Charset::Gbk.encode("中"), vec![0xD6, 0xD0]);
        assert_eq!(Charset::Gbk.width("中a"), 3);
        assert_eq!(Charset::Gbk.prologue(), &[0x1C, 0x26, 0x1C, 0x43, 0x01]);
        assert_eq!(Charset::Gbk.epilogue(), &[0x1C, 0x2E]);
    }
}
