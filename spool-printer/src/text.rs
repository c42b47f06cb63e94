//! Plain-text framing
//!
//! Wraps text to a fixed column and frames it with ESC/POS commands, as an
//! alternative byte producer to the raster encoder.

use crate::encoding::Charset;

/// Default column for per-line aligned output (80mm paper, 48 characters)
pub const ALIGNED_COLUMN: usize = 48;

/// Default column for the margin block layout
pub const MARGIN_BLOCK_COLUMN: usize = 45;

/// What happens to the spaces left at the end of a wrapped line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimPolicy {
    /// Keep each word's trailing separator, including at line ends.
    /// An overlong first word still starts a new (empty) line.
    Keep,
    /// Strip trailing whitespace per line and never emit an empty break
    TrimTrailing,
}

/// Word-wrap settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapOptions {
    pub column: usize,
    pub trim: TrimPolicy,
}

impl WrapOptions {
    pub fn new(column: usize, trim: TrimPolicy) -> Self {
        Self {
            column: column.max(1),
            trim,
        }
    }
}

/// Horizontal alignment (`ESC a n`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    fn command(self) -> [u8; 3] {
        let n = match self {
            Alignment::Left => 0x00,
            Alignment::Center => 0x01,
            Alignment::Right => 0x02,
        };
        [0x1B, 0x61, n]
    }
}

/// How wrapped lines are framed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextLayout {
    /// `ESC a n` before every line, LF after it
    AlignedLines { alignment: Alignment },
    /// `GS L nL nH` left margin and `ESC J n` feed once, then the lines
    /// separated by LF
    MarginBlock { left_margin: u16, feed_dots: u8 },
}

/// Wrap text into lines
///
/// Words are split on single spaces, widths are measured in the charset's
/// printed columns. Each input line (`\n`) is wrapped on its own.
pub fn wrap(text: &str, options: WrapOptions, charset: Charset) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        wrap_paragraph(paragraph, options, charset, &mut lines);
    }
    lines
}

fn wrap_paragraph(text: &str, options: WrapOptions, charset: Charset, lines: &mut Vec<String>) {
    let trim = options.trim == TrimPolicy::TrimTrailing;
    let mut current = String::new();
    let mut width = 0;

    for word in text.split(' ') {
        let word_width = charset.width(word);
        if width + word_width > options.column && !(trim && width == 0) {
            lines.push(finish_line(std::mem::take(&mut current), trim));
            width = 0;
        }
        current.push_str(word);
        current.push(' ');
        width += word_width + 1;
    }

    lines.push(finish_line(current, trim));
}

fn finish_line(line: String, trim: bool) -> String {
    if trim {
        line.trim_end().to_string()
    } else {
        line
    }
}

/// Plain-text ESC/POS producer
///
/// ```
/// use spool_printer::{Alignment, TextFormatter};
///
/// let data = TextFormatter::aligned(Alignment::Center)
///     .with_column(10)
///     .format("hello receipt world");
///
/// assert_eq!(&data[..3], &[0x1B, 0x61, 0x01]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFormatter {
    wrap: WrapOptions,
    layout: TextLayout,
    charset: Charset,
}

impl TextFormatter {
    /// Per-line aligned output: 48 columns, trailing spaces trimmed
    pub fn aligned(alignment: Alignment) -> Self {
        Self {
            wrap: WrapOptions::new(ALIGNED_COLUMN, TrimPolicy::TrimTrailing),
            layout: TextLayout::AlignedLines { alignment },
            charset: Charset::Ascii,
        }
    }

    /// Margin block output: 16-dot left margin, 40-dot feed, 45 columns,
    /// trailing spaces kept
    pub fn margin_block() -> Self {
        Self {
            wrap: WrapOptions::new(MARGIN_BLOCK_COLUMN, TrimPolicy::Keep),
            layout: TextLayout::MarginBlock {
                left_margin: 16,
                feed_dots: 40,
            },
            charset: Charset::Ascii,
        }
    }

    /// Set the wrap column
    pub fn with_column(mut self, column: usize) -> Self {
        self.wrap = WrapOptions::new(column, self.wrap.trim);
        self
    }

    /// Set the trim policy
    pub fn with_trim(mut self, trim: TrimPolicy) -> Self {
        self.wrap.trim = trim;
        self
    }

    /// Set the output charset
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn wrap_options(&self) -> WrapOptions {
        self.wrap
    }

    pub fn layout(&self) -> TextLayout {
        self.layout
    }

    /// Wrap and frame `text` into printer bytes
    pub fn format(&self, text: &str) -> Vec<u8> {
        let lines = wrap(text, self.wrap, self.charset);
        let mut buf = Vec::with_capacity(text.len() + lines.len() * 4 + 16);
        buf.extend_from_slice(self.charset.prologue());

        match self.layout {
            TextLayout::AlignedLines { alignment } => {
                for line in &lines {
                    buf.extend_from_slice(&alignment.command());
                    buf.extend_from_slice(&self.charset.encode(line));
                    buf.push(b'\n');
                }
            }
            TextLayout::MarginBlock {
                left_margin,
                feed_dots,
            } => {
                // GS L nL nH - Set left margin
                let [lo, hi] = left_margin.to_le_bytes();
                buf.extend_from_slice(&[0x1D, 0x4C, lo, hi]);
                // ESC J n - Print and feed n dots
                buf.extend_from_slice(&[0x1B, 0x4A, feed_dots]);
                buf.extend_from_slice(&self.charset.encode(&lines.join("\n")));
                buf.push(b'\n');
            }
        }

        buf.extend_from_slice(self.charset.epilogue());
        buf
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::aligned(Alignment::Left)
    }
}
