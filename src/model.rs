//! Structured-document model produced by the converter.
//!
//! Blocks are produced in document order, consumed once by the assembler
//! and then dropped. Style settings are not stored here; they are applied
//! document-wide at serialization time.

use std::fmt;

/// A contiguous span of text sharing one formatting state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub hyperlink: Option<String>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn line_break() -> Self {
        Self::plain("\n")
    }

    pub fn is_line_break(&self) -> bool {
        self.text == "\n"
    }
}

/// Concatenate the text of a run sequence.
pub fn runs_text(runs: &[TextRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// Heading level, always within 1..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    /// Accept only levels 1 through 6.
    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&level)
            .then_some(HeadingLevel(level))
    }

    /// Clamp any level into 1..=6.
    pub fn clamped(level: u8) -> Self {
        HeadingLevel(level.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Raster formats the document package can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
        }
    }
}

/// A decoded image with its declared display size in pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBlock {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl fmt::Debug for ImageBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBlock")
            .field("bytes", &self.data.len())
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// One table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    pub runs: Vec<TextRun>,
    /// Source tag was the header-cell tag; rendered shaded.
    pub header: bool,
}

/// Why a placeholder replaced source content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderReason {
    DiagramUnsupported,
    ImageFailed,
    ImageMissing,
}

impl PlaceholderReason {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaceholderReason::DiagramUnsupported => "diagram unsupported",
            PlaceholderReason::ImageFailed => "image failed",
            PlaceholderReason::ImageMissing => "image missing",
        }
    }

    /// Text shown in the exported document.
    pub fn message(self) -> &'static str {
        match self {
            PlaceholderReason::DiagramUnsupported => {
                "[Diagram - view in HTML or PDF export for the full diagram]"
            }
            PlaceholderReason::ImageFailed => "[Image]",
            PlaceholderReason::ImageMissing => "[Missing image]",
        }
    }
}

impl fmt::Display for PlaceholderReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structural unit of the target document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph {
        runs: Vec<TextRun>,
    },
    Heading {
        level: HeadingLevel,
        runs: Vec<TextRun>,
    },
    /// Raw code text; never inline-parsed.
    CodeBlock {
        text: String,
    },
    /// Plain quote text; nesting depth is not preserved.
    Blockquote {
        text: String,
    },
    ListItem {
        ordered: bool,
        /// 1-based position among sibling items.
        index: usize,
        runs: Vec<TextRun>,
    },
    TableRow {
        cells: Vec<TableCell>,
        /// Starts a new table; consecutive rows after it belong to the same table.
        first_in_table: bool,
    },
    Image(ImageBlock),
    Rule,
    Placeholder {
        reason: PlaceholderReason,
        snippet: Option<String>,
    },
}

impl Block {
    pub fn placeholder(reason: PlaceholderReason) -> Self {
        Block::Placeholder {
            reason,
            snippet: None,
        }
    }

    /// Literal marker a list item is prefixed with.
    pub fn list_prefix(ordered: bool, index: usize) -> String {
        if ordered {
            format!("{}. ", index)
        } else {
            "• ".to_string()
        }
    }

    /// Short lowercase name, handy for logs and test assertions.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Paragraph { .. } => "paragraph",
            Block::Heading { .. } => "heading",
            Block::CodeBlock { .. } => "code",
            Block::Blockquote { .. } => "blockquote",
            Block::ListItem { .. } => "list-item",
            Block::TableRow { .. } => "table-row",
            Block::Image(_) => "image",
            Block::Rule => "rule",
            Block::Placeholder { .. } => "placeholder",
        }
    }
}
