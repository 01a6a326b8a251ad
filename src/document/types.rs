//! Core preview layout types.

/// The preview laid out as terminal lines for a given width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Rendered lines for display
    lines: Vec<RenderedLine>,
    /// Standalone images, in document order
    images: Vec<ImageRef>,
    /// Width the lines were wrapped to
    width: u16,
}

impl Document {
    pub(crate) const fn new(lines: Vec<RenderedLine>, images: Vec<ImageRef>, width: u16) -> Self {
        Self {
            lines,
            images,
            width,
        }
    }

    /// Get total line count.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// All rendered lines.
    pub fn lines(&self) -> &[RenderedLine] {
        &self.lines
    }

    /// Get the lines visible from `offset`, at most `count` of them.
    pub fn visible_lines(&self, offset: usize, count: usize) -> Vec<&RenderedLine> {
        self.lines.iter().skip(offset).take(count).collect()
    }

    /// Get a line by index.
    pub fn line_at(&self, index: usize) -> Option<&RenderedLine> {
        self.lines.get(index)
    }

    /// Standalone images.
    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    /// The image whose placeholder sits on `line`, if any.
    pub fn image_at_line(&self, line: usize) -> Option<&ImageRef> {
        self.images.iter().find(|image| image.line == line)
    }

    /// Layout width in columns.
    pub const fn width(&self) -> u16 {
        self.width
    }
}

/// A single rendered line with styling information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    /// The text content of the line
    content: String,
    /// The type of line (for styling)
    line_type: LineType,
    /// Optional inline-styled spans for rendering
    spans: Vec<InlineSpan>,
}

impl RenderedLine {
    /// Create a new rendered line.
    pub const fn new(content: String, line_type: LineType) -> Self {
        Self {
            content,
            line_type,
            spans: Vec::new(),
        }
    }

    /// Create a rendered line from inline spans.
    pub fn from_spans(line_type: LineType, spans: Vec<InlineSpan>) -> Self {
        let content = spans.iter().map(InlineSpan::text).collect();
        Self {
            content,
            line_type,
            spans,
        }
    }

    /// Get the text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the line type.
    pub const fn line_type(&self) -> LineType {
        self.line_type
    }

    /// Get inline spans, if present.
    pub fn spans(&self) -> Option<&[InlineSpan]> {
        if self.spans.is_empty() {
            None
        } else {
            Some(&self.spans)
        }
    }
}

/// Inline style flags for a text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub emphasis: bool,
    pub strong: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
}

/// A styled inline span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    text: String,
    style: InlineStyle,
}

impl InlineSpan {
    pub const fn new(text: String, style: InlineStyle) -> Self {
        Self { text, style }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> InlineStyle {
        self.style
    }
}

/// Type of a rendered line, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    /// Normal paragraph text
    Paragraph,
    /// Heading with level (1-6)
    Heading(u8),
    /// Bottom border drawn under level 1 and 2 headings
    HeadingRule,
    /// Code block line, including its frame
    CodeBlock,
    /// Block quote line
    BlockQuote,
    /// List item with nesting level
    ListItem(usize),
    /// Table header row
    TableHeader,
    /// Table border or body row
    Table,
    /// Horizontal rule
    HorizontalRule,
    /// Image placeholder
    Image,
    /// Empty line
    Empty,
}

/// Reference to a standalone image in the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Alt text
    pub alt: String,
    /// Image source (path or URL)
    pub src: String,
    /// Line holding the placeholder
    pub line: usize,
}
