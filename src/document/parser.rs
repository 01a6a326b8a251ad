//! Preview layout: comrak AST to wrapped terminal lines.

use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue, TableAlignment};
use comrak::{Arena, parse_document};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::types::{Document, ImageRef, InlineSpan, InlineStyle, LineType, RenderedLine};
use crate::render::markdown_options;

const CODE_RIGHT_PADDING: usize = 3;

impl Document {
    /// Parse markdown and lay it out for a pane `width` columns wide.
    ///
    /// # Example
    ///
    /// ```
    /// use marklive::document::Document;
    ///
    /// let doc = Document::parse("# Hello\n\nWorld", 40);
    /// assert!(doc.line_count() >= 3);
    /// ```
    pub fn parse(source: &str, width: u16) -> Self {
        let arena = Arena::new();
        let root = parse_document(&arena, source, &markdown_options());
        layout(root, width)
    }
}

/// Lay out an already-parsed document.
pub fn layout<'a>(root: &'a AstNode<'a>, width: u16) -> Document {
    let mut layout = Layout {
        lines: Vec::new(),
        images: Vec::new(),
        width: usize::from(width.max(1)),
    };
    layout.block(root, 0);
    while layout
        .lines
        .last()
        .is_some_and(|line| line.line_type() == LineType::Empty)
    {
        layout.lines.pop();
    }
    Document::new(layout.lines, layout.images, width)
}

struct Layout {
    lines: Vec<RenderedLine>,
    images: Vec<ImageRef>,
    width: usize,
}

impl Layout {
    fn block<'a>(&mut self, node: &'a AstNode<'a>, depth: usize) {
        let value = node.data.borrow().value.clone();
        match value {
            NodeValue::Heading(heading) => {
                self.blank();
                let spans = collect_inline_spans(node);
                for line_spans in wrap_spans(&spans, self.width, "", "") {
                    self.lines.push(RenderedLine::from_spans(
                        LineType::Heading(heading.level),
                        line_spans,
                    ));
                }
                if heading.level <= 2 {
                    self.lines.push(RenderedLine::new(
                        "─".repeat(self.width),
                        LineType::HeadingRule,
                    ));
                }
                self.blank();
            }

            NodeValue::Paragraph => {
                let images = standalone_images(node);
                if images.is_empty() {
                    let spans = collect_inline_spans(node);
                    self.push_wrapped(&spans, LineType::Paragraph, "", "");
                } else {
                    for (alt, src) in images {
                        self.image(alt, src);
                    }
                }
                self.blank();
            }

            NodeValue::CodeBlock(block) => {
                let language = block.info.split_whitespace().next().map(ToString::to_string);
                self.code_block(&block.literal, language.as_deref(), "");
                self.blank();
            }

            NodeValue::List(list) => {
                self.list(node, list.list_type, list.start, list.delimiter, depth + 1);
                if depth == 0 {
                    self.blank();
                }
            }

            NodeValue::BlockQuote => {
                self.blockquote(node, 1);
                self.blank();
            }

            NodeValue::ThematicBreak => {
                self.lines.push(RenderedLine::new(
                    "─".repeat(self.width),
                    LineType::HorizontalRule,
                ));
                self.blank();
            }

            NodeValue::Table(table) => {
                for (line, line_type) in render_table(node, &table.alignments, self.width) {
                    self.lines.push(RenderedLine::new(line, line_type));
                }
                self.blank();
            }

            NodeValue::HtmlBlock(block) => {
                for raw_line in block.literal.lines() {
                    let spans = vec![InlineSpan::new(raw_line.to_string(), InlineStyle::default())];
                    self.push_wrapped(&spans, LineType::Paragraph, "", "");
                }
                self.blank();
            }

            NodeValue::FootnoteDefinition(def) => {
                let label = format!("[^{}]: ", def.name);
                let continuation = " ".repeat(label.width());
                let spans = collect_inline_spans(node);
                self.push_wrapped(&spans, LineType::Paragraph, &label, &continuation);
                self.blank();
            }

            _ => {
                for child in node.children() {
                    self.block(child, depth);
                }
            }
        }
    }

    fn list<'a>(
        &mut self,
        node: &'a AstNode<'a>,
        list_type: ListType,
        start: usize,
        delimiter: ListDelimType,
        depth: usize,
    ) {
        let delimiter = match delimiter {
            ListDelimType::Paren => ')',
            ListDelimType::Period => '.',
        };
        let max_number = start + node.children().count().saturating_sub(1);
        let number_width = max_number.to_string().len();

        for (index, child) in node.children().enumerate() {
            let marker = match list_type {
                ListType::Bullet => "• ".to_string(),
                ListType::Ordered => {
                    format!("{:>number_width$}{delimiter} ", start + index)
                }
            };
            let task = match child.data.borrow().value {
                NodeValue::TaskItem(symbol) => Some(symbol.is_some()),
                _ => None,
            };
            let marker = match task {
                Some(true) => "[x] ".to_string(),
                Some(false) => "[ ] ".to_string(),
                None => marker,
            };
            self.list_item(child, &marker, depth);
        }
    }

    fn list_item<'a>(&mut self, node: &'a AstNode<'a>, marker: &str, depth: usize) {
        let indent = "  ".repeat(depth.saturating_sub(1));
        let prefix_first = format!("{indent}{marker}");
        let prefix_next = format!("{indent}{}", " ".repeat(marker.width()));
        let mut rendered_any = false;

        for child in node.children() {
            let value = child.data.borrow().value.clone();
            match value {
                NodeValue::Paragraph => {
                    let spans = collect_inline_spans(child);
                    let prefix = if rendered_any {
                        &prefix_next
                    } else {
                        &prefix_first
                    };
                    self.push_wrapped(&spans, LineType::ListItem(depth), prefix, &prefix_next);
                    rendered_any = true;
                }
                NodeValue::List(list) => {
                    if !rendered_any {
                        self.lines.push(RenderedLine::new(
                            prefix_first.clone(),
                            LineType::ListItem(depth),
                        ));
                        rendered_any = true;
                    }
                    self.list(child, list.list_type, list.start, list.delimiter, depth + 1);
                }
                NodeValue::CodeBlock(block) => {
                    if !rendered_any {
                        self.lines.push(RenderedLine::new(
                            prefix_first.clone(),
                            LineType::ListItem(depth),
                        ));
                        rendered_any = true;
                    }
                    let language = block.info.split_whitespace().next().map(ToString::to_string);
                    self.code_block(&block.literal, language.as_deref(), &prefix_next);
                }
                _ => {
                    self.block(child, depth);
                    rendered_any = true;
                }
            }
        }

        if !rendered_any {
            self.lines.push(RenderedLine::new(
                prefix_first,
                LineType::ListItem(depth),
            ));
        }
    }

    fn blockquote<'a>(&mut self, node: &'a AstNode<'a>, quote_depth: usize) {
        let prefix = "│ ".repeat(quote_depth);
        let mut first = true;

        for child in node.children() {
            let value = child.data.borrow().value.clone();
            if !first && !matches!(value, NodeValue::BlockQuote) {
                self.lines.push(RenderedLine::new(
                    prefix.trim_end().to_string(),
                    LineType::BlockQuote,
                ));
            }
            first = false;
            match value {
                NodeValue::Paragraph => {
                    let spans = collect_inline_spans(child);
                    self.push_wrapped(&spans, LineType::BlockQuote, &prefix, &prefix);
                }
                NodeValue::BlockQuote => self.blockquote(child, quote_depth + 1),
                _ => {
                    let text = extract_text(child);
                    for raw_line in text.lines() {
                        let spans =
                            vec![InlineSpan::new(raw_line.to_string(), InlineStyle::default())];
                        self.push_wrapped(&spans, LineType::BlockQuote, &prefix, &prefix);
                    }
                }
            }
        }
    }

    fn code_block(&mut self, literal: &str, language: Option<&str>, indent: &str) {
        let available = self.width.saturating_sub(indent.width() + 4).max(1);
        let content_width = literal
            .lines()
            .map(UnicodeWidthStr::width)
            .max()
            .unwrap_or(0)
            .min(available);
        let frame_inner_width = content_width + 2 + CODE_RIGHT_PADDING;
        let label: String = format!(" {} ", language.unwrap_or("code"))
            .chars()
            .take(frame_inner_width)
            .collect();
        self.lines.push(RenderedLine::new(
            format!(
                "{indent}┌{label}{}┐",
                "─".repeat(frame_inner_width.saturating_sub(label.width()))
            ),
            LineType::CodeBlock,
        ));

        let code_style = InlineStyle {
            code: true,
            ..InlineStyle::default()
        };
        for raw_line in literal.lines() {
            let text = truncate_text(raw_line, content_width);
            let padding = " ".repeat(content_width.saturating_sub(text.width()) + CODE_RIGHT_PADDING);
            let spans = vec![
                InlineSpan::new(format!("{indent}│ "), InlineStyle::default()),
                InlineSpan::new(text, code_style),
                InlineSpan::new(format!("{padding} │"), InlineStyle::default()),
            ];
            self.lines
                .push(RenderedLine::from_spans(LineType::CodeBlock, spans));
        }

        self.lines.push(RenderedLine::new(
            format!("{indent}└{}┘", "─".repeat(frame_inner_width)),
            LineType::CodeBlock,
        ));
    }

    fn image(&mut self, alt: String, src: String) {
        let label = if alt.is_empty() { &src } else { &alt };
        self.lines.push(RenderedLine::new(
            truncate_text(&format!("[Image: {label}]"), self.width),
            LineType::Image,
        ));
        self.images.push(ImageRef {
            alt,
            src,
            line: self.lines.len() - 1,
        });
    }

    fn push_wrapped(
        &mut self,
        spans: &[InlineSpan],
        line_type: LineType,
        prefix_first: &str,
        prefix_next: &str,
    ) {
        for line_spans in wrap_spans(spans, self.width, prefix_first, prefix_next) {
            self.lines
                .push(RenderedLine::from_spans(line_type, line_spans));
        }
    }

    fn blank(&mut self) {
        if self
            .lines
            .last()
            .is_some_and(|line| line.line_type() != LineType::Empty)
        {
            self.lines
                .push(RenderedLine::new(String::new(), LineType::Empty));
        }
    }
}

fn render_table<'a>(
    table_node: &'a AstNode<'a>,
    alignments: &[TableAlignment],
    wrap_width: usize,
) -> Vec<(String, LineType)> {
    let (mut rows, has_header) = collect_table_rows(table_node);
    let num_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    if num_cols == 0 {
        return Vec::new();
    }
    for row in &mut rows {
        row.resize(num_cols, String::new());
    }

    let mut col_widths = vec![1_usize; num_cols];
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            col_widths[idx] = col_widths[idx].max(cell.width());
        }
    }

    // Row width is 1 + sum(col_width + 3).
    let max_table_width = wrap_width.max(4);
    while 1 + col_widths.iter().sum::<usize>() + (3 * num_cols) > max_table_width {
        let Some((widest, _)) = col_widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
            break;
        };
        if col_widths[widest] <= 1 {
            break;
        }
        col_widths[widest] -= 1;
    }

    let mut lines = vec![(
        render_table_border(&col_widths, '┌', '┬', '┐'),
        LineType::Table,
    )];
    for (idx, row) in rows.iter().enumerate() {
        let header = has_header && idx == 0;
        let line_type = if header {
            LineType::TableHeader
        } else {
            LineType::Table
        };
        lines.push((render_table_row(row, &col_widths, alignments), line_type));
        if header {
            lines.push((
                render_table_border(&col_widths, '├', '┼', '┤'),
                LineType::Table,
            ));
        }
    }
    lines.push((
        render_table_border(&col_widths, '└', '┴', '┘'),
        LineType::Table,
    ));
    lines
}

fn collect_table_rows<'a>(table_node: &'a AstNode<'a>) -> (Vec<Vec<String>>, bool) {
    let mut rows = Vec::new();
    let mut has_header = false;
    for row_node in table_node.children() {
        let header = match row_node.data.borrow().value {
            NodeValue::TableRow(header) => header,
            _ => continue,
        };
        has_header |= header;
        let cells = row_node
            .children()
            .map(|cell| {
                extract_text(cell)
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        rows.push(cells);
    }
    (rows, has_header)
}

fn render_table_border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let mut out = String::new();
    out.push(left);
    for (idx, width) in widths.iter().enumerate() {
        out.push_str(&"─".repeat(width + 2));
        if idx + 1 < widths.len() {
            out.push(middle);
        }
    }
    out.push(right);
    out
}

fn render_table_row(cells: &[String], widths: &[usize], alignments: &[TableAlignment]) -> String {
    let mut out = String::from("│");
    for (idx, width) in widths.iter().enumerate() {
        let content = truncate_text(cells.get(idx).map_or("", String::as_str), *width);
        let padding = width.saturating_sub(content.width());
        out.push(' ');
        match alignments.get(idx).copied().unwrap_or(TableAlignment::None) {
            TableAlignment::Right => {
                out.push_str(&" ".repeat(padding));
                out.push_str(&content);
            }
            TableAlignment::Center => {
                let left = padding / 2;
                out.push_str(&" ".repeat(left));
                out.push_str(&content);
                out.push_str(&" ".repeat(padding - left));
            }
            TableAlignment::Left | TableAlignment::None => {
                out.push_str(&content);
                out.push_str(&" ".repeat(padding));
            }
        }
        out.push_str(" │");
    }
    out
}

fn truncate_text(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut width = 0usize;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    out
}

/// Images of a paragraph that holds nothing but images and whitespace.
fn standalone_images<'a>(node: &'a AstNode<'a>) -> Vec<(String, String)> {
    let mut images = Vec::new();
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Image(link) => images.push((crate::render::plain_text(child), link.url.clone())),
            NodeValue::SoftBreak | NodeValue::LineBreak => {}
            NodeValue::Text(text) if text.trim().is_empty() => {}
            _ => return Vec::new(),
        }
    }
    images
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_recursive(node, &mut text);
    text
}

fn extract_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) | NodeValue::HtmlInline(t) => text.push_str(t),
        NodeValue::Code(c) => text.push_str(&c.literal),
        NodeValue::CodeBlock(block) => text.push_str(&block.literal),
        NodeValue::FootnoteReference(reference) => {
            text.push_str(&format!("[^{}]", reference.name));
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push('\n'),
        _ => {
            for child in node.children() {
                extract_text_recursive(child, text);
            }
        }
    }
}

fn collect_inline_spans<'a>(node: &'a AstNode<'a>) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    collect_inline_spans_recursive(node, InlineStyle::default(), &mut spans);
    spans
}

fn collect_inline_spans_recursive<'a>(
    node: &'a AstNode<'a>,
    style: InlineStyle,
    spans: &mut Vec<InlineSpan>,
) {
    let nested = |next: InlineStyle, spans: &mut Vec<InlineSpan>| {
        for child in node.children() {
            collect_inline_spans_recursive(child, next, spans);
        }
    };
    match &node.data.borrow().value {
        NodeValue::List(_) | NodeValue::Item(_) | NodeValue::TaskItem(_) => {}
        NodeValue::Text(t) | NodeValue::HtmlInline(t) => {
            spans.push(InlineSpan::new(t.clone(), style));
        }
        NodeValue::Code(code) => {
            let code_style = InlineStyle {
                code: true,
                link: style.link,
                ..InlineStyle::default()
            };
            spans.push(InlineSpan::new(code.literal.clone(), code_style));
        }
        NodeValue::Emph => nested(
            InlineStyle {
                emphasis: true,
                ..style
            },
            spans,
        ),
        NodeValue::Strong => nested(
            InlineStyle {
                strong: true,
                ..style
            },
            spans,
        ),
        NodeValue::Strikethrough => nested(
            InlineStyle {
                strikethrough: true,
                ..style
            },
            spans,
        ),
        NodeValue::Link(_) => nested(InlineStyle { link: true, ..style }, spans),
        NodeValue::Image(link) => {
            let alt = crate::render::plain_text(node);
            let label = if alt.is_empty() { link.url.clone() } else { alt };
            spans.push(InlineSpan::new(format!("[Image: {label}]"), style));
        }
        NodeValue::FootnoteReference(reference) => {
            spans.push(InlineSpan::new(format!("[^{}]", reference.name), style));
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => {
            spans.push(InlineSpan::new(" ".to_string(), style));
        }
        _ => nested(style, spans),
    }
}

fn wrap_spans(
    spans: &[InlineSpan],
    width: usize,
    prefix_first: &str,
    prefix_next: &str,
) -> Vec<Vec<InlineSpan>> {
    let tokens: Vec<InlineSpan> = spans.iter().flat_map(split_inline_tokens).collect();

    let mut lines: Vec<Vec<InlineSpan>> = Vec::new();
    let mut current: Vec<InlineSpan> = Vec::new();
    let mut current_len = 0usize;
    let mut has_word = false;

    let start_line = |prefix: &str, current: &mut Vec<InlineSpan>, current_len: &mut usize| {
        current.clear();
        *current_len = prefix.width();
        if !prefix.is_empty() {
            current.push(InlineSpan::new(prefix.to_string(), InlineStyle::default()));
        }
    };

    start_line(prefix_first, &mut current, &mut current_len);

    for token in tokens {
        let token_len = token.text().width();
        let token_is_ws = token.text().chars().all(char::is_whitespace);

        if current_len + token_len > width && has_word {
            lines.push(std::mem::take(&mut current));
            start_line(prefix_next, &mut current, &mut current_len);
            has_word = false;
        }

        // Drop leading whitespace at wrapped line starts.
        if token_is_ws && !has_word {
            continue;
        }

        current_len += token_len;
        current.push(token);
        has_word = true;
    }

    if current.is_empty() && !prefix_first.is_empty() {
        current.push(InlineSpan::new(prefix_first.to_string(), InlineStyle::default()));
    }
    lines.push(current);
    lines
}

fn split_inline_tokens(span: &InlineSpan) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut ws_state: Option<bool> = None;

    for ch in span.text().chars() {
        let is_ws = ch.is_whitespace();
        if ws_state.is_some_and(|state| state != is_ws) {
            out.push(InlineSpan::new(std::mem::take(&mut buf), span.style()));
        }
        buf.push(ch);
        ws_state = Some(is_ws);
    }

    if !buf.is_empty() {
        out.push(InlineSpan::new(buf, span.style()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(doc: &Document) -> Vec<&str> {
        doc.lines().iter().map(RenderedLine::content).collect()
    }

    #[test]
    fn test_parse_default_sample() {
        let doc = Document::parse("# Test\n- One\n- Two\n\n> Blockquotes look nice too\n", 20);
        assert_eq!(
            contents(&doc),
            vec![
                "Test",
                "────────────────────",
                "",
                "• One",
                "• Two",
                "",
                "│ Blockquotes look",
                "│ nice too",
            ]
        );
        assert_eq!(doc.line_at(0).map(RenderedLine::line_type), Some(LineType::Heading(1)));
        assert_eq!(doc.line_at(3).map(RenderedLine::line_type), Some(LineType::ListItem(1)));
        assert_eq!(doc.line_at(6).map(RenderedLine::line_type), Some(LineType::BlockQuote));
    }

    #[test]
    fn test_heading_three_has_no_rule() {
        let doc = Document::parse("### Small\n", 20);
        assert_eq!(contents(&doc), vec!["Small"]);
    }

    #[test]
    fn test_paragraph_wraps_at_width() {
        let doc = Document::parse("alpha beta gamma delta", 11);
        assert_eq!(contents(&doc), vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn test_inline_styles_are_tracked() {
        let doc = Document::parse("**bold** *it* `code` [link](x) ~~old~~\n", 80);
        let spans = doc.line_at(0).and_then(RenderedLine::spans).unwrap();
        let style_of = |needle: &str| {
            spans
                .iter()
                .find(|span| span.text() == needle)
                .map(InlineSpan::style)
                .unwrap()
        };
        assert!(style_of("bold").strong);
        assert!(style_of("it").emphasis);
        assert!(style_of("code").code);
        assert!(style_of("link").link);
        assert!(style_of("old").strikethrough);
    }

    #[test]
    fn test_code_block_is_framed() {
        let doc = Document::parse("```rust\nfn main() {}\n```\n", 40);
        let lines = contents(&doc);
        assert!(lines[0].starts_with("┌ rust "));
        assert!(lines[1].starts_with("│ fn main() {}"));
        assert!(lines[2].starts_with('└'));
        assert!(doc.lines().iter().all(|line| line.line_type() == LineType::CodeBlock));
    }

    #[test]
    fn test_ordered_list_numbers_align() {
        let doc = Document::parse(
            "9. nine\n10. ten\n",
            40,
        );
        assert_eq!(contents(&doc), vec![" 9. nine", "10. ten"]);
    }

    #[test]
    fn test_nested_list_indents() {
        let doc = Document::parse("- outer\n  - inner\n", 40);
        assert_eq!(contents(&doc), vec!["• outer", "  • inner"]);
        assert_eq!(doc.line_at(1).map(RenderedLine::line_type), Some(LineType::ListItem(2)));
    }

    #[test]
    fn test_task_items_show_checkbox() {
        let doc = Document::parse("- [x] done\n- [ ] open\n", 40);
        assert_eq!(contents(&doc), vec!["[x] done", "[ ] open"]);
    }

    #[test]
    fn test_table_has_header_and_borders() {
        let doc = Document::parse("| a | b |\n|---|---|\n| 1 | 2 |\n", 40);
        assert_eq!(
            contents(&doc),
            vec!["┌───┬───┐", "│ a │ b │", "├───┼───┤", "│ 1 │ 2 │", "└───┴───┘"]
        );
        assert_eq!(doc.line_at(1).map(RenderedLine::line_type), Some(LineType::TableHeader));
    }

    #[test]
    fn test_standalone_image_is_recorded() {
        let doc = Document::parse("text\n\n![cat](cat.png)\n", 40);
        assert_eq!(doc.images().len(), 1);
        let image = &doc.images()[0];
        assert_eq!(image.src, "cat.png");
        assert_eq!(image.alt, "cat");
        assert_eq!(doc.line_at(image.line).map(RenderedLine::content), Some("[Image: cat]"));
        assert_eq!(doc.image_at_line(image.line), Some(image));
    }

    #[test]
    fn test_inline_image_is_not_standalone() {
        let doc = Document::parse("see ![cat](cat.png) here\n", 40);
        assert!(doc.images().is_empty());
        assert_eq!(contents(&doc), vec!["see [Image: cat] here"]);
    }

    #[test]
    fn test_horizontal_rule_spans_width() {
        let doc = Document::parse("a\n\n---\n\nb\n", 5);
        assert_eq!(contents(&doc), vec!["a", "", "─────", "", "b"]);
    }

    #[test]
    fn test_raw_html_block_shown_as_text() {
        let doc = Document::parse("<div>hi</div>\n", 40);
        assert_eq!(contents(&doc), vec!["<div>hi</div>"]);
    }

    #[test]
    fn test_empty_source_has_no_lines() {
        assert_eq!(Document::parse("", 40).line_count(), 0);
    }

    #[test]
    fn test_zero_width_does_not_panic() {
        let doc = Document::parse("# Title\n\nsome words here\n\n| a |\n|---|\n", 0);
        assert!(doc.line_count() > 0);
    }
}
