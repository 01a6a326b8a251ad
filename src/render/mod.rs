//! Markdown rendering.
//!
//! [`render`] turns markdown into a [`StyledTree`] whose elements carry
//! their presentation rules. [`RenderedView`] pairs that tree with the
//! terminal layout of the same parse; it is what the preview pane draws
//! and what both export actions read.

pub mod html;
mod styles;
mod tree;

pub use styles::{InnerRule, StyleRule, rule_for};
pub use tree::{Alignment, Element, ElementKind, Node, StyledTree};
pub(crate) use tree::plain_text;

use std::sync::Arc;

use comrak::{Arena, Options, parse_document};

use crate::document::{self, Document};

/// Parser options shared by the styled tree and the terminal layout.
///
/// GitHub-flavored extensions: tables, strikethrough, autolinks, task
/// lists and footnotes.
pub fn markdown_options() -> Options {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options
}

/// Render markdown into a styled element tree.
///
/// Never fails: comrak accepts any input and produces some tree.
pub fn render(source: &str) -> StyledTree {
    let arena = Arena::new();
    let root = parse_document(&arena, source, &markdown_options());
    tree::build(root)
}

/// The rendered projection of the source, recomputed on every edit.
///
/// Both halves sit behind `Arc` so export workers can hold on to them
/// without copying.
#[derive(Debug, Clone)]
pub struct RenderedView {
    tree: Arc<StyledTree>,
    document: Arc<Document>,
    revision: u64,
}

impl RenderedView {
    /// Render `source` once, producing both the styled tree and the
    /// preview layout for a pane `width` columns wide.
    ///
    /// `revision` is the editor revision the source was taken from.
    pub fn new(source: &str, width: u16, revision: u64) -> Self {
        let _scope = crate::perf::scope("render.view");
        let arena = Arena::new();
        let root = parse_document(&arena, source, &markdown_options());
        Self {
            tree: Arc::new(tree::build(root)),
            document: Arc::new(document::layout(root, width)),
            revision,
        }
    }

    /// The styled element tree.
    pub fn tree(&self) -> &StyledTree {
        &self.tree
    }

    pub fn shared_tree(&self) -> Arc<StyledTree> {
        Arc::clone(&self.tree)
    }

    /// Terminal layout of the preview.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn shared_document(&self) -> Arc<Document> {
        Arc::clone(&self.document)
    }

    /// Editor revision this view was rendered from.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Layout width in columns.
    pub fn width(&self) -> u16 {
        self.document.width()
    }

    /// HTML markup of the view, as placed on the clipboard.
    pub fn to_html(&self) -> String {
        self.tree.to_html()
    }
}

impl Default for RenderedView {
    fn default() -> Self {
        Self::new("", 80, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::DEFAULT_SOURCE;

    #[test]
    fn test_default_source_renders_heading_list_and_quote() {
        let tree = render(DEFAULT_SOURCE);
        assert_eq!(tree.count(|kind| *kind == ElementKind::Heading(1)), 1);
        assert_eq!(tree.count(|kind| *kind == ElementKind::UnorderedList), 1);
        assert_eq!(tree.count(|kind| *kind == ElementKind::ListItem), 2);
        assert_eq!(tree.count(|kind| *kind == ElementKind::BlockQuote), 1);
        assert_eq!(tree.count(|kind| *kind == ElementKind::Paragraph), 1);
    }

    #[test]
    fn test_default_source_elements_carry_their_rules() {
        let tree = render(DEFAULT_SOURCE);
        let classes: Vec<_> = tree
            .elements()
            .into_iter()
            .map(|element| (element.rule().tag, element.rule().class))
            .collect();
        assert_eq!(
            classes,
            vec![
                ("h1", Some("text-3xl font-bold my-4 border-b pb-2 border-gray-200")),
                ("ul", Some("list-disc pl-6 my-4")),
                ("li", Some("my-1")),
                ("li", Some("my-1")),
                (
                    "blockquote",
                    Some("border-l-4 border-gray-400 pl-4 italic my-4 text-gray-600")
                ),
                ("p", Some("my-4 leading-relaxed")),
            ]
        );
    }

    #[test]
    fn test_unmatched_emphasis_renders_literally() {
        let tree = render("an *unmatched star\n");
        assert_eq!(tree.count(|kind| *kind == ElementKind::Emphasis), 0);
        assert!(tree.text().contains("*unmatched"));
    }

    #[test]
    fn test_empty_source_renders_empty_tree() {
        assert!(render("").children().is_empty());
    }

    #[test]
    fn test_loose_list_keeps_paragraphs() {
        let tree = render("- one\n\n- two\n");
        assert_eq!(tree.count(|kind| *kind == ElementKind::Paragraph), 2);
    }

    #[test]
    fn test_gfm_extensions_enabled() {
        let tree = render("~~gone~~ https://example.com\n\n| a |\n|---|\n| b |\n\n- [ ] task\n");
        assert_eq!(tree.count(|kind| *kind == ElementKind::Strikethrough), 1);
        assert_eq!(tree.count(|kind| matches!(kind, ElementKind::Link { .. })), 1);
        assert_eq!(tree.count(|kind| *kind == ElementKind::Table), 1);
        assert_eq!(
            tree.count(|kind| matches!(kind, ElementKind::TaskCheckbox { checked: false })),
            1
        );
    }

    #[test]
    fn test_footnotes_collected_at_end() {
        let tree = render("Claim[^1].\n\n[^1]: Source.\n");
        let last = tree.children().last();
        assert!(matches!(
            last,
            Some(Node::Element(Element {
                kind: ElementKind::Footnotes,
                ..
            }))
        ));
        assert_eq!(
            tree.count(|kind| matches!(kind, ElementKind::FootnoteReference { index: 1, .. })),
            1
        );
    }

    #[test]
    fn test_emoji_shortcodes_stay_literal() {
        let html = render("Ship it :rocket:\n").to_html();
        assert!(html.contains("Ship it :rocket:"));
    }

    #[test]
    fn test_view_records_revision_and_width() {
        let view = RenderedView::new("# Hi\n", 42, 7);
        assert_eq!(view.revision(), 7);
        assert_eq!(view.width(), 42);
        assert!(view.to_html().starts_with("<h1"));
    }
}
