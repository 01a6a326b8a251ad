//! Owned element tree produced from the comrak AST.

use std::collections::HashMap;

use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};

use super::styles::{StyleRule, rule_for};

/// Horizontal alignment of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    const fn from_table(alignment: TableAlignment) -> Option<Self> {
        match alignment {
            TableAlignment::Left => Some(Self::Left),
            TableAlignment::Center => Some(Self::Center),
            TableAlignment::Right => Some(Self::Right),
            TableAlignment::None => None,
        }
    }

    /// CSS keyword for the alignment.
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Kind of a rendered element. Each kind has exactly one [`StyleRule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// Heading with level (1-6)
    Heading(u8),
    Paragraph,
    UnorderedList,
    OrderedList {
        start: usize,
    },
    ListItem,
    /// Fenced or indented code block
    CodeBlock {
        language: Option<String>,
    },
    /// Inline code span, rendered as a preformatted block like fenced code
    InlineCode,
    BlockQuote,
    Table,
    TableHead,
    TableBody,
    TableRow,
    HeaderCell {
        align: Option<Alignment>,
    },
    DataCell {
        align: Option<Alignment>,
    },
    Link {
        href: String,
        title: Option<String>,
    },
    Image {
        src: String,
        alt: String,
        title: Option<String>,
    },
    HorizontalRule,
    Emphasis,
    Strong,
    Strikethrough,
    LineBreak,
    TaskCheckbox {
        checked: bool,
    },
    FootnoteReference {
        name: String,
        index: usize,
    },
    /// Footnote definition, the target of its references
    FootnoteItem {
        name: String,
    },
    /// Trailing section collecting footnote definitions
    Footnotes,
}

/// A node of the styled tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element and its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub children: Vec<Node>,
}

impl Element {
    /// The presentation rule bound to this element's kind.
    pub fn rule(&self) -> StyleRule {
        rule_for(&self.kind)
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

/// The rendered document as a tree of styled elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledTree {
    children: Vec<Node>,
}

impl StyledTree {
    /// Top-level nodes.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// All elements in document order (pre-order).
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_elements(&self.children, &mut out);
        out
    }

    /// Number of elements matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&ElementKind) -> bool) -> usize {
        self.elements()
            .into_iter()
            .filter(|element| predicate(&element.kind))
            .count()
    }

    /// Plain text of the whole tree.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_elements<'t>(nodes: &'t [Node], out: &mut Vec<&'t Element>) {
    for node in nodes {
        if let Node::Element(element) = node {
            out.push(element);
            collect_elements(&element.children, out);
        }
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => collect_text(&element.children, out),
        }
    }
}

const fn element(kind: ElementKind, children: Vec<Node>) -> Node {
    Node::Element(Element { kind, children })
}

/// Build the styled tree from a parsed comrak document.
pub fn build<'a>(root: &'a AstNode<'a>) -> StyledTree {
    let mut builder = TreeBuilder::default();
    let mut children = builder.children_of(root, false);
    if !builder.footnotes.is_empty() {
        let items = std::mem::take(&mut builder.footnotes);
        children.push(element(
            ElementKind::Footnotes,
            vec![element(ElementKind::OrderedList { start: 1 }, items)],
        ));
    }
    StyledTree { children }
}

#[derive(Default)]
struct TreeBuilder {
    footnotes: Vec<Node>,
    footnote_numbers: HashMap<String, usize>,
}

impl TreeBuilder {
    fn children_of<'a>(&mut self, node: &'a AstNode<'a>, tight: bool) -> Vec<Node> {
        let mut out = Vec::new();
        for child in node.children() {
            out.extend(self.convert(child, tight));
        }
        out
    }

    /// `tight` is set for children of a tight list, whose paragraphs are
    /// emitted without a `<p>` wrapper.
    fn convert<'a>(&mut self, node: &'a AstNode<'a>, tight: bool) -> Vec<Node> {
        let value = node.data.borrow().value.clone();
        match value {
            NodeValue::Heading(heading) => vec![element(
                ElementKind::Heading(heading.level),
                self.children_of(node, false),
            )],
            NodeValue::Paragraph => {
                let children = self.children_of(node, false);
                if tight {
                    children
                } else {
                    vec![element(ElementKind::Paragraph, children)]
                }
            }
            NodeValue::List(list) => {
                let kind = match list.list_type {
                    ListType::Bullet => ElementKind::UnorderedList,
                    ListType::Ordered => ElementKind::OrderedList { start: list.start },
                };
                vec![element(kind, self.children_of(node, list.tight))]
            }
            NodeValue::Item(_) => vec![element(ElementKind::ListItem, self.children_of(node, tight))],
            NodeValue::TaskItem(symbol) => {
                let mut children = vec![
                    element(
                        ElementKind::TaskCheckbox {
                            checked: symbol.is_some(),
                        },
                        Vec::new(),
                    ),
                    Node::Text(" ".to_string()),
                ];
                children.extend(self.children_of(node, tight));
                vec![element(ElementKind::ListItem, children)]
            }
            NodeValue::CodeBlock(block) => {
                let language = block
                    .info
                    .split_whitespace()
                    .next()
                    .map(ToString::to_string);
                vec![element(
                    ElementKind::CodeBlock { language },
                    vec![Node::Text(block.literal)],
                )]
            }
            NodeValue::Code(code) => vec![element(
                ElementKind::InlineCode,
                vec![Node::Text(code.literal)],
            )],
            NodeValue::BlockQuote => vec![element(
                ElementKind::BlockQuote,
                self.children_of(node, false),
            )],
            NodeValue::Table(table) => vec![self.table(node, &table.alignments)],
            NodeValue::Text(text) => vec![Node::Text(text)],
            NodeValue::SoftBreak => vec![Node::Text("\n".to_string())],
            NodeValue::LineBreak => vec![element(ElementKind::LineBreak, Vec::new())],
            NodeValue::Emph => vec![element(ElementKind::Emphasis, self.children_of(node, false))],
            NodeValue::Strong => vec![element(ElementKind::Strong, self.children_of(node, false))],
            NodeValue::Strikethrough => vec![element(
                ElementKind::Strikethrough,
                self.children_of(node, false),
            )],
            NodeValue::Link(link) => vec![element(
                ElementKind::Link {
                    href: link.url,
                    title: non_empty(link.title),
                },
                self.children_of(node, false),
            )],
            NodeValue::Image(link) => vec![element(
                ElementKind::Image {
                    src: link.url,
                    alt: plain_text(node),
                    title: non_empty(link.title),
                },
                Vec::new(),
            )],
            NodeValue::ThematicBreak => vec![element(ElementKind::HorizontalRule, Vec::new())],
            // Raw HTML is shown as text, never passed through.
            NodeValue::HtmlBlock(block) => vec![element(
                ElementKind::Paragraph,
                vec![Node::Text(block.literal)],
            )],
            NodeValue::HtmlInline(html) => vec![Node::Text(html)],
            NodeValue::FootnoteReference(reference) => {
                let index = self.footnote_number(&reference.name);
                vec![element(
                    ElementKind::FootnoteReference {
                        name: reference.name.clone(),
                        index,
                    },
                    vec![element(
                        ElementKind::Link {
                            href: format!("#fn-{}", reference.name),
                            title: None,
                        },
                        vec![Node::Text(index.to_string())],
                    )],
                )]
            }
            NodeValue::FootnoteDefinition(definition) => {
                let children = self.children_of(node, false);
                self.footnotes.push(element(
                    ElementKind::FootnoteItem {
                        name: definition.name,
                    },
                    children,
                ));
                Vec::new()
            }
            _ => self.children_of(node, tight),
        }
    }

    fn table<'a>(&mut self, node: &'a AstNode<'a>, alignments: &[TableAlignment]) -> Node {
        let mut head = Vec::new();
        let mut body = Vec::new();
        for row in node.children() {
            let header = match row.data.borrow().value {
                NodeValue::TableRow(header) => header,
                _ => continue,
            };
            let mut cells = Vec::new();
            for (idx, cell) in row.children().enumerate() {
                let align = alignments
                    .get(idx)
                    .copied()
                    .and_then(Alignment::from_table);
                let kind = if header {
                    ElementKind::HeaderCell { align }
                } else {
                    ElementKind::DataCell { align }
                };
                cells.push(element(kind, self.children_of(cell, false)));
            }
            let row = element(ElementKind::TableRow, cells);
            if header {
                head.push(row);
            } else {
                body.push(row);
            }
        }

        let mut sections = Vec::new();
        if !head.is_empty() {
            sections.push(element(ElementKind::TableHead, head));
        }
        if !body.is_empty() {
            sections.push(element(ElementKind::TableBody, body));
        }
        element(ElementKind::Table, sections)
    }

    fn footnote_number(&mut self, name: &str) -> usize {
        let next = self.footnote_numbers.len() + 1;
        *self
            .footnote_numbers
            .entry(name.to_string())
            .or_insert(next)
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Plain text of an AST node, used for image alt text.
pub(crate) fn plain_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    plain_text_into(node, &mut out);
    out
}

fn plain_text_into<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) | NodeValue::HtmlInline(text) => out.push_str(text),
        NodeValue::Code(code) => out.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
        _ => {
            for child in node.children() {
                plain_text_into(child, out);
            }
        }
    }
}
