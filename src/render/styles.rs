//! Per-element presentation rules.
//!
//! Every element kind the renderer can produce maps to one [`StyleRule`].
//! The rules are plain data: a tag, a class list, fixed attributes and,
//! for code, an inner wrapper element.

use super::tree::ElementKind;

/// Markup applied to one element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRule {
    /// HTML tag name.
    pub tag: &'static str,
    /// Class list, if the kind carries one.
    pub class: Option<&'static str>,
    /// Attributes added to every element of this kind.
    pub attributes: &'static [(&'static str, &'static str)],
    /// Wrapper nested directly inside the outer tag.
    pub inner: Option<InnerRule>,
    /// Void elements have no closing tag and no children.
    pub void: bool,
}

/// Element nested inside the outer tag of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerRule {
    pub tag: &'static str,
    pub class: &'static str,
}

const CODE_BLOCK_CLASS: &str = "bg-gray-800 rounded p-4 my-4 overflow-x-auto";
const CODE_INNER: InnerRule = InnerRule {
    tag: "code",
    class: "text-gray-100 font-mono text-sm",
};
const LINK_ATTRIBUTES: &[(&str, &str)] = &[("target", "_blank"), ("rel", "noopener noreferrer")];

impl StyleRule {
    const fn plain(tag: &'static str) -> Self {
        Self {
            tag,
            class: None,
            attributes: &[],
            inner: None,
            void: false,
        }
    }

    const fn classed(tag: &'static str, class: &'static str) -> Self {
        Self {
            tag,
            class: Some(class),
            attributes: &[],
            inner: None,
            void: false,
        }
    }

    const fn void(tag: &'static str, class: Option<&'static str>) -> Self {
        Self {
            tag,
            class,
            attributes: &[],
            inner: None,
            void: true,
        }
    }
}

/// Look up the rule for an element kind.
pub fn rule_for(kind: &ElementKind) -> StyleRule {
    match kind {
        ElementKind::Heading(1) => {
            StyleRule::classed("h1", "text-3xl font-bold my-4 border-b pb-2 border-gray-200")
        }
        ElementKind::Heading(2) => {
            StyleRule::classed("h2", "text-2xl font-bold my-3 border-b pb-2 border-gray-200")
        }
        ElementKind::Heading(3) => StyleRule::classed("h3", "text-xl font-semibold my-2"),
        ElementKind::Heading(4) => StyleRule::classed("h4", "text-lg font-medium my-2"),
        ElementKind::Heading(5) => StyleRule::plain("h5"),
        ElementKind::Heading(_) => StyleRule::plain("h6"),
        ElementKind::Paragraph => StyleRule::classed("p", "my-4 leading-relaxed"),
        ElementKind::UnorderedList => StyleRule::classed("ul", "list-disc pl-6 my-4"),
        ElementKind::OrderedList { .. } => StyleRule::classed("ol", "list-decimal pl-6 my-4"),
        ElementKind::ListItem | ElementKind::FootnoteItem { .. } => StyleRule::classed("li", "my-1"),
        ElementKind::CodeBlock { .. } | ElementKind::InlineCode => StyleRule {
            tag: "pre",
            class: Some(CODE_BLOCK_CLASS),
            attributes: &[],
            inner: Some(CODE_INNER),
            void: false,
        },
        ElementKind::BlockQuote => StyleRule::classed(
            "blockquote",
            "border-l-4 border-gray-400 pl-4 italic my-4 text-gray-600",
        ),
        ElementKind::Table => {
            StyleRule::classed("table", "border-collapse border border-gray-300 my-4 w-full")
        }
        ElementKind::TableHead => StyleRule::plain("thead"),
        ElementKind::TableBody => StyleRule::plain("tbody"),
        ElementKind::TableRow => StyleRule::plain("tr"),
        ElementKind::HeaderCell { .. } => StyleRule::classed(
            "th",
            "border border-gray-300 px-4 py-2 bg-gray-100 font-semibold",
        ),
        ElementKind::DataCell { .. } => StyleRule::classed("td", "border border-gray-300 px-4 py-2"),
        ElementKind::Link { .. } => StyleRule {
            tag: "a",
            class: Some("text-blue-600 hover:underline"),
            attributes: LINK_ATTRIBUTES,
            inner: None,
            void: false,
        },
        ElementKind::Image { .. } => StyleRule::void("img", Some("max-w-full h-auto my-4 rounded-lg")),
        ElementKind::HorizontalRule => StyleRule::void("hr", Some("my-6 border-t border-gray-200")),
        ElementKind::Emphasis => StyleRule::plain("em"),
        ElementKind::Strong => StyleRule::plain("strong"),
        ElementKind::Strikethrough => StyleRule::plain("del"),
        ElementKind::LineBreak => StyleRule::void("br", None),
        ElementKind::TaskCheckbox { .. } => StyleRule {
            tag: "input",
            class: None,
            attributes: &[("type", "checkbox"), ("disabled", "")],
            inner: None,
            void: true,
        },
        ElementKind::FootnoteReference { .. } => StyleRule::plain("sup"),
        ElementKind::Footnotes => StyleRule {
            tag: "section",
            class: Some("footnotes"),
            attributes: &[("data-footnotes", "")],
            inner: None,
            void: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_rules_cover_levels_one_to_four() {
        assert_eq!(
            rule_for(&ElementKind::Heading(1)).class,
            Some("text-3xl font-bold my-4 border-b pb-2 border-gray-200")
        );
        assert_eq!(
            rule_for(&ElementKind::Heading(2)).class,
            Some("text-2xl font-bold my-3 border-b pb-2 border-gray-200")
        );
        assert_eq!(rule_for(&ElementKind::Heading(3)).class, Some("text-xl font-semibold my-2"));
        assert_eq!(rule_for(&ElementKind::Heading(4)).class, Some("text-lg font-medium my-2"));
        assert_eq!(rule_for(&ElementKind::Heading(5)).class, None);
    }

    #[test]
    fn test_inline_and_fenced_code_share_the_preformatted_rule() {
        let fenced = rule_for(&ElementKind::CodeBlock { language: None });
        let inline = rule_for(&ElementKind::InlineCode);
        assert_eq!(fenced, inline);
        assert_eq!(fenced.tag, "pre");
        assert_eq!(fenced.inner.map(|inner| inner.tag), Some("code"));
    }

    #[test]
    fn test_links_open_in_isolated_context() {
        let rule = rule_for(&ElementKind::Link {
            href: "https://example.com".to_string(),
            title: None,
        });
        assert!(rule.attributes.contains(&("target", "_blank")));
        assert!(rule.attributes.contains(&("rel", "noopener noreferrer")));
    }

    #[test]
    fn test_images_are_width_constrained_void_elements() {
        let rule = rule_for(&ElementKind::Image {
            src: "a.png".to_string(),
            alt: String::new(),
            title: None,
        });
        assert!(rule.void);
        assert!(rule.class.is_some_and(|class| class.contains("max-w-full")));
    }
}
