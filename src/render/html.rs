//! HTML serialization of the styled tree.
//!
//! The output is the markup that rich-text paste targets receive: every
//! element carries the classes and attributes from its [`StyleRule`].
//!
//! [`StyleRule`]: super::StyleRule

use std::borrow::Cow;
use std::io::{self, Write};

use comrak::html::{escape, escape_href, write_opening_tag};

use super::tree::{Element, ElementKind, Node, StyledTree};

/// URL schemes kept in `href`/`src`. Anything else is dropped.
const SAFE_PROTOCOLS: &[&str] = &["http", "https", "mailto", "irc", "ircs", "xmpp"];

impl StyledTree {
    /// Serialize the tree to an HTML fragment.
    pub fn to_html(&self) -> String {
        let mut out = Vec::new();
        if let Err(err) = write_nodes(&mut out, self.children()) {
            tracing::error!(error = %err, "failed to serialize html");
        }
        String::from_utf8(out)
            .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
    }
}

/// Attribute value, escaped according to where it lands.
enum Value<'a> {
    Text(Cow<'a, str>),
    Url(String),
}

fn write_nodes(out: &mut dyn Write, nodes: &[Node]) -> io::Result<()> {
    for node in nodes {
        match node {
            Node::Text(text) => escape(out, text.as_bytes())?,
            Node::Element(element) => write_element(out, element)?,
        }
    }
    Ok(())
}

fn write_element(out: &mut dyn Write, element: &Element) -> io::Result<()> {
    let rule = element.rule();
    let mut attributes: Vec<(&str, Value<'_>)> = Vec::new();
    if let Some(class) = rule.class {
        attributes.push(("class", Value::Text(class.into())));
    }

    let mut inner_class_suffix = None;
    match &element.kind {
        ElementKind::OrderedList { start } if *start != 1 => {
            attributes.push(("start", Value::Text(start.to_string().into())));
        }
        ElementKind::HeaderCell { align: Some(align) }
        | ElementKind::DataCell { align: Some(align) } => {
            let style = format!("text-align: {}", align.as_css());
            attributes.push(("style", Value::Text(style.into())));
        }
        ElementKind::Link { href, title } => {
            attributes.push(("href", Value::Url(safe_url(href))));
            if let Some(title) = title {
                attributes.push(("title", Value::Text(title.into())));
            }
        }
        ElementKind::Image { src, alt, title } => {
            attributes.push(("src", Value::Url(safe_url(src))));
            attributes.push(("alt", Value::Text(alt.into())));
            if let Some(title) = title {
                attributes.push(("title", Value::Text(title.into())));
            }
        }
        ElementKind::FootnoteItem { name } => {
            attributes.push(("id", Value::Text(format!("fn-{name}").into())));
        }
        ElementKind::TaskCheckbox { checked: true } => {
            attributes.push(("checked", Value::Text("".into())));
        }
        ElementKind::CodeBlock {
            language: Some(language),
        } => {
            inner_class_suffix = Some(format!("language-{language}"));
        }
        _ => {}
    }
    for &(name, value) in rule.attributes {
        attributes.push((name, Value::Text(value.into())));
    }

    write_tag(out, rule.tag, &attributes)?;
    if rule.void {
        return Ok(());
    }

    if let Some(inner) = rule.inner {
        let class = match inner_class_suffix {
            Some(suffix) => format!("{} {suffix}", inner.class),
            None => inner.class.to_string(),
        };
        write_opening_tag(out, inner.tag, [("class", class.as_str())])?;
    }

    write_nodes(out, &element.children)?;

    if let Some(inner) = rule.inner {
        write!(out, "</{}>", inner.tag)?;
    }
    write!(out, "</{}>", rule.tag)
}

/// Opening tag where URL attributes go through `escape_href`.
fn write_tag(out: &mut dyn Write, tag: &str, attributes: &[(&str, Value<'_>)]) -> io::Result<()> {
    write!(out, "<{tag}")?;
    for (name, value) in attributes {
        write!(out, " {name}=\"")?;
        match value {
            Value::Text(text) => escape(out, text.as_bytes())?,
            Value::Url(url) => escape_href(out, url.as_bytes())?,
        }
        out.write_all(b"\"")?;
    }
    out.write_all(b">")
}

/// Drop URLs with a scheme outside [`SAFE_PROTOCOLS`].
///
/// A colon only counts as a scheme separator when it appears before any
/// `/`, `?` or `#`, so relative paths like `a/b:c` survive.
pub(crate) fn safe_url(url: &str) -> String {
    let Some(colon) = url.find(':') else {
        return url.to_string();
    };
    let before_path = url.find(['/', '?', '#']).is_none_or(|idx| colon < idx);
    if !before_path {
        return url.to_string();
    }
    let scheme = url[..colon].to_ascii_lowercase();
    if SAFE_PROTOCOLS.contains(&scheme.as_str()) {
        url.to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::render::render;

    use super::safe_url;

    #[test]
    fn test_sample_document_markup() {
        let html = render("# Test\n- One\n- Two\n\n> Blockquotes look nice too\n").to_html();
        assert_eq!(
            html,
            concat!(
                "<h1 class=\"text-3xl font-bold my-4 border-b pb-2 border-gray-200\">Test</h1>",
                "<ul class=\"list-disc pl-6 my-4\">",
                "<li class=\"my-1\">One</li>",
                "<li class=\"my-1\">Two</li>",
                "</ul>",
                "<blockquote class=\"border-l-4 border-gray-400 pl-4 italic my-4 text-gray-600\">",
                "<p class=\"my-4 leading-relaxed\">Blockquotes look nice too</p>",
                "</blockquote>",
            )
        );
    }

    #[test]
    fn test_fenced_code_gets_language_class() {
        let html = render("```rust\nfn main() {}\n```\n").to_html();
        assert_eq!(
            html,
            "<pre class=\"bg-gray-800 rounded p-4 my-4 overflow-x-auto\">\
             <code class=\"text-gray-100 font-mono text-sm language-rust\">fn main() {}\n</code></pre>"
        );
    }

    #[test]
    fn test_inline_code_renders_as_preformatted_block() {
        let html = render("Run `cargo`.\n").to_html();
        assert!(html.contains(
            "<pre class=\"bg-gray-800 rounded p-4 my-4 overflow-x-auto\">\
             <code class=\"text-gray-100 font-mono text-sm\">cargo</code></pre>"
        ));
    }

    #[test]
    fn test_links_carry_target_and_rel() {
        let html = render("[site](https://example.com \"Home\")\n").to_html();
        assert!(html.contains(
            "<a class=\"text-blue-600 hover:underline\" href=\"https://example.com\" \
             title=\"Home\" target=\"_blank\" rel=\"noopener noreferrer\">site</a>"
        ));
    }

    #[test]
    fn test_image_markup() {
        let html = render("![a cat](cat.png)\n").to_html();
        assert!(html.contains(
            "<img class=\"max-w-full h-auto my-4 rounded-lg\" src=\"cat.png\" alt=\"a cat\">"
        ));
    }

    #[test]
    fn test_table_markup_with_alignment() {
        let html = render("| a | b |\n|:--|--:|\n| 1 | 2 |\n").to_html();
        assert!(html.starts_with(
            "<table class=\"border-collapse border border-gray-300 my-4 w-full\"><thead><tr>"
        ));
        assert!(html.contains(
            "<th class=\"border border-gray-300 px-4 py-2 bg-gray-100 font-semibold\" \
             style=\"text-align: left\">a</th>"
        ));
        assert!(html.contains(
            "<td class=\"border border-gray-300 px-4 py-2\" style=\"text-align: right\">2</td>"
        ));
    }

    #[test]
    fn test_ordered_list_start_attribute() {
        let html = render("3. three\n4. four\n").to_html();
        assert!(html.starts_with("<ol class=\"list-decimal pl-6 my-4\" start=\"3\">"));
    }

    #[test]
    fn test_task_list_checkboxes() {
        let html = render("- [x] done\n- [ ] todo\n").to_html();
        assert!(html.contains("<input checked=\"\" type=\"checkbox\" disabled=\"\"> done"));
        assert!(html.contains("<input type=\"checkbox\" disabled=\"\"> todo"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render("<script>alert(1)</script>\n").to_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_attribute_and_url_escaping() {
        let html = render("[x](https://a.test/?q=1&r=a%20b \"say \\\"hi\\\"\")\n").to_html();
        assert!(html.contains("href=\"https://a.test/?q=1&amp;r=a%20b\""));
        assert!(html.contains("title=\"say &quot;hi&quot;\""));
    }

    #[test]
    fn test_footnote_reference_targets_its_definition() {
        let html = render("Claim[^note].\n\n[^note]: Source.\n").to_html();
        assert!(html.contains("href=\"#fn-note\""));
        assert!(html.contains("<li class=\"my-1\" id=\"fn-note\">"));
    }

    #[test]
    fn test_horizontal_rule_markup() {
        let html = render("a\n\n---\n\nb\n").to_html();
        assert!(html.contains("<hr class=\"my-6 border-t border-gray-200\">"));
    }

    #[test]
    fn test_safe_url_drops_script_schemes() {
        assert_eq!(safe_url("javascript:alert(1)"), "");
        assert_eq!(safe_url("JavaScript:alert(1)"), "");
        assert_eq!(safe_url("https://example.com"), "https://example.com");
        assert_eq!(safe_url("mailto:a@b.c"), "mailto:a@b.c");
        assert_eq!(safe_url("docs/a:b.md"), "docs/a:b.md");
        assert_eq!(safe_url("#section"), "#section");
    }
}
