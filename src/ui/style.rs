//! Terminal styling of the preview.
//!
//! Mirrors the presentation rules of the rendered HTML in terminal terms:
//! bold headings over a rule, code on a dark background, quotes in gray
//! italics, links blue and underlined.

use ratatui::style::{Color, Modifier, Style};

use crate::document::{InlineStyle, LineType};

/// Dark background behind code (`bg-gray-800`).
pub const CODE_BACKGROUND: Color = Color::Indexed(236);
/// Light foreground for code (`text-gray-100`).
pub const CODE_FOREGROUND: Color = Color::Indexed(255);
/// Muted gray for quotes and borders.
pub const MUTED: Color = Color::Indexed(244);
pub const LINK: Color = Color::LightBlue;
pub const ACCENT: Color = Color::Cyan;

/// Base style for a preview line.
pub fn style_for_line_type(line_type: LineType) -> Style {
    match line_type {
        LineType::Heading(1 | 2) => Style::default().add_modifier(Modifier::BOLD),
        LineType::Heading(3) => Style::default()
            .fg(ACCENT)
            .add_modifier(Modifier::BOLD),
        LineType::Heading(_) => Style::default().add_modifier(Modifier::BOLD),
        LineType::HeadingRule | LineType::HorizontalRule => Style::default().fg(MUTED),
        LineType::CodeBlock => Style::default().fg(CODE_FOREGROUND).bg(CODE_BACKGROUND),
        LineType::BlockQuote => Style::default().fg(MUTED).add_modifier(Modifier::ITALIC),
        LineType::TableHeader => Style::default().add_modifier(Modifier::BOLD),
        LineType::Table => Style::default().fg(MUTED),
        LineType::Image => Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::ITALIC),
        LineType::ListItem(_) | LineType::Paragraph | LineType::Empty => Style::default(),
    }
}

/// Style for an inline span, merged over the line's base style.
pub fn style_for_inline(base: Style, inline: InlineStyle) -> Style {
    let mut style = base;

    if inline.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if inline.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if inline.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if inline.link {
        style = style.fg(LINK).add_modifier(Modifier::UNDERLINED);
    }
    if inline.code {
        style = style.fg(CODE_FOREGROUND).bg(CODE_BACKGROUND);
    }

    style
}
