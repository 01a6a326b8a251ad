use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::app::Model;
use crate::document::RenderedLine;

use super::layout::{
    COPY_LABEL, EDITOR_TITLE, EXPORT_LABEL, PREVIEW_TITLE, ScreenLayout, editor_hscroll,
    gutter_columns, line_number_width,
};
use super::style::{ACCENT, style_for_inline, style_for_line_type};
use super::{overlays, status};

pub const HEADER_TITLE: &str = "Real-Time Markdown Editor";

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let layout = model.layout();

    render_header(frame, layout.header);
    render_editor(model, frame, &layout);
    render_preview(model, frame, &layout);
    render_buttons(frame, &layout);
    status::render_status_line(model, frame, layout.status);
    status::render_footer(frame, layout.footer);

    if model.help_visible {
        overlays::render_help_overlay(frame, frame.area());
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new(HEADER_TITLE)
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(header, area);
}

fn render_editor(model: &Model, frame: &mut Frame, layout: &ScreenLayout) {
    let block = Block::default()
        .title(EDITOR_TITLE)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(block, layout.editor);

    let area = layout.editor_text;
    if area.width == 0 || area.height == 0 {
        return;
    }

    let buf = &model.editor;
    let total_lines = buf.line_count();
    let gutter_width = line_number_width(total_lines);
    let text_width = area.width.saturating_sub(gutter_columns(total_lines));
    let cursor = buf.cursor();
    let cursor_col = buf.cursor_display_col();
    let hscroll = editor_hscroll(cursor_col, text_width);

    let content: Vec<Line> = model
        .editor_viewport
        .visible_range()
        .map(|line_idx| {
            let line_text = buf.line_at(line_idx).unwrap_or_default();
            let number = format!("{:>width$} ", line_idx + 1, width = gutter_width as usize);
            let number_style = if line_idx == cursor.line {
                Style::default().fg(ACCENT)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(vec![
                Span::styled(number, number_style),
                Span::raw(display_slice(&line_text, hscroll, usize::from(text_width))),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(content), area);

    if !model.help_visible
        && let Some(row) = cursor.line.checked_sub(model.editor_viewport.offset())
        && row < usize::from(area.height)
    {
        #[allow(clippy::cast_possible_truncation)]
        let x = area.x + gutter_columns(total_lines) + (cursor_col - hscroll) as u16;
        #[allow(clippy::cast_possible_truncation)]
        let y = area.y + row as u16;
        frame.set_cursor_position(Position::new(x.min(area.right().saturating_sub(1)), y));
    }
}

fn render_preview(model: &Model, frame: &mut Frame, layout: &ScreenLayout) {
    let block = Block::default()
        .title(PREVIEW_TITLE)
        .title_bottom(
            Line::from(format!(" {}% ", model.preview_viewport.scroll_percent())).right_aligned(),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(block, layout.preview);

    let area = layout.preview_text;
    if area.width == 0 || area.height == 0 {
        return;
    }

    let document = model.view.document();
    let viewport = &model.preview_viewport;
    let content: Vec<Line> = document
        .visible_lines(viewport.offset(), viewport.height() as usize)
        .into_iter()
        .map(styled_line)
        .collect();
    frame.render_widget(Paragraph::new(content), area);
}

/// Convert a preview line to a styled terminal line.
pub fn styled_line(line: &RenderedLine) -> Line<'static> {
    let base = style_for_line_type(line.line_type());
    match line.spans() {
        Some(spans) => Line::from(
            spans
                .iter()
                .map(|span| {
                    Span::styled(
                        span.text().to_string(),
                        style_for_inline(base, span.style()),
                    )
                })
                .collect::<Vec<_>>(),
        )
        .style(base),
        None => Line::styled(line.content().to_string(), base),
    }
}

fn render_buttons(frame: &mut Frame, layout: &ScreenLayout) {
    let style = Style::default().fg(ACCENT).add_modifier(Modifier::BOLD);
    if layout.copy_button.width > 0 {
        frame.render_widget(Paragraph::new(COPY_LABEL).style(style), layout.copy_button);
    }
    if layout.export_button.width > 0 {
        frame.render_widget(Paragraph::new(EXPORT_LABEL).style(style), layout.export_button);
    }
}

/// Cut `text` to the display columns `skip..skip + width`.
fn display_slice(text: &str, skip: usize, width: usize) -> String {
    let mut out = String::new();
    let mut col = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if col >= skip && col + ch_width <= skip + width {
            out.push(ch);
        }
        col += ch_width;
        if col >= skip + width {
            break;
        }
    }
    out
}
