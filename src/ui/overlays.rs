use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

pub fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let lines = vec![
        Line::styled("Editing", section_style),
        Line::raw("  Type, Enter, Backspace/Delete"),
        Line::raw("  Tab                 Insert four spaces"),
        Line::raw("  Arrows, Home/End    Move cursor"),
        Line::raw("  Ctrl+Left/Right     Word movement"),
        Line::raw("  Ctrl+Home/End       Document start / end"),
        Line::raw("  PageUp/PageDown     Scroll editor"),
        Line::raw("  Click               Position cursor"),
        Line::raw(""),
        Line::styled("Preview", section_style),
        Line::raw("  Alt+Up/Down         Scroll preview"),
        Line::raw("  Mouse wheel         Scroll pane under pointer"),
        Line::raw(""),
        Line::styled("Export", section_style),
        Line::raw("  Ctrl+Y / [Copy]     Copy formatted HTML"),
        Line::raw("  Ctrl+E / [Export]   Save markdown-preview.pdf"),
        Line::raw(""),
        Line::styled("Other", section_style),
        Line::raw("  F1                  Toggle help"),
        Line::raw("  Ctrl+Q / Ctrl+C     Quit"),
        Line::raw(""),
        Line::styled("Any key closes", dim_style),
    ];

    #[allow(clippy::cast_possible_truncation)]
    let needed_rows = lines.len() as u16 + 4;
    let popup = centered_popup_rect(52, needed_rows, area);

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
