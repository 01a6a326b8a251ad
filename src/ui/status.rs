use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::Model;
use crate::export::{
    STATUS_COPIED_FORMATTED, STATUS_COPIED_TEXT, STATUS_GENERATING_PDF, STATUS_PDF_SAVED,
};

pub const FOOTER_HINTS: &str =
    " Ctrl+Y copy  Ctrl+E export PDF  Alt+\u{2191}/\u{2193} scroll preview  F1 help  Ctrl+Q quit";

/// Transient action outcome under the preview. Blank when nothing is shown.
pub fn render_status_line(model: &Model, frame: &mut Frame, area: Rect) {
    let text = model.status_text();
    if text.is_empty() {
        return;
    }
    let style = match text {
        STATUS_GENERATING_PDF => Style::default().fg(Color::Yellow),
        STATUS_COPIED_FORMATTED | STATUS_COPIED_TEXT | STATUS_PDF_SAVED => {
            Style::default().fg(Color::Green)
        }
        _ => Style::default().fg(Color::Red),
    };
    frame.render_widget(Paragraph::new(format!(" {text}")).style(style), area);
}

pub fn render_footer(frame: &mut Frame, area: Rect) {
    let footer =
        Paragraph::new(FOOTER_HINTS).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(footer, area);
}
