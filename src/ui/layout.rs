//! Screen geometry shared by drawing and mouse hit-testing.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const EDITOR_TITLE: &str = " markdown.md ";
pub const PREVIEW_TITLE: &str = " preview.html ";
pub const COPY_LABEL: &str = "[Copy]";
pub const EXPORT_LABEL: &str = "[Export]";

/// Regions of the single screen.
///
/// The header sits on the first row and the footer on the last. Between
/// them, the editor and preview panes split the width evenly, with the
/// status line under the preview. The two action buttons live on the
/// preview's top border, right-aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenLayout {
    pub header: Rect,
    pub editor: Rect,
    pub editor_text: Rect,
    pub preview: Rect,
    pub preview_text: Rect,
    pub status: Rect,
    pub footer: Rect,
    pub copy_button: Rect,
    pub export_button: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        let editor = columns[0];
        let preview = columns[1];
        let status = Rect {
            x: preview.x,
            width: preview.width,
            ..rows[2]
        };

        let export_width = label_width(EXPORT_LABEL);
        let copy_width = label_width(COPY_LABEL);
        // One cell for the corner, one between the buttons.
        let export_x = (preview.x + preview.width).saturating_sub(1 + export_width);
        let copy_x = export_x.saturating_sub(1 + copy_width);
        let (copy_button, export_button) =
            if preview.height > 0 && copy_x > preview.x + label_width(PREVIEW_TITLE) {
                (
                    Rect::new(copy_x, preview.y, copy_width, 1),
                    Rect::new(export_x, preview.y, export_width, 1),
                )
            } else {
                (Rect::default(), Rect::default())
            };

        Self {
            header: rows[0],
            editor,
            editor_text: inner(editor),
            preview,
            preview_text: inner(preview),
            status,
            footer: rows[3],
            copy_button,
            export_button,
        }
    }

    /// Columns available to the preview layout.
    pub fn preview_width(&self) -> u16 {
        self.preview_text.width.max(1)
    }
}

/// Gutter width for `total_lines` line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}

/// Columns the gutter takes, including the separating space.
pub const fn gutter_columns(total_lines: usize) -> u16 {
    line_number_width(total_lines) + 1
}

/// First visible display column of the editor line holding the cursor.
pub const fn editor_hscroll(cursor_display_col: usize, text_width: u16) -> usize {
    let width = text_width as usize;
    if width == 0 || cursor_display_col < width {
        0
    } else {
        cursor_display_col + 1 - width
    }
}

pub const fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

fn inner(rect: Rect) -> Rect {
    Rect {
        x: rect.x.saturating_add(1),
        y: rect.y.saturating_add(1),
        width: rect.width.saturating_sub(2),
        height: rect.height.saturating_sub(2),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn label_width(label: &str) -> u16 {
    unicode_width::UnicodeWidthStr::width(label) as u16
}
