use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Frame;

use crate::app::update::TAB_TEXT;
use crate::app::{App, Message, Model};
use crate::editor::Direction;
use crate::ui::layout::{contains, editor_hscroll, gutter_columns};

use super::event_loop::ResizeDebouncer;

/// Lines moved per mouse wheel notch.
const WHEEL_LINES: usize = 3;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Paste(text) if !model.help_visible => {
                Some(Message::EditorInsertText(text.clone()))
            }
            Event::Resize(w, h) => {
                crate::perf::log_event("event.resize.queue", format!("width={w} height={h}"));
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        // Global
        match key.code {
            KeyCode::Char('q' | 'c') if ctrl => return Some(Message::Quit),
            KeyCode::F(1) => return Some(Message::ToggleHelp),
            _ => {}
        }

        if model.help_visible {
            return Some(Message::HideHelp);
        }

        match key.code {
            // Export
            KeyCode::Char('y') if ctrl => Some(Message::CopyFormatted),
            KeyCode::Char('e') if ctrl => Some(Message::ExportPdf),

            // Preview
            KeyCode::Up if alt => Some(Message::PreviewScrollUp(1)),
            KeyCode::Down if alt => Some(Message::PreviewScrollDown(1)),

            // Cursor
            KeyCode::Left if ctrl => Some(Message::EditorMoveWordLeft),
            KeyCode::Right if ctrl => Some(Message::EditorMoveWordRight),
            KeyCode::Home if ctrl => Some(Message::EditorMoveToStart),
            KeyCode::End if ctrl => Some(Message::EditorMoveToEnd),
            KeyCode::Up => Some(Message::EditorMoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::EditorMoveCursor(Direction::Down)),
            KeyCode::Left => Some(Message::EditorMoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::EditorMoveCursor(Direction::Right)),
            KeyCode::Home => Some(Message::EditorMoveHome),
            KeyCode::End => Some(Message::EditorMoveEnd),
            KeyCode::PageUp => Some(Message::EditorPageUp),
            KeyCode::PageDown => Some(Message::EditorPageDown),

            // Editing
            KeyCode::Enter => Some(Message::EditorSplitLine),
            KeyCode::Tab => Some(Message::EditorInsertText(TAB_TEXT.to_string())),
            KeyCode::Backspace => Some(Message::EditorDeleteBack),
            KeyCode::Delete => Some(Message::EditorDeleteForward),
            KeyCode::Char(c) if !ctrl && !alt => Some(Message::EditorInsertChar(c)),

            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        let layout = model.layout();
        let (column, row) = (mouse.column, mouse.row);

        if model.help_visible {
            return matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left))
                .then_some(Message::HideHelp);
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if contains(layout.copy_button, column, row) {
                    Some(Message::CopyFormatted)
                } else if contains(layout.export_button, column, row) {
                    Some(Message::ExportPdf)
                } else if contains(layout.editor_text, column, row) {
                    let (line, col) = editor_position(model, column, row);
                    Some(Message::EditorMoveTo(line, col))
                } else {
                    None
                }
            }
            MouseEventKind::ScrollDown if contains(layout.editor, column, row) => {
                Some(Message::EditorScrollDown(WHEEL_LINES))
            }
            MouseEventKind::ScrollUp if contains(layout.editor, column, row) => {
                Some(Message::EditorScrollUp(WHEEL_LINES))
            }
            MouseEventKind::ScrollDown if contains(layout.preview, column, row) => {
                Some(Message::PreviewScrollDown(WHEEL_LINES))
            }
            MouseEventKind::ScrollUp if contains(layout.preview, column, row) => {
                Some(Message::PreviewScrollUp(WHEEL_LINES))
            }
            _ => None,
        }
    }

    pub(super) fn view(model: &Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}

/// Source line and display column under a point in the editor text area.
fn editor_position(model: &Model, column: u16, row: u16) -> (usize, usize) {
    let text = model.layout().editor_text;
    let line = model.editor_viewport.offset() + usize::from(row.saturating_sub(text.y));
    let gutter = gutter_columns(model.editor.line_count());
    let rel_col = column.saturating_sub(text.x);
    let hscroll = editor_hscroll(
        model.editor.cursor_display_col(),
        text.width.saturating_sub(gutter),
    );
    let col = hscroll + usize::from(rel_col.saturating_sub(gutter));
    (line, col)
}
