use crate::app::Model;
use crate::app::model::STATUS_TTL;
use crate::editor::{Direction, EditorBuffer};
use crate::export::{ExportKind, ExportReport, STATUS_GENERATING_PDF};

/// Spaces inserted for the Tab key.
pub const TAB_TEXT: &str = "    ";

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Insert a character at cursor
    EditorInsertChar(char),
    /// Insert text at cursor (paste, Tab)
    EditorInsertText(String),
    /// Delete character before cursor
    EditorDeleteBack,
    /// Delete character at cursor
    EditorDeleteForward,
    /// Split line at cursor (Enter)
    EditorSplitLine,
    /// Replace the whole source
    EditorSetSource(String),

    // Cursor
    /// Move cursor in a direction
    EditorMoveCursor(Direction),
    /// Move cursor to start of line
    EditorMoveHome,
    /// Move cursor to end of line
    EditorMoveEnd,
    /// Move cursor one word left
    EditorMoveWordLeft,
    /// Move cursor one word right
    EditorMoveWordRight,
    /// Move cursor to start of buffer
    EditorMoveToStart,
    /// Move cursor to end of buffer
    EditorMoveToEnd,
    /// Move cursor to a line and display column (mouse click)
    EditorMoveTo(usize, usize),

    // Scrolling
    /// Scroll editor up by n lines
    EditorScrollUp(usize),
    /// Scroll editor down by n lines
    EditorScrollDown(usize),
    /// Scroll editor up one page
    EditorPageUp,
    /// Scroll editor down one page
    EditorPageDown,
    /// Scroll preview up by n lines
    PreviewScrollUp(usize),
    /// Scroll preview down by n lines
    PreviewScrollDown(usize),

    // Export
    /// Copy the rendered preview as rich text
    CopyFormatted,
    /// Export the rendered preview as a PDF
    ExportPdf,
    /// A background action finished
    ExportFinished(ExportReport),

    // Window
    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,
    /// Terminal resized
    Resize(u16, u16),
    /// Quit application
    Quit,
}

/// Pure state transition.
///
/// Every message that changes the source re-renders the preview before
/// returning, so a drawn frame never shows a stale preview.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::EditorInsertChar(ch) => edit(&mut model, |buf| {
            buf.insert_char(ch);
            true
        }),
        Message::EditorInsertText(text) => edit(&mut model, |buf| {
            buf.insert_str(&text);
            !text.is_empty()
        }),
        Message::EditorDeleteBack => edit(&mut model, EditorBuffer::delete_back),
        Message::EditorDeleteForward => edit(&mut model, EditorBuffer::delete_forward),
        Message::EditorSplitLine => edit(&mut model, |buf| {
            buf.split_line();
            true
        }),
        Message::EditorSetSource(text) => edit(&mut model, |buf| {
            buf.set_source(&text);
            true
        }),

        Message::EditorMoveCursor(dir) => navigate(&mut model, |buf| buf.move_cursor(dir)),
        Message::EditorMoveHome => navigate(&mut model, EditorBuffer::move_home),
        Message::EditorMoveEnd => navigate(&mut model, EditorBuffer::move_end),
        Message::EditorMoveWordLeft => navigate(&mut model, EditorBuffer::move_word_left),
        Message::EditorMoveWordRight => navigate(&mut model, EditorBuffer::move_word_right),
        Message::EditorMoveToStart => navigate(&mut model, EditorBuffer::move_to_start),
        Message::EditorMoveToEnd => navigate(&mut model, EditorBuffer::move_to_end),
        Message::EditorMoveTo(line, col) => {
            navigate(&mut model, |buf| buf.move_to_display(line, col));
        }

        Message::EditorScrollUp(n) => model.editor_viewport.scroll_up(n),
        Message::EditorScrollDown(n) => model.editor_viewport.scroll_down(n),
        Message::EditorPageUp => model.editor_viewport.page_up(),
        Message::EditorPageDown => model.editor_viewport.page_down(),
        Message::PreviewScrollUp(n) => model.preview_viewport.scroll_up(n),
        Message::PreviewScrollDown(n) => model.preview_viewport.scroll_down(n),

        // The action itself runs as a side effect; only the pending status
        // is state.
        Message::CopyFormatted => {}
        Message::ExportPdf => model.show_status(STATUS_GENERATING_PDF, None),
        Message::ExportFinished(report) => {
            if report.kind == ExportKind::Pdf && report.path.is_some() {
                model.last_export = report.path;
            }
            model.show_status(report.status, Some(STATUS_TTL));
        }

        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::Resize(width, height) => model.apply_resize(width, height),
        Message::Quit => model.should_quit = true,
    }

    model
}

/// Apply a source mutation; `op` reports whether anything changed.
fn edit(model: &mut Model, op: impl FnOnce(&mut EditorBuffer) -> bool) {
    if op(&mut model.editor) {
        model.refresh_preview();
    }
    model.ensure_cursor_visible();
}

fn navigate(model: &mut Model, op: impl FnOnce(&mut EditorBuffer)) {
    op(&mut model.editor);
    model.ensure_cursor_visible();
}
