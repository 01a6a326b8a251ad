use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;

use crate::editor::EditorBuffer;
use crate::render::RenderedView;
use crate::ui::layout::ScreenLayout;
use crate::ui::viewport::Viewport;

/// How long a finished action's status stays on screen.
pub const STATUS_TTL: Duration = Duration::from_secs(2);

/// Transient outcome text of the last export or copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: &'static str,
    /// `None` keeps the message until it is overwritten.
    pub expires_at: Option<Instant>,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state. The source in
/// `editor` is the only domain state; `view` is derived from it and is
/// refreshed by every edit.
pub struct Model {
    pub editor: EditorBuffer,
    pub view: RenderedView,
    pub editor_viewport: Viewport,
    pub preview_viewport: Viewport,
    pub help_visible: bool,
    pub should_quit: bool,
    /// Path of the last PDF written.
    pub last_export: Option<PathBuf>,
    pub terminal_size: (u16, u16),
    status: Option<StatusMessage>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("revision", &self.editor.revision())
            .field("view_revision", &self.view.revision())
            .field("editor_viewport", &self.editor_viewport)
            .field("preview_viewport", &self.preview_viewport)
            .field("help_visible", &self.help_visible)
            .field("status", &self.status)
            .field("terminal_size", &self.terminal_size)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a model holding `source` for a terminal of the given size.
    pub fn new(source: &str, terminal_size: (u16, u16)) -> Self {
        let editor = EditorBuffer::from_text(source);
        let layout = layout_for(terminal_size);
        let view = RenderedView::new(source, layout.preview_width(), editor.revision());
        let editor_viewport = Viewport::new(
            layout.editor_text.width,
            layout.editor_text.height,
            editor.line_count(),
        );
        let preview_viewport = Viewport::new(
            layout.preview_text.width,
            layout.preview_text.height,
            view.document().line_count(),
        );
        Self {
            editor,
            view,
            editor_viewport,
            preview_viewport,
            help_visible: false,
            should_quit: false,
            last_export: None,
            terminal_size,
            status: None,
        }
    }

    pub fn layout(&self) -> ScreenLayout {
        layout_for(self.terminal_size)
    }

    pub fn source(&self) -> String {
        self.editor.source()
    }

    /// Re-derive the preview from the current source.
    pub(super) fn refresh_preview(&mut self) {
        let width = self.layout().preview_width();
        self.view = RenderedView::new(&self.editor.source(), width, self.editor.revision());
        self.preview_viewport
            .set_total_lines(self.view.document().line_count());
        self.editor_viewport.set_total_lines(self.editor.line_count());
    }

    /// Whether the preview was rendered from an older revision.
    pub fn preview_is_stale(&self) -> bool {
        self.view.revision() != self.editor.revision()
    }

    pub(super) fn ensure_cursor_visible(&mut self) {
        self.editor_viewport
            .scroll_into_view(self.editor.cursor().line);
    }

    pub(super) fn apply_resize(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
        let layout = self.layout();
        self.editor_viewport
            .resize(layout.editor_text.width, layout.editor_text.height);
        self.preview_viewport
            .resize(layout.preview_text.width, layout.preview_text.height);
        if layout.preview_width() != self.view.width() {
            self.refresh_preview();
        }
        self.ensure_cursor_visible();
    }

    /// Replace the status; `ttl` of `None` keeps it until overwritten.
    pub(super) fn show_status(&mut self, text: &'static str, ttl: Option<Duration>) {
        self.status = Some(StatusMessage {
            text,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        });
    }

    /// Clear the status once its time is up. Returns `true` if it cleared.
    pub(super) fn expire_status(&mut self, now: Instant) -> bool {
        if self
            .status
            .and_then(|status| status.expires_at)
            .is_some_and(|expires_at| expires_at <= now)
        {
            self.status = None;
            return true;
        }
        false
    }

    pub const fn status(&self) -> Option<StatusMessage> {
        self.status
    }

    /// Current status text, empty when nothing is shown.
    pub fn status_text(&self) -> &'static str {
        self.status.map_or("", |status| status.text)
    }
}

fn layout_for((width, height): (u16, u16)) -> ScreenLayout {
    ScreenLayout::new(Rect::new(0, 0, width, height))
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self::new("", (80, 24))
    }
}
