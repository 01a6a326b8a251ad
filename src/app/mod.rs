//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! Export actions are the only side effects. They run on worker threads
//! and come back as [`Message::ExportFinished`].

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Model, STATUS_TTL, StatusMessage};
pub use update::{Message, TAB_TEXT, update};

use std::path::PathBuf;
use std::sync::Arc;

use crate::editor::DEFAULT_SOURCE;
use crate::export::ClipboardService;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    source: String,
    base_dir: PathBuf,
    output_dir: PathBuf,
    mouse_enabled: bool,
    clipboard: Option<Arc<dyn ClipboardService>>,
}

impl App {
    /// Create a new application editing `source`.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            base_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            mouse_enabled: true,
            clipboard: None,
        }
    }

    /// Directory relative image paths resolve against.
    #[must_use]
    pub fn with_base_dir(mut self, dir: PathBuf) -> Self {
        self.base_dir = dir;
        self
    }

    /// Directory the PDF is written into.
    #[must_use]
    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Enable or disable mouse capture.
    #[must_use]
    pub const fn with_mouse(mut self, enabled: bool) -> Self {
        self.mouse_enabled = enabled;
        self
    }

    /// Replace the system clipboard.
    #[must_use]
    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardService>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE)
    }
}
