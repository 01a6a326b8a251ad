// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. export::ExportError)
    clippy::module_name_repetitions
)]

//! # Marklive
//!
//! A live markdown editor for the terminal.
//!
//! Marklive shows the markdown source next to a preview that is re-rendered
//! on every keystroke, and offers two exports of the rendered output:
//! - Copy as rich text (HTML) to the system clipboard
//! - Export the preview as a one-page A4 PDF
//!
//! ## Architecture
//!
//! Marklive uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`editor`]: The markdown source buffer
//! - [`render`]: Markdown to styled element tree and HTML
//! - [`document`]: Terminal layout of the preview
//! - [`export`]: Clipboard copy, bitmap capture and PDF export
//! - [`image`]: Image loading for capture
//! - [`ui`]: Terminal UI components
//! - [`config`]: Saved command-line defaults
//! - [`perf`]: Timing instrumentation and log setup

pub mod app;
pub mod config;
pub mod document;
pub mod editor;
pub mod export;
pub mod image;
pub mod perf;
pub mod render;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::Document;
    pub use crate::editor::EditorBuffer;
    pub use crate::export::{ClipboardService, ExportCoordinator};
    pub use crate::render::RenderedView;
    pub use crate::ui::viewport::Viewport;
}
