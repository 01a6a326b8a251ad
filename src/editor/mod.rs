//! Markdown source holder.
//!
//! Provides a rope-backed text buffer with cursor management. The buffer
//! owns the document source; the preview is always derived from it.

mod buffer;

pub use buffer::{Cursor, Direction, EditorBuffer};

/// Source shown when the editor starts without a seed file.
pub const DEFAULT_SOURCE: &str = "# Test\n- One\n- Two\n\n> Blockquotes look nice too\n";
