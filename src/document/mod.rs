//! Terminal layout of the rendered preview.
//!
//! The preview pane draws a [`Document`]: the markdown laid out as styled,
//! wrapped lines for the current pane width, plus the standalone images
//! found along the way.

mod parser;
mod types;

pub use parser::layout;
pub use types::{Document, ImageRef, InlineSpan, InlineStyle, LineType, RenderedLine};
