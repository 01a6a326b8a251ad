//! Images referenced from markdown.
//!
//! The preview shows `[Image: alt]` placeholders; the decoded pixels are
//! only needed when the preview is captured for PDF export.

mod loader;

pub use loader::ImageLoader;
