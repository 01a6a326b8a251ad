//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`layout`]: Screen regions and hit-testing
//! - [`viewport`]: Scroll position and visible range management
//! - [`style`]: Preview colors and modifiers

pub mod layout;
pub mod style;
pub mod viewport;

mod overlays;
mod render;
mod status;

pub use layout::ScreenLayout;
pub use render::{HEADER_TITLE, render, styled_line};
pub use status::FOOTER_HINTS;
