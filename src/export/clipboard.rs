//! Clipboard access.
//!
//! [`ClipboardService`] is the seam the copy action writes through.
//! [`SystemClipboard`] talks to the OS clipboard via arboard and, for plain
//! text only, falls back to the terminal's OSC 52 escape. It keeps one
//! arboard handle for its whole life: on X11 the copied content is served
//! by that handle and vanishes when it drops.

use std::io::{Write, stdout};
use std::sync::{Mutex, MutexGuard};

use base64::Engine as _;
use thiserror::Error;

/// Failure to write to the clipboard.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard rejected {format} content: {message}")]
    Rejected {
        format: &'static str,
        message: String,
    },
    #[error("terminal clipboard write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A clipboard that accepts rich HTML and plain text.
pub trait ClipboardService: Send + Sync {
    /// Write `html` tagged as HTML.
    fn write_html(&self, html: &str) -> Result<(), ClipboardError>;

    /// Write `text` as plain text.
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// A value created on first use and kept until the owner drops.
struct Retained<T> {
    slot: Mutex<Option<T>>,
}

impl<T> Retained<T> {
    const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Run `op` on the value, creating it first if needed.
    ///
    /// A failed `create` leaves the slot empty so the next call retries.
    fn with<R, E>(
        &self,
        create: impl FnOnce() -> Result<T, E>,
        op: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Result<R, E> {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let value = match slot.take() {
            Some(value) => value,
            None => create()?,
        };
        op(slot.insert(value))
    }

    #[cfg(test)]
    fn is_held(&self) -> bool {
        match self.slot.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }
}

/// The operating system clipboard.
pub struct SystemClipboard {
    /// Emit OSC 52 when the OS clipboard refuses plain text.
    osc52_fallback: bool,
    handle: Retained<arboard::Clipboard>,
}

impl SystemClipboard {
    pub const fn new() -> Self {
        Self {
            osc52_fallback: true,
            handle: Retained::new(),
        }
    }

    fn write(
        &self,
        format: &'static str,
        write: impl FnOnce(&mut arboard::Clipboard) -> Result<(), arboard::Error>,
    ) -> Result<(), ClipboardError> {
        self.handle.with(
            || {
                arboard::Clipboard::new()
                    .map_err(|err| ClipboardError::Unavailable(err.to_string()))
            },
            |clipboard| {
                write(clipboard).map_err(|err| ClipboardError::Rejected {
                    format,
                    message: err.to_string(),
                })
            },
        )
    }
}

impl std::fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemClipboard")
            .field("osc52_fallback", &self.osc52_fallback)
            .finish_non_exhaustive()
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardService for SystemClipboard {
    fn write_html(&self, html: &str) -> Result<(), ClipboardError> {
        self.write("html", |clipboard| clipboard.set_html(html, None))
    }

    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        match self.write("text", |clipboard| clipboard.set_text(text)) {
            Err(err) if self.osc52_fallback => {
                tracing::debug!(error = %err, "falling back to OSC 52");
                copy_to_clipboard_osc52(text)
            }
            other => other,
        }
    }
}

fn copy_to_clipboard_osc52(text: &str) -> Result<(), ClipboardError> {
    let osc = osc52_sequence(text);
    let mut out = stdout();
    out.write_all(osc.as_bytes())?;
    out.flush()?;
    Ok(())
}

fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}

/// What a [`MemoryClipboard`] last received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardContent {
    Html(String),
    Text(String),
}

/// In-process clipboard that records writes and can be told to fail.
///
/// Used where no OS clipboard should be touched, such as tests and
/// headless runs.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    reject_html: bool,
    reject_text: bool,
    content: Mutex<Option<ClipboardContent>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse HTML writes.
    #[must_use]
    pub const fn rejecting_html(mut self) -> Self {
        self.reject_html = true;
        self
    }

    /// Refuse plain-text writes.
    #[must_use]
    pub const fn rejecting_text(mut self) -> Self {
        self.reject_text = true;
        self
    }

    /// The most recent successful write.
    pub fn content(&self) -> Option<ClipboardContent> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<ClipboardContent>> {
        match self.content.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl ClipboardService for MemoryClipboard {
    fn write_html(&self, html: &str) -> Result<(), ClipboardError> {
        if self.reject_html {
            return Err(ClipboardError::Rejected {
                format: "html",
                message: "html not supported".to_string(),
            });
        }
        *self.lock() = Some(ClipboardContent::Html(html.to_string()));
        Ok(())
    }

    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.reject_text {
            return Err(ClipboardError::Unavailable("no clipboard".to_string()));
        }
        *self.lock() = Some(ClipboardContent::Text(text.to_string()));
        Ok(())
    }
}
