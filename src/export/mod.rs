//! Export actions on the rendered preview.
//!
//! Two independent, user-triggered operations:
//!
//! - **Copy formatted**: the styled tree as HTML on the clipboard, falling
//!   back to the raw source as plain text.
//! - **Export PDF**: the preview captured as a bitmap and placed on a single
//!   A4 page written to the output directory.
//!
//! [`ExportCoordinator`] runs each on its own worker thread and reports the
//! resulting status text back through a channel. Each run reads only the
//! immutable part of the view it needs.

pub mod capture;
pub mod clipboard;
pub mod pdf;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Sender;

use thiserror::Error;

pub use capture::{Bitmap, CaptureOptions, Scene, SceneKind, SceneNode, capture_document};
pub use clipboard::{
    ClipboardContent, ClipboardError, ClipboardService, MemoryClipboard, SystemClipboard,
};
pub use pdf::{PDF_FILE_NAME, PageGeometry};

use crate::document::Document;
use crate::image::ImageLoader;
use crate::render::{RenderedView, StyledTree};

pub const STATUS_COPIED_FORMATTED: &str = "Formatted content copied to clipboard!";
pub const STATUS_COPIED_TEXT: &str = "Text copied to clipboard!";
pub const STATUS_COPY_FAILED: &str = "Failed to copy";
pub const STATUS_GENERATING_PDF: &str = "Generating PDF...";
pub const STATUS_PDF_SAVED: &str = "PDF downloaded!";
pub const STATUS_PDF_FAILED: &str = "Failed to generate PDF";

/// Failure while producing the PDF.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to capture")]
    EmptyCapture,
    #[error("failed to build capture scene: {0}")]
    Svg(#[from] resvg::usvg::Error),
    #[error("failed to allocate {width}x{height} bitmap")]
    Bitmap { width: u32, height: u32 },
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which action a report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Copy,
    Pdf,
}

/// Outcome of one action, sent back to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub kind: ExportKind,
    pub status: &'static str,
    /// Written file, for a successful PDF export.
    pub path: Option<PathBuf>,
}

/// What a copy needs, taken at trigger time.
///
/// The tree is shared with the view; markup is produced on the worker.
#[derive(Debug, Clone)]
pub struct CopySnapshot {
    pub tree: Arc<StyledTree>,
    pub source: String,
}

impl CopySnapshot {
    pub fn new(view: &RenderedView, source: impl Into<String>) -> Self {
        Self {
            tree: view.shared_tree(),
            source: source.into(),
        }
    }
}

/// Copy `html` as rich text, falling back to `source` as plain text.
///
/// Returns the status to show. Failures are logged, never returned.
pub fn copy_formatted(clipboard: &dyn ClipboardService, html: &str, source: &str) -> &'static str {
    match clipboard.write_html(html) {
        Ok(()) => {
            tracing::debug!(bytes = html.len(), "copied formatted content");
            STATUS_COPIED_FORMATTED
        }
        Err(err) => {
            tracing::warn!(error = %err, "rich copy failed, trying plain text");
            match clipboard.write_text(source) {
                Ok(()) => STATUS_COPIED_TEXT,
                Err(err) => {
                    tracing::error!(error = %err, "plain text copy failed");
                    STATUS_COPY_FAILED
                }
            }
        }
    }
}

/// Capture `document`, lay it on an A4 page and write it into `out_dir`.
///
/// # Errors
///
/// Returns an error if capture, encoding or the file write fails.
pub fn export_pdf(
    document: &Document,
    images: &ImageLoader,
    options: &CaptureOptions,
    out_dir: &Path,
) -> Result<PathBuf, ExportError> {
    let bitmap = capture_document(document, images, options)?;
    let bytes = pdf::build_pdf(bitmap.pixels(), PageGeometry::A4);
    pdf::save_pdf(&bytes, out_dir)
}

/// Runs export actions in the background.
#[derive(Clone)]
pub struct ExportCoordinator {
    clipboard: Arc<dyn ClipboardService>,
    images: ImageLoader,
    output_dir: PathBuf,
    reports: Sender<ExportReport>,
}

impl ExportCoordinator {
    pub fn new(
        clipboard: Arc<dyn ClipboardService>,
        images: ImageLoader,
        output_dir: PathBuf,
        reports: Sender<ExportReport>,
    ) -> Self {
        Self {
            clipboard,
            images,
            output_dir,
            reports,
        }
    }

    /// Start a copy on a worker thread.
    pub fn spawn_copy(&self, snapshot: CopySnapshot) {
        let clipboard = Arc::clone(&self.clipboard);
        let reports = self.reports.clone();
        self.spawn(ExportKind::Copy, move || {
            let html = snapshot.tree.to_html();
            let status = copy_formatted(clipboard.as_ref(), &html, &snapshot.source);
            let _ = reports.send(ExportReport {
                kind: ExportKind::Copy,
                status,
                path: None,
            });
        });
    }

    /// Start a PDF export of `document` on a worker thread.
    pub fn spawn_pdf(&self, document: Arc<Document>) {
        let images = self.images.clone();
        let output_dir = self.output_dir.clone();
        let reports = self.reports.clone();
        self.spawn(ExportKind::Pdf, move || {
            let options = CaptureOptions::default();
            let report = match export_pdf(&document, &images, &options, &output_dir) {
                Ok(path) => {
                    tracing::debug!(path = %path.display(), "pdf written");
                    ExportReport {
                        kind: ExportKind::Pdf,
                        status: STATUS_PDF_SAVED,
                        path: Some(path),
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "pdf export failed");
                    ExportReport {
                        kind: ExportKind::Pdf,
                        status: STATUS_PDF_FAILED,
                        path: None,
                    }
                }
            };
            let _ = reports.send(report);
        });
    }

    fn spawn(&self, kind: ExportKind, job: impl FnOnce() + Send + 'static) {
        let name = match kind {
            ExportKind::Copy => "marklive-copy",
            ExportKind::Pdf => "marklive-pdf",
        };
        if let Err(err) = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(job)
        {
            tracing::error!(error = %err, "failed to start export worker");
            let status = match kind {
                ExportKind::Copy => STATUS_COPY_FAILED,
                ExportKind::Pdf => STATUS_PDF_FAILED,
            };
            let _ = self.reports.send(ExportReport {
                kind,
                status,
                path: None,
            });
        }
    }
}
