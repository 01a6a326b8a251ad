use crate::app::{App, Message, Model};
use crate::export::{CopySnapshot, ExportCoordinator};

impl App {
    /// Start the background work a message asks for.
    ///
    /// Runs after [`update`](crate::app::update), so the snapshot always
    /// reflects the preview the user just saw.
    pub(super) fn handle_message_side_effects(
        coordinator: &ExportCoordinator,
        model: &Model,
        msg: &Message,
    ) {
        match msg {
            Message::CopyFormatted => {
                crate::perf::log_event(
                    "export.copy.start",
                    format!("rev={}", model.view.revision()),
                );
                coordinator.spawn_copy(CopySnapshot::new(&model.view, model.source()));
            }
            Message::ExportPdf => {
                crate::perf::log_event(
                    "export.pdf.start",
                    format!(
                        "rev={} lines={}",
                        model.view.revision(),
                        model.view.document().line_count()
                    ),
                );
                coordinator.spawn_pdf(model.view.shared_document());
            }
            Message::ExportFinished(report) => {
                tracing::info!(kind = ?report.kind, status = report.status, "export finished");
            }
            _ => {}
        }
    }
}
