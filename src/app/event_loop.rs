use std::io::stdout;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, update};
use crate::export::{ClipboardService, ExportCoordinator, ExportReport, SystemClipboard};
use crate::image::ImageLoader;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or the event loop
    /// encounters an I/O failure. Export failures never end the loop.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        let init_scope = crate::perf::scope("app.ratatui_init");
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal - marklive requires an interactive terminal")?;
        let size = terminal.size()?;
        drop(init_scope);

        let mut model = Model::new(&self.source, (size.width, size.height));
        crate::perf::log_event(
            "init.layout",
            format!(
                "terminal={}x{} preview_w={}",
                size.width,
                size.height,
                model.layout().preview_width()
            ),
        );

        let (tx, rx) = mpsc::channel();
        let clipboard: Arc<dyn ClipboardService> = match &self.clipboard {
            Some(clipboard) => Arc::clone(clipboard),
            None => Arc::new(SystemClipboard::new()),
        };
        let coordinator = ExportCoordinator::new(
            clipboard,
            ImageLoader::new(self.base_dir.clone()),
            self.output_dir.clone(),
            tx,
        );

        let result = execute!(stdout(), EnableBracketedPaste)
            .context("Failed to enable bracketed paste")
            .and_then(|()| {
                if self.mouse_enabled {
                    execute!(stdout(), EnableMouseCapture)
                        .context("Failed to enable mouse capture")?;
                }
                Self::event_loop(&mut terminal, &mut model, &coordinator, &rx)
            });

        // Restore terminal
        if self.mouse_enabled {
            let _ = execute!(stdout(), DisableMouseCapture);
        }
        let _ = execute!(stdout(), DisableBracketedPaste);
        ratatui::restore();

        result
    }

    fn event_loop(
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        coordinator: &ExportCoordinator,
        reports: &Receiver<ExportReport>,
    ) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        loop {
            while let Ok(report) = reports.try_recv() {
                Self::dispatch(model, coordinator, Message::ExportFinished(report));
                needs_render = true;
            }

            if model.expire_status(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                crate::perf::log_event(
                    "event.resize.apply",
                    format!("frame={frame_idx} width={width} height={height}"),
                );
                Self::dispatch(model, coordinator, Message::Resize(width, height));
                needs_render = true;
            }

            // Handle events
            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() {
                10
            } else {
                // Short enough to pick up export reports and status expiry.
                50
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Coalesce key repeat and paste bursts into a single render.
                let mut drained = 0_u32;
                loop {
                    let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    let msg =
                        Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer);
                    if let Some(msg) = msg {
                        crate::perf::log_event(
                            "event.message",
                            format!("frame={frame_idx} msg={msg:?}"),
                        );
                        drained += 1;
                        Self::dispatch(model, coordinator, msg);
                        needs_render = true;
                    }
                    if model.should_quit || !event::poll(Duration::from_millis(0))? {
                        break;
                    }
                }
                if drained > 1 {
                    crate::perf::log_event(
                        "event.drain",
                        format!("frame={frame_idx} drained={drained}"),
                    );
                }
            }

            if model.should_quit {
                break;
            }

            if needs_render {
                frame_idx += 1;
                let draw_start = Instant::now();
                terminal.draw(|frame| Self::view(model, frame))?;
                crate::perf::log_event(
                    "frame.draw",
                    format!(
                        "frame={} draw_ms={:.3}",
                        frame_idx,
                        draw_start.elapsed().as_secs_f64() * 1000.0
                    ),
                );
                needs_render = false;
            }
        }
        Ok(())
    }

    /// Apply `msg` to the model, then run its side effects.
    pub(super) fn dispatch(model: &mut Model, coordinator: &ExportCoordinator, msg: Message) {
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(coordinator, model, &side_msg);
    }
}
