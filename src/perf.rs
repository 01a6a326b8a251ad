//! Lightweight performance instrumentation and log setup.
//!
//! Timings are `tracing` debug events on the [`TARGET`] target, emitted only
//! while [`set_enabled`] is on.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing_subscriber::EnvFilter;

/// Tracing target for timing events.
pub const TARGET: &str = "marklive::perf";

static ENABLED: AtomicBool = AtomicBool::new(false);

#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(target: TARGET, scope = self.name, elapsed_ms, "scope finished");
    }
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Time until the returned guard drops.
pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

pub fn log_event(name: &str, detail: impl AsRef<str>) {
    if !is_enabled() {
        return;
    }
    tracing::debug!(target: TARGET, event = name, detail = detail.as_ref());
}

/// Install the global subscriber.
///
/// The terminal belongs to the UI, so output goes to `log_path` when set
/// and is discarded otherwise. `RUST_LOG` refines the default `warn`
/// level; `perf` additionally enables [`TARGET`] at debug.
///
/// # Errors
///
/// Returns an error if the log file cannot be created.
pub fn init_tracing(log_path: Option<&Path>, perf: bool) -> std::io::Result<()> {
    let mut filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    if perf && let Ok(directive) = format!("{TARGET}=debug").parse() {
        filter = filter.add_directive(directive);
    }

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);
    let result = match log_path {
        Some(path) => {
            let file = File::create(path)?;
            builder.with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::sink).try_init(),
    };
    if let Err(err) = result {
        // A subscriber already installed keeps receiving events.
        eprintln!("[warn] tracing already initialized: {err}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_scope_reports_through_tracing_only_when_enabled() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            set_enabled(true);
            assert!(is_enabled());
            drop(scope("test.scope"));
            log_event("test.event", "hello world");

            set_enabled(false);
            assert!(!is_enabled());
            drop(scope("test.silent"));
        });

        let output = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("test.scope"));
        assert!(output.contains("hello world"));
        assert!(!output.contains("test.silent"));
    }
}
