//! Marklive - A live markdown editor for the terminal.
//!
//! # Usage
//!
//! ```bash
//! marklive
//! marklive notes.md
//! marklive --output-dir ~/Downloads notes.md
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use marklive::app::App;
use marklive::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use marklive::editor::DEFAULT_SOURCE;
use marklive::perf;

/// A live markdown editor with rich copy and PDF export
#[derive(Parser, Debug)]
#[command(name = "marklive", version, about, long_about = None)]
struct Cli {
    /// Markdown file to seed the editor with (never written back)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Directory the exported PDF is written into
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Write diagnostics to a file
    #[arg(long, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Log timing events to the debug log
    #[arg(long)]
    perf: bool,

    /// Do not capture the mouse
    #[arg(long)]
    no_mouse: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let debug_log_path = effective
        .debug_log
        .clone()
        .or_else(|| std::env::var_os("MARKLIVE_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::init_tracing(debug_log_path.as_deref(), effective.perf) {
        eprintln!(
            "[warn] Failed to initialize debug log {}: {}",
            debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    let (source, base_dir) = match &cli.file {
        Some(file) => {
            let source = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let base_dir = file
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), PathBuf::from);
            (source, base_dir)
        }
        None => (DEFAULT_SOURCE.to_string(), PathBuf::from(".")),
    };
    let output_dir = effective.output_dir.unwrap_or_else(|| PathBuf::from("."));
    tracing::debug!(
        file = ?cli.file,
        output_dir = %output_dir.display(),
        mouse = !effective.no_mouse,
        "starting"
    );

    // Run the application
    let mut app = App::new(source)
        .with_base_dir(base_dir)
        .with_output_dir(output_dir)
        .with_mouse(!effective.no_mouse);

    app.run().context("Application error")
}
