use std::process::ExitCode;

use canvas_history::canvas::{blank_canvas, normalized_copy};
use canvas_history::constants::DEFAULT_CANVAS_SIZE;
use canvas_history::{CommandHistory, StampCommand, config, paths};
use image::{DynamicImage, Rgba, RgbaImage};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::prelude::*;

/// Side length of the square patches the demo session stamps
const STAMP_SIZE: u32 = 16;

/// Open the session log file for debug builds
#[cfg(debug_assertions)]
fn log_file_writer() -> Option<(NonBlocking, WorkerGuard)> {
    use std::fs::OpenOptions;
    use std::io::Write;

    let logs_dir = paths::logs_dir();
    if std::fs::create_dir_all(&logs_dir).is_err() {
        eprintln!("Failed to create logs directory");
        return None;
    }

    let log_file_path = logs_dir.join("canvas-history.log");

    // Append session separator to existing log file
    if let Ok(mut file) = OpenOptions::new().append(true).open(&log_file_path) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let separator = "=".repeat(80);
        let _ = writeln!(
            file,
            "\n\n{}\n=== New Session Started at {} ===\n{}\n",
            separator, timestamp, separator
        );
    }

    let file_appender = tracing_appender::rolling::never(&logs_dir, "canvas-history.log");
    Some(tracing_appender::non_blocking(file_appender))
}

#[cfg(not(debug_assertions))]
fn log_file_writer() -> Option<(NonBlocking, WorkerGuard)> {
    None
}

/// Set up stdout logging, plus file logging in debug builds
fn setup_logging() -> Option<WorkerGuard> {
    let (file_layer, guard) = match log_file_writer() {
        Some((writer, guard)) => {
            // No ANSI colors for file output
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_level(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(true)
        .with_level(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,canvas_history=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}

fn stamp_at(color: Rgba<u8>, slot: u32) -> Box<StampCommand> {
    let patch = RgbaImage::from_pixel(STAMP_SIZE, STAMP_SIZE, color);
    Box::new(StampCommand::new(patch, i64::from(slot * STAMP_SIZE), 0))
}

fn main() -> ExitCode {
    // Keep the guard alive for the duration of the program
    let _log_guard = setup_logging();

    if let Err(e) = paths::ensure_directories() {
        warn!("Failed to create app directories: {}", e);
    }

    let loaded = config::load_config();
    if let Some(reason) = &loaded.reset_reason {
        warn!("Config reset to defaults: {}", reason);
    }
    let history = CommandHistory::new(loaded.config);

    let base = match std::env::args().nth(1) {
        Some(path) => match image::open(&path) {
            Ok(image) => {
                info!("Opened base image {}", path);
                image
            }
            Err(e) => {
                error!("Failed to open base image {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => DynamicImage::ImageRgba8(blank_canvas(DEFAULT_CANVAS_SIZE, DEFAULT_CANVAS_SIZE)),
    };

    if let Err(e) = history.set_base_bitmap(&base) {
        error!("Cannot use base image: {}", e);
        return ExitCode::FAILURE;
    }
    let mut canvas = normalized_copy(&base);

    let palette = [
        Rgba([220, 50, 47, 255]),
        Rgba([133, 153, 0, 255]),
        Rgba([38, 139, 210, 255]),
    ];
    for (slot, color) in (0u32..).zip(palette) {
        if let Err(e) = history.commit_command(stamp_at(color, slot)) {
            warn!("Stamp {} not recorded: {}", slot, e);
        }
    }
    info!("Painted {} stamps", history.redraw(&mut canvas));

    history.undo();
    history.undo();
    info!("Undo x2 repainted {} commands", history.redraw(&mut canvas));

    history.redo();
    info!("Redo applied {} command", history.redraw(&mut canvas));

    // Commit on top of the remaining redo entry, pruning it
    if let Err(e) = history.commit_command(stamp_at(Rgba([181, 137, 0, 255]), 3)) {
        warn!("Stamp not recorded: {}", e);
    }
    history.redraw(&mut canvas);

    info!(
        "Session finished: {} active of {} queued (capacity {}), base {}",
        history.counter(),
        history.len(),
        history.capacity(),
        history.base_name()
    );

    history.reset_and_clear();
    ExitCode::SUCCESS
}
