//! User-facing console output, separate from the log stream.
//!
//! Output is split into levels so that `--verbose` can surface progress
//! chatter while the default mode prints only command results and errors.

use colored::Colorize;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLevel {
    /// Print progress, actions, and results.
    Info,
    /// Print only results (and errors, which always print).
    ResultOnly,
}

static LEVEL: AtomicU8 = AtomicU8::new(1);

pub fn set_level(level: OutputLevel) {
    let raw = match level {
        OutputLevel::Info => 0,
        OutputLevel::ResultOnly => 1,
    };
    LEVEL.store(raw, Ordering::Relaxed);
}

fn info_enabled() -> bool {
    LEVEL.load(Ordering::Relaxed) == 0
}

/// Progress chatter, shown only at `Info` level.
pub fn info(message: impl AsRef<str>) {
    if info_enabled() {
        println!("{}", message.as_ref());
    }
}

/// Announcement that a long-running step is starting, shown only at `Info`.
pub fn action(message: impl AsRef<str>) {
    if info_enabled() {
        println!("{}", message.as_ref());
    }
}

/// Command result, always shown.
pub fn result(message: impl AsRef<str>) {
    println!("{}", message.as_ref());
}

/// Error report, always shown, on stderr.
pub fn error(message: impl AsRef<str>) {
    eprintln!("{}", message.as_ref().red());
}
