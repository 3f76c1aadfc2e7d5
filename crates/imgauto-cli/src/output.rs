//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use imgauto_core::{Action, ConditionStatus};

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print essential machine-readable output (always prints).
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// Colored marker for a readiness status.
#[must_use]
pub fn readiness_indicator(status: ConditionStatus) -> String {
    match status {
        ConditionStatus::True => "●".green().to_string(),
        ConditionStatus::False => "●".red().to_string(),
        ConditionStatus::Unknown => "○".dimmed().to_string(),
    }
}

/// Describe what happens after a run.
#[must_use]
pub fn next_run(action: Action) -> String {
    match action {
        Action::AwaitChange => "waiting for changes before the next run".into(),
        Action::RequeueAfter(delay) => format!("next run in {}", humantime::format_duration(delay)),
    }
}
