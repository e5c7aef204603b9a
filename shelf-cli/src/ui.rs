//! Progress feedback for the shelf CLI
//!
//! Spinners are suppressed when:
//! - `--quiet` flag is passed
//! - `SHELF_QUIET=1` environment variable is set
//! - stderr is not a TTY (piped output)

use std::io::IsTerminal;
use std::sync::OnceLock;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Global quiet mode state
static QUIET_MODE: OnceLock<bool> = OnceLock::new();

pub const QUIET_ENV: &str = "SHELF_QUIET";

/// Initialize quiet mode from flags and environment
///
/// Call this once at startup with the --quiet flag value.
pub fn init_quiet_mode(quiet_flag: bool) {
    let is_quiet = quiet_flag
        || std::env::var(QUIET_ENV).map(|v| v == "1").unwrap_or(false)
        || !std::io::stderr().is_terminal();

    QUIET_MODE.set(is_quiet).ok();
}

pub fn is_quiet() -> bool {
    *QUIET_MODE.get().unwrap_or(&false)
}

fn message_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Create a spinner that respects quiet mode
pub fn spinner(msg: impl Into<String>) -> Option<ProgressBar> {
    if is_quiet() {
        return None;
    }

    let style = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());

    let pb = ProgressBar::new_spinner();
    pb.set_style(style);
    pb.set_message(msg.into());
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}

pub fn finish_success(pb: Option<ProgressBar>, msg: impl Into<String>) {
    if let Some(pb) = pb {
        pb.set_style(message_style());
        pb.finish_with_message(format!("✓ {}", msg.into()));
    }
}

pub fn finish_error(pb: Option<ProgressBar>, msg: impl Into<String>) {
    if let Some(pb) = pb {
        pb.set_style(message_style());
        pb.finish_with_message(format!("✗ {}", msg.into()));
    }
}

/// Run an operation with a spinner, handling success/error automatically
///
/// In quiet mode, just runs the operation silently.
pub fn with_spinner<T, E: std::fmt::Display>(
    msg: impl Into<String>,
    success_msg: impl FnOnce(&T) -> String,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    let msg = msg.into();
    let pb = spinner(&msg);

    match f() {
        Ok(result) => {
            finish_success(pb, success_msg(&result));
            Ok(result)
        }
        Err(e) => {
            finish_error(pb, format!("{}: {}", msg, e));
            Err(e)
        }
    }
}
