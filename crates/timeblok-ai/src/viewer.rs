//! External calendar viewer collaborator.
//!
//! A generated script can be previewed by handing it to the `timeblok`
//! compiler binary, which opens the rendered calendar. The script is
//! written to a temporary `.tb` file that lives only for the duration of
//! the (blocking) viewer invocation.

use std::io::Write;
use std::process::Command;
use tracing::debug;

/// Name of the external viewer binary, resolved via `PATH`.
pub const VIEWER_BIN: &str = "timeblok";

/// Open `script` in the calendar viewer. Blocks until the viewer exits.
pub fn open_in_calendar(script: &str) -> Result<(), String> {
    open_with(VIEWER_BIN, script)
}

fn open_with(bin: &str, script: &str) -> Result<(), String> {
    let mut file = tempfile::Builder::new()
        .prefix("timeblok-ai-")
        .suffix(".tb")
        .tempfile()
        .map_err(|e| format!("failed to create temp file: {e}"))?;
    file.write_all(script.as_bytes())
        .map_err(|e| format!("failed to write script: {e}"))?;
    file.flush()
        .map_err(|e| format!("failed to flush script: {e}"))?;

    debug!("Opening {} in {bin}", file.path().display());

    let status = Command::new(bin)
        .arg(file.path())
        .arg("-o")
        .status()
        .map_err(|e| format!("failed to run {bin}: {e}"))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("{bin} exited with {status}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_viewer_binary_is_an_error() {
        let err = open_with("timeblok-ai-no-such-binary", "2023-4-4\n10am x\n").unwrap_err();
        assert!(err.contains("failed to run"), "got: {err}");
    }

    #[test]
    fn failing_viewer_reports_exit_status() {
        // `false` accepts any arguments and exits non-zero.
        let err = open_with("false", "2023-4-4\n10am x\n").unwrap_err();
        assert!(err.contains("exited with"), "got: {err}");
    }
}
