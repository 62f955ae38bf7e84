//! Open a folder in the platform's file browser.

use std::path::Path;

/// Command used to open folders on this platform
pub fn opener_command() -> &'static str {
    if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

/// Returns whether the folder was handed to the file browser. Never fails.
pub fn open_folder(path: &Path) -> bool {
    if !path.is_dir() {
        tracing::warn!("[Opener] Not a directory: {}", path.display());
        return false;
    }

    let program = opener_command();
    let mut expression = duct::cmd(program, [path.as_os_str()])
        .stdout_null()
        .stderr_null();

    // explorer.exe exits with 1 even when it opened the window
    if cfg!(target_os = "windows") {
        expression = expression.unchecked();
    }

    match expression.run() {
        Ok(_) => {
            tracing::info!("[Opener] Opened {}", path.display());
            true
        }
        Err(e) => {
            tracing::warn!(
                "[Opener] Could not open {} with {}: {}",
                path.display(),
                program,
                e
            );
            false
        }
    }
}
