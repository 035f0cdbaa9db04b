// src/reveal.rs

//! Platform "reveal in file manager" helper, used only after a successful
//! run when the user asked for it.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

/// The platform file-manager opener.
pub fn opener_program() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(windows) {
        "explorer"
    } else {
        "xdg-open"
    }
}

/// Open the folder containing `path` in the system file manager.
///
/// Fire-and-forget: the opener is spawned detached and never waited on.
pub fn reveal_in_file_manager(path: &Path) -> std::io::Result<()> {
    let folder = path.parent().unwrap_or_else(|| Path::new("."));

    debug!(folder = %folder.display(), opener = opener_program(), "revealing output folder");

    Command::new(opener_program())
        .arg(folder)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}
