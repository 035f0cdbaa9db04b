// src/exec/preflight.rs

//! Tool preflight: verify the external media tool is invocable before the
//! real job process is spawned.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tracing::debug;

use crate::errors::JobError;

/// Resolve the tool binary on the search path.
///
/// Absolute or relative paths are checked directly; bare names are looked up
/// on `PATH`.
pub fn resolve_tool(program: &str) -> Result<PathBuf, JobError> {
    which::which(program).map_err(|_| JobError::ToolNotFound {
        tool: program.to_string(),
    })
}

/// Run the tool with its version flag and require a clean exit.
///
/// Blocking by design; callers go through [`probe`] to keep the event loop
/// responsive.
fn version_probe(path: &Path) -> Result<(), JobError> {
    let not_found = || JobError::ToolNotFound {
        tool: path.display().to_string(),
    };

    let status = std::process::Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|_| not_found())?;

    if status.success() {
        debug!(tool = %path.display(), "tool preflight passed");
        Ok(())
    } else {
        Err(not_found())
    }
}

/// Full preflight check: resolve the binary, then probe its version flag.
///
/// Returns the resolved path, which the runner uses verbatim so that the
/// spawned process matches what was probed.
pub async fn probe(program: &str) -> Result<PathBuf, JobError> {
    let program = program.to_owned();

    tokio::task::spawn_blocking(move || {
        let path = resolve_tool(&program)?;
        version_probe(&path)?;
        Ok(path)
    })
    .await
    .map_err(|err| JobError::Unexpected(io::Error::other(err)))?
}
