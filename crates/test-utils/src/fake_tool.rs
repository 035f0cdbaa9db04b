//! Shell-script stand-ins for the external media tool (unix only).

use std::path::PathBuf;

use tempfile::TempDir;

/// A fake tool on disk. The directory handle keeps the script alive.
pub struct FakeTool {
    pub dir: TempDir,
    pub path: PathBuf,
}

/// Write an executable `/bin/sh` script with the given body.
///
/// Every script answers a `-version` probe with a clean exit, so the fakes
/// also pass preflight when a test routes through it.
pub fn fake_tool(body: &str) -> anyhow::Result<FakeTool> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("fake-tool");

    let script = format!(
        "#!/bin/sh\nif [ \"$1\" = \"-version\" ]; then exit 0; fi\n{body}\n"
    );
    std::fs::write(&path, script)?;

    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;

    Ok(FakeTool { dir, path })
}

/// A tool that emits the given lines on its diagnostic stream, then exits
/// with `exit_code`.
pub fn stderr_lines_tool(lines: &[&str], exit_code: i32) -> anyhow::Result<FakeTool> {
    let mut body = String::new();
    for line in lines {
        body.push_str(&format!("echo '{line}' >&2\n"));
    }
    body.push_str(&format!("exit {exit_code}\n"));
    fake_tool(&body)
}

/// A tool that announces itself and then blocks until killed.
///
/// `exec` so the kill signal lands on the sleeper itself, not a wrapping
/// shell.
pub fn hanging_tool() -> anyhow::Result<FakeTool> {
    fake_tool("echo 'started' >&2\nexec sleep 30\n")
}
