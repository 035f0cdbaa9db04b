// src/exec/invocation.rs

//! Construction of the media tool command line.
//!
//! The shape is fixed and not user-configurable: two inputs, video stream
//! copied without re-encoding, video taken from the first input and audio
//! from the second, duration truncated to the shorter input, destination
//! overwritten without interactive confirmation.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::job::Job;

/// A fully assembled tool command line: program plus argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Build the invocation for one job.
///
/// Exactly this argument template, with the three job paths substituted;
/// no other flags appear.
pub fn build_invocation(job: &Job, tool: &Path) -> ToolInvocation {
    let args: Vec<OsString> = vec![
        "-i".into(),
        job.video_path.clone().into_os_string(),
        "-i".into(),
        job.audio_path.clone().into_os_string(),
        "-c:v".into(),
        "copy".into(),
        "-map".into(),
        "0:v:0".into(),
        "-map".into(),
        "1:a:0".into(),
        "-shortest".into(),
        "-y".into(),
        job.output_path.clone().into_os_string(),
    ];

    ToolInvocation {
        program: tool.to_path_buf(),
        args,
    }
}
