// src/job.rs

//! Job model: the three resolved paths of one audio-replacement request,
//! plus output-path derivation.

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::errors::JobError;

/// Suffix inserted into the video file stem to form the default output name.
pub const OUTPUT_SUFFIX: &str = "_X";

/// One audio-replacement request. Immutable once processing starts and
/// discarded after the terminal outcome; there is no persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub video_path: PathBuf,
    pub audio_path: PathBuf,
    pub output_path: PathBuf,
}

impl Job {
    /// Validate the two source files and fix the output path.
    ///
    /// Both inputs must exist and be regular readable files; anything else is
    /// [`JobError::InvalidInput`], raised before the tool preflight and before
    /// any process is spawned. `output_override` replaces the derived
    /// `{stem}_X{ext}` path when given.
    pub fn prepare(
        video_path: PathBuf,
        audio_path: PathBuf,
        output_override: Option<PathBuf>,
    ) -> Result<Self, JobError> {
        ensure_readable_file(&video_path)?;
        ensure_readable_file(&audio_path)?;

        let output_path =
            output_override.unwrap_or_else(|| derive_output_path(&video_path));

        Ok(Self {
            video_path,
            audio_path,
            output_path,
        })
    }

    /// Whether the output path collides with an existing file. Overwriting
    /// requires explicit caller confirmation before the job is run.
    pub fn output_exists(&self) -> bool {
        self.output_path.exists()
    }
}

/// Terminal result of a job.
#[derive(Debug)]
pub enum Outcome {
    Success { output_path: PathBuf },
    Failure(JobError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Derive the default output path from the video path: insert
/// [`OUTPUT_SUFFIX`] into the file stem, keeping the parent directory and
/// extension. `/x/clip.mp4` becomes `/x/clip_X.mp4`; an extensionless input
/// gets the bare suffix.
pub fn derive_output_path(video_path: &Path) -> PathBuf {
    let stem = video_path.file_stem().unwrap_or_default();

    let mut file_name = OsString::from(stem);
    file_name.push(OUTPUT_SUFFIX);
    if let Some(ext) = video_path.extension() {
        file_name.push(".");
        file_name.push(ext);
    }

    video_path.with_file_name(file_name)
}

fn ensure_readable_file(path: &Path) -> Result<(), JobError> {
    let invalid = || JobError::InvalidInput {
        path: path.to_path_buf(),
    };

    let meta = std::fs::metadata(path).map_err(|_| invalid())?;
    if !meta.is_file() {
        return Err(invalid());
    }
    // Existence alone is not enough; the tool needs read access.
    File::open(path).map_err(|_| invalid())?;
    Ok(())
}
