#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use retrack::job::Job;

/// A prepared job backed by real temporary media files.
///
/// The directory handle must stay alive for as long as the job's paths are
/// used; dropping it deletes the files.
pub struct JobFixture {
    pub dir: TempDir,
    pub job: Job,
}

impl JobFixture {
    /// Path inside the fixture directory (for extra files a test needs).
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Create a scratch directory with a small video and audio file and a job
/// prepared from them.
pub fn media_fixture() -> anyhow::Result<JobFixture> {
    let dir = tempfile::tempdir()?;

    let video = dir.path().join("clip.mp4");
    fs::write(&video, b"\x00\x00\x00 ftypisom-fixture")?;

    let audio = dir.path().join("voice.wav");
    fs::write(&audio, b"RIFF-fixture")?;

    let job = Job::prepare(video, audio, None)?;

    Ok(JobFixture { dir, job })
}
