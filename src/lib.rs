// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod job;
pub mod logging;
pub mod reveal;

use std::path::Path;

use anyhow::{bail, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_or_default;
use crate::config::model::ConfigFile;
use crate::engine::{CoreController, JobEvent, Runtime, RuntimeOptions};
use crate::exec::invocation::build_invocation;
use crate::exec::RealToolBackend;
use crate::job::{Job, Outcome};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - job validation and output-path derivation
/// - controller core / runtime
/// - tool backend
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref())?;

    let job = Job::prepare(args.video.clone(), args.audio.clone(), args.output.clone())?;

    if args.dry_run {
        print_dry_run(&cfg, &job);
        return Ok(());
    }

    // Overwriting an existing output needs an explicit opt-in; the tool
    // itself is always run with its own confirmation suppressed.
    if job.output_exists() && !args.overwrite {
        bail!(
            "output file {} already exists; pass --overwrite to replace it",
            job.output_path.display()
        );
    }

    // Single event channel: preflight results, diagnostic lines, outcomes and
    // cancellation all funnel through it in arrival order.
    let (event_tx, event_rx) = mpsc::channel::<JobEvent>(64);

    let backend = RealToolBackend::new(event_tx.clone(), cfg.tool_path.clone());

    // Ctrl-C → best-effort cancellation of the active job.
    {
        let tx = event_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(JobEvent::CancelRequested).await;
        });
    }

    let options = RuntimeOptions {
        exit_when_done: true,
    };
    let core = CoreController::new(options);
    let runtime = Runtime::new(core, event_rx, backend, cfg.keep_partial);

    event_tx.send(JobEvent::JobRequested { job }).await?;

    match runtime.run().await? {
        Outcome::Success { output_path } => {
            info!(output = %output_path.display(), "audio replacement complete");

            if args.open {
                if let Err(e) = reveal::reveal_in_file_manager(&output_path) {
                    warn!(error = %e, "could not open the output folder");
                }
            }
            Ok(())
        }
        Outcome::Failure(err) => {
            error!(error = %err, "audio replacement failed");
            Err(err.into())
        }
    }
}

/// Simple dry-run output: print the job paths and the exact command line.
fn print_dry_run(cfg: &ConfigFile, job: &Job) {
    let invocation = build_invocation(job, Path::new(&cfg.tool_path));

    println!("retrack dry-run");
    println!("  video:  {}", job.video_path.display());
    println!("  audio:  {}", job.audio_path.display());
    println!("  output: {}", job.output_path.display());
    println!();
    println!("command: {invocation}");

    debug!("dry-run complete (no execution)");
}
