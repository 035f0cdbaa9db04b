#![cfg(unix)]

mod common;
use crate::common::init_tracing;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use retrack::engine::JobEvent;
use retrack::errors::JobError;
use retrack::exec::invocation::build_invocation;
use retrack::exec::runner::RunPlan;
use retrack::exec::{RealToolBackend, ToolBackend};
use retrack::job::Outcome;
use retrack_test_utils::builders::media_fixture;
use retrack_test_utils::fake_tool::{hanging_tool, stderr_lines_tool};

#[tokio::test]
async fn cancel_resolves_the_run_within_bounded_time() {
    init_tracing();

    let fixture = media_fixture().unwrap();
    let tool = hanging_tool().unwrap();

    let (tx, mut rx) = mpsc::channel::<JobEvent>(64);
    let mut backend =
        RealToolBackend::new(tx.clone(), tool.path.display().to_string());

    let plan = RunPlan {
        invocation: build_invocation(&fixture.job, &tool.path),
        output_path: fixture.job.output_path.clone(),
        keep_partial: false,
    };

    let mut handle = backend.run_job(plan).await.unwrap();

    // The tool announces itself before blocking; once the line arrives the
    // process is definitely alive.
    match timeout(Duration::from_secs(10), rx.recv()).await.unwrap() {
        Some(JobEvent::Diagnostic { line }) => assert_eq!(line, "started"),
        other => panic!("unexpected event: {other:?}"),
    }

    assert!(handle.cancel());

    // The run must still resolve, and promptly, despite the 30s sleep.
    match timeout(Duration::from_secs(5), rx.recv()).await.unwrap() {
        Some(JobEvent::Finished {
            outcome: Outcome::Failure(JobError::Cancelled),
        }) => {}
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn cancel_after_completion_is_a_noop() {
    init_tracing();

    let fixture = media_fixture().unwrap();
    let tool = stderr_lines_tool(&["done"], 0).unwrap();

    let (tx, mut rx) = mpsc::channel::<JobEvent>(64);
    let mut backend =
        RealToolBackend::new(tx.clone(), tool.path.display().to_string());

    let plan = RunPlan {
        invocation: build_invocation(&fixture.job, &tool.path),
        output_path: fixture.job.output_path.clone(),
        keep_partial: false,
    };

    let mut handle = backend.run_job(plan).await.unwrap();

    // Wait for the run to resolve first.
    loop {
        match timeout(Duration::from_secs(10), rx.recv()).await.unwrap() {
            Some(JobEvent::Finished { outcome }) => {
                assert!(outcome.is_success());
                break;
            }
            Some(JobEvent::Diagnostic { .. }) => continue,
            other => panic!("unexpected event: {other:?}"),
        }
    }

    // The runner is gone; firing the handle must report that nothing was
    // signalled rather than hanging or panicking.
    assert!(!handle.cancel());
}

#[tokio::test]
async fn double_cancel_only_signals_once() {
    init_tracing();

    let fixture = media_fixture().unwrap();
    let tool = hanging_tool().unwrap();

    let (tx, mut rx) = mpsc::channel::<JobEvent>(64);
    let mut backend =
        RealToolBackend::new(tx.clone(), tool.path.display().to_string());

    let plan = RunPlan {
        invocation: build_invocation(&fixture.job, &tool.path),
        output_path: fixture.job.output_path.clone(),
        keep_partial: false,
    };

    let mut handle = backend.run_job(plan).await.unwrap();

    match timeout(Duration::from_secs(10), rx.recv()).await.unwrap() {
        Some(JobEvent::Diagnostic { line }) => assert_eq!(line, "started"),
        other => panic!("unexpected event: {other:?}"),
    }

    assert!(handle.cancel());
    assert!(!handle.cancel());

    match timeout(Duration::from_secs(5), rx.recv()).await.unwrap() {
        Some(JobEvent::Finished {
            outcome: Outcome::Failure(JobError::Cancelled),
        }) => {}
        other => panic!("unexpected event: {other:?}"),
    }
}
