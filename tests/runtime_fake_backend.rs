mod common;
use crate::common::init_tracing;

use std::ffi::OsString;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tokio::time::timeout;

use retrack::engine::{CoreController, JobEvent, Runtime, RuntimeOptions};
use retrack::errors::{JobError, Result};
use retrack::exec::runner::RunPlan;
use retrack::exec::{CancelHandle, ToolBackend};
use retrack::job::{Job, Outcome};
use retrack_test_utils::builders::media_fixture;
use retrack_test_utils::fake_backend::FakeToolBackend;

fn runtime_with<B: ToolBackend + 'static>(
    event_rx: mpsc::Receiver<JobEvent>,
    backend: B,
) -> Runtime<B> {
    let core = CoreController::new(RuntimeOptions {
        exit_when_done: true,
    });
    Runtime::new(core, event_rx, backend, false)
}

#[tokio::test]
async fn happy_path_reports_success_and_spawns_the_fixed_argv() {
    init_tracing();

    let fixture = media_fixture().unwrap();
    let (tx, rx) = mpsc::channel::<JobEvent>(64);

    let backend = FakeToolBackend::new(tx.clone()).with_lines(&["a", "b"]);
    let plans = backend.recorded_plans();
    let runtime = runtime_with(rx, backend);

    tx.send(JobEvent::JobRequested {
        job: fixture.job.clone(),
    })
    .await
    .unwrap();

    let outcome = timeout(Duration::from_secs(5), runtime.run())
        .await
        .unwrap()
        .unwrap();

    match outcome {
        Outcome::Success { output_path } => {
            assert_eq!(output_path, fixture.job.output_path)
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    // Exactly one spawn, with exactly the fixed argument template.
    let plans = plans.lock().unwrap();
    assert_eq!(plans.len(), 1);

    let expected: Vec<OsString> = [
        "-i".to_string(),
        fixture.job.video_path.display().to_string(),
        "-i".to_string(),
        fixture.job.audio_path.display().to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-shortest".to_string(),
        "-y".to_string(),
        fixture.job.output_path.display().to_string(),
    ]
    .into_iter()
    .map(OsString::from)
    .collect();

    assert_eq!(plans[0].invocation.program, PathBuf::from("/fake/bin/ffmpeg"));
    assert_eq!(plans[0].invocation.args, expected);
}

#[tokio::test]
async fn failed_preflight_reports_tool_not_found_and_never_spawns() {
    init_tracing();

    let fixture = media_fixture().unwrap();
    let (tx, rx) = mpsc::channel::<JobEvent>(64);

    let backend = FakeToolBackend::new(tx.clone()).preflight_missing("ffmpeg");
    let plans = backend.recorded_plans();
    let runtime = runtime_with(rx, backend);

    tx.send(JobEvent::JobRequested {
        job: fixture.job.clone(),
    })
    .await
    .unwrap();

    let outcome = timeout(Duration::from_secs(5), runtime.run())
        .await
        .unwrap()
        .unwrap();

    match outcome {
        Outcome::Failure(JobError::ToolNotFound { tool }) => {
            assert_eq!(tool, "ffmpeg")
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    assert!(plans.lock().unwrap().is_empty(), "no process may be spawned");
}

#[tokio::test]
async fn scripted_failure_is_tool_execution_failed() {
    init_tracing();

    let fixture = media_fixture().unwrap();
    let (tx, rx) = mpsc::channel::<JobEvent>(64);

    let backend = FakeToolBackend::new(tx.clone()).failing_with(9);
    let runtime = runtime_with(rx, backend);

    tx.send(JobEvent::JobRequested {
        job: fixture.job.clone(),
    })
    .await
    .unwrap();

    let outcome = timeout(Duration::from_secs(5), runtime.run())
        .await
        .unwrap()
        .unwrap();

    match outcome {
        Outcome::Failure(JobError::ToolExecutionFailed { code, .. }) => {
            assert_eq!(code, 9)
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

/// A backend that lets the test decide when the "process" completes, so a
/// second request can arrive while the first job is provably still active.
struct ControllableBackend {
    event_tx: mpsc::Sender<JobEvent>,
    plans: Arc<Mutex<Vec<RunPlan>>>,
    release: Arc<Notify>,
}

impl ToolBackend for ControllableBackend {
    fn probe(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>> {
        let tx = self.event_tx.clone();
        Box::pin(async move {
            let _ = tx
                .send(JobEvent::PreflightPassed {
                    tool: PathBuf::from("/fake/bin/ffmpeg"),
                })
                .await;
        })
    }

    fn run_job(
        &mut self,
        plan: RunPlan,
    ) -> Pin<Box<dyn Future<Output = Result<CancelHandle>> + Send + '_>> {
        let tx = self.event_tx.clone();
        let plans = Arc::clone(&self.plans);
        let release = Arc::clone(&self.release);

        Box::pin(async move {
            {
                let mut guard = plans.lock().unwrap();
                guard.push(plan.clone());
            }

            let (handle, _cancel_rx) = CancelHandle::pair();

            tokio::spawn(async move {
                release.notified().await;
                let _ = tx
                    .send(JobEvent::Finished {
                        outcome: Outcome::Success {
                            output_path: plan.output_path.clone(),
                        },
                    })
                    .await;
            });

            Ok(handle)
        })
    }
}

#[tokio::test]
async fn second_request_while_active_is_rejected_not_interleaved() {
    init_tracing();

    let fixture = media_fixture().unwrap();
    let (tx, rx) = mpsc::channel::<JobEvent>(64);

    let plans = Arc::new(Mutex::new(Vec::new()));
    let release = Arc::new(Notify::new());
    let backend = ControllableBackend {
        event_tx: tx.clone(),
        plans: Arc::clone(&plans),
        release: Arc::clone(&release),
    };
    let runtime = runtime_with(rx, backend);
    let runtime_handle = tokio::spawn(runtime.run());

    tx.send(JobEvent::JobRequested {
        job: fixture.job.clone(),
    })
    .await
    .unwrap();

    // Wait for the first job to reach its (held-open) spawn.
    for _ in 0..100 {
        if plans.lock().unwrap().len() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(plans.lock().unwrap().len(), 1, "first job did not start");

    // A second job while the first is active: no fs validation needed here,
    // the controller must reject it before it reaches the backend.
    let second = Job {
        video_path: PathBuf::from("/elsewhere/other.mp4"),
        audio_path: PathBuf::from("/elsewhere/other.wav"),
        output_path: PathBuf::from("/elsewhere/other_X.mp4"),
    };
    tx.send(JobEvent::JobRequested { job: second }).await.unwrap();

    // Give the rejection a moment to be processed, then let job one finish.
    tokio::time::sleep(Duration::from_millis(50)).await;
    release.notify_one();

    let outcome = timeout(Duration::from_secs(5), runtime_handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    match outcome {
        Outcome::Success { output_path } => {
            assert_eq!(output_path, fixture.job.output_path)
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let plans = plans.lock().unwrap();
    assert_eq!(plans.len(), 1, "the second job must never be spawned");
    assert_eq!(
        plans[0].output_path, fixture.job.output_path,
        "the active job must be the one that ran"
    );
}
