// src/exec/mod.rs

//! Process orchestration layer.
//!
//! This module is responsible for actually running the external media tool,
//! using `tokio::process::Command`, and reporting back to the controller
//! runtime via `JobEvent`s.
//!
//! - [`invocation`] constructs the fixed tool command line for a job.
//! - [`preflight`] verifies the tool is resolvable and invocable before a
//!   job is spawned.
//! - [`runner`] handles the single tool process of one job: spawn, relay the
//!   diagnostic stream line-by-line, wait, classify the outcome.
//! - [`backend`] provides the `ToolBackend` trait and a concrete
//!   `RealToolBackend` that the runtime uses in production, and which tests
//!   can replace with a fake implementation.

pub mod backend;
pub mod invocation;
pub mod preflight;
pub mod runner;

pub use backend::{CancelHandle, RealToolBackend, ToolBackend};
pub use invocation::{ToolInvocation, build_invocation};
pub use runner::RunPlan;
