// src/config/mod.rs

//! Optional TOML configuration (`Retrack.toml`).
//!
//! - [`model`] holds the raw serde model and the validated [`model::ConfigFile`].
//! - [`loader`] reads the file from disk and applies validation.
//!
//! The shape of the media tool command line is fixed and deliberately not
//! configurable here; the config only covers the tool binary override and the
//! partial-output policy.

pub mod loader;
pub mod model;

pub use loader::{default_config_path, load_and_validate, load_or_default};
pub use model::{ConfigFile, OutputSection, RawConfigFile, ToolSection};
