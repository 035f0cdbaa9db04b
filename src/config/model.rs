// src/config/model.rs

use serde::Deserialize;

use crate::errors::RetrackError;

/// Top-level configuration as read from a TOML file:
///
/// ```toml
/// [tool]
/// path = "ffmpeg"
///
/// [output]
/// keep_partial = false
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Media tool settings from `[tool]`.
    #[serde(default)]
    pub tool: ToolSection,

    /// Output handling from `[output]`.
    #[serde(default)]
    pub output: OutputSection,
}

impl Default for RawConfigFile {
    fn default() -> Self {
        Self {
            tool: ToolSection::default(),
            output: OutputSection::default(),
        }
    }
}

/// `[tool]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolSection {
    /// Binary name or path of the external media tool.
    ///
    /// Resolved against `PATH` during preflight when not absolute.
    #[serde(default = "default_tool_path")]
    pub path: String,
}

fn default_tool_path() -> String {
    "ffmpeg".to_string()
}

impl Default for ToolSection {
    fn default() -> Self {
        Self {
            path: default_tool_path(),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputSection {
    /// Keep a truncated output file left behind by a failed or cancelled run.
    ///
    /// The default is to delete it, but only when the file did not exist
    /// before the run started.
    #[serde(default)]
    pub keep_partial: bool,
}

/// Validated configuration used by the rest of the application.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub tool_path: String,
    pub keep_partial: bool,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            tool_path: default_tool_path(),
            keep_partial: false,
        }
    }
}

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = RetrackError;

    fn try_from(raw: RawConfigFile) -> Result<Self, Self::Error> {
        let tool_path = raw.tool.path.trim().to_string();
        if tool_path.is_empty() {
            return Err(RetrackError::ConfigError(
                "tool.path must not be empty".to_string(),
            ));
        }

        Ok(Self {
            tool_path,
            keep_partial: raw.output.keep_partial,
        })
    }
}
