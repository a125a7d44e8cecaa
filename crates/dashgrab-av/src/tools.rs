//! External tool detection and management.
//!
//! The [`ToolRegistry`] discovers and caches the locations of the external
//! CLI tools dashgrab drives (ffmpeg and yt-dlp).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

pub const FFMPEG: &str = "ffmpeg";
pub const YT_DLP: &str = "yt-dlp";

/// Known tool names that the registry manages.
const KNOWN_TOOLS: &[&str] = &[FFMPEG, YT_DLP];

/// Tool overrides, usually read from the `[tools]` config section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Explicit ffmpeg executable; falls back to `PATH` when unset or missing.
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Explicit yt-dlp executable; falls back to `PATH` when unset or missing.
    #[serde(default)]
    pub yt_dlp_path: Option<PathBuf>,

    /// Kill any external process running longer than this. Unset means wait
    /// forever.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ToolsConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn custom_path(&self, name: &str) -> Option<&Path> {
        match name {
            FFMPEG => self.ffmpeg_path.as_deref(),
            YT_DLP => self.yt_dlp_path.as_deref(),
            _ => None,
        }
    }
}

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Registry holding discovered tool paths.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, PathBuf>,
}

impl ToolRegistry {
    /// Discover tools, preferring configured paths that exist over a `PATH`
    /// lookup. Tools that are not found are omitted from the registry.
    pub fn discover(config: &ToolsConfig) -> Self {
        let mut tools = HashMap::new();

        for &name in KNOWN_TOOLS {
            match get_tool_path(name, config.custom_path(name)) {
                Ok(path) => {
                    tracing::debug!("Found {} at {}", name, path.display());
                    tools.insert(name.to_string(), path);
                }
                Err(_) => tracing::debug!("{} not found", name),
            }
        }

        Self { tools }
    }

    /// Path of a discovered tool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotFound`] if the tool was not found during discovery.
    pub fn require(&self, name: &str) -> Result<&Path> {
        self.tools
            .get(name)
            .map(PathBuf::as_path)
            .ok_or_else(|| Error::tool_not_found(name))
    }

    /// Check all known tools and return availability information.
    pub fn check_all(&self) -> Vec<ToolInfo> {
        KNOWN_TOOLS
            .iter()
            .map(|&name| match self.tools.get(name) {
                Some(path) => ToolInfo {
                    name: name.to_string(),
                    available: true,
                    version: detect_version(name, path),
                    path: Some(path.clone()),
                },
                None => ToolInfo {
                    name: name.to_string(),
                    available: false,
                    version: None,
                    path: None,
                },
            })
            .collect()
    }
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!(
            "Configured {} path {} does not exist, searching PATH",
            name,
            path.display()
        );
    }

    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Run `<tool> --version` (`-version` for ffmpeg) and return the first line
/// of stdout.
fn detect_version(name: &str, path: &Path) -> Option<String> {
    let version_arg = match name {
        FFMPEG => "-version",
        _ => "--version",
    };

    let output = Command::new(path).arg(version_arg).output().ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.to_string())
}
