//! Error types for dashgrab-av.

use std::path::PathBuf;
use std::time::Duration;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving external tools or temp artifacts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool is not available.
    #[error("tool not found: {tool}; is it installed and in PATH?")]
    ToolNotFound { tool: String },

    /// An external tool could not be run or reported a failure.
    #[error("tool execution failed: {tool}: {message}")]
    ToolFailed { tool: String, message: String },

    /// An external tool ran past its configured timeout and was killed.
    #[error("{tool} timed out after {timeout:?}")]
    TimedOut { tool: String, timeout: Duration },

    /// A temp artifact path was already taken by a file we did not create.
    #[error("temporary file already exists: {}", path.display())]
    ArtifactExists { path: PathBuf },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool execution failed error.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
