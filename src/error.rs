//! Error types for fetch operations.

use crate::provider::ProviderError;
use std::path::PathBuf;

/// Result type alias using [`FetchError`].
pub type Result<T> = std::result::Result<T, FetchError>;

/// Kind of stream a fetch was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKind::Video => f.write_str("VP9 video"),
            StreamKind::Audio => f.write_str("Opus audio"),
        }
    }
}

/// Errors that abort a fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("parent directory of '{}' does not exist", .0.display())]
    DestinationParentMissing(PathBuf),

    #[error("'{}' already exists", .0.display())]
    DestinationExists(PathBuf),

    #[error("'{}' has invalid extension - expected one of the following: {expected}", path.display())]
    UnsupportedExtension { path: PathBuf, expected: String },

    #[error("no adaptive {kind} stream available for '{reference}'")]
    NoStreamFound { kind: StreamKind, reference: String },

    /// ffmpeg exited nonzero while converting audio to MP3.
    #[error("transcoding to MP3 failed with {status}: {stderr}")]
    Transcode { status: String, stderr: String },

    /// ffmpeg exited nonzero while combining video and audio.
    #[error("muxing video and audio failed with {status}: {stderr}")]
    Mux { status: String, stderr: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Spawning a tool or handling temp files failed.
    #[error(transparent)]
    Tool(#[from] dashgrab_av::Error),
}
