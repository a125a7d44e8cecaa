//! Video-info providers: list the streams of a video and download one.

mod ytdlp;

pub use ytdlp::YtDlpProvider;

use std::path::Path;

/// Errors surfaced by a provider. They reach the caller unmodified.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider's backing tool is not installed.
    #[error("{tool} not found; is it installed and in PATH?")]
    ToolNotFound { tool: String },

    /// The provider rejected the reference or the transfer failed.
    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    /// The provider answered with something we could not read.
    #[error("failed to parse {tool} output: {message}")]
    Parse { tool: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<dashgrab_av::Error> for ProviderError {
    fn from(err: dashgrab_av::Error) -> Self {
        use dashgrab_av::Error;
        match err {
            Error::ToolNotFound { tool } => ProviderError::ToolNotFound { tool },
            Error::ToolFailed { tool, message } => ProviderError::ToolFailed { tool, message },
            Error::TimedOut { tool, timeout } => ProviderError::ToolFailed {
                tool,
                message: format!("timed out after {timeout:?}"),
            },
            Error::Io(e) => ProviderError::Io(e),
            other => ProviderError::ToolFailed {
                tool: "provider".to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Metadata of one downloadable track, as reported by a provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamDescriptor {
    /// Provider-specific identifier used to download this stream.
    pub format_id: String,
    /// Page or id the stream was listed from.
    pub source: String,
    /// e.g. `video/webm`, `audio/webm`, `video/mp4`.
    pub mime_type: String,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    /// Video-only or audio-only, as opposed to a combined stream.
    pub adaptive: bool,
    /// Frame height in pixels.
    pub resolution: Option<u32>,
    /// Frames per second, possibly fractional (29.97).
    pub fps: Option<f64>,
    /// Average bit rate in bits per second.
    pub bitrate: Option<u64>,
    pub filesize: Option<u64>,
}

impl std::fmt::Display for StreamDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.format_id, self.mime_type)?;
        if let Some(codec) = self.video_codec.as_deref().or(self.audio_codec.as_deref()) {
            write!(f, " {codec}")?;
        }
        if let Some(height) = self.resolution {
            write!(f, " {height}p")?;
        }
        if let Some(fps) = self.fps {
            write!(f, "{fps}")?;
        }
        if let Some(bitrate) = self.bitrate {
            write!(f, " {}kbps", bitrate / 1000)?;
        }
        Ok(())
    }
}

/// Capability to enumerate and fetch the streams of a video.
pub trait VideoInfoProvider {
    /// List every stream the provider knows for `reference` (URL or video id).
    fn list_streams(&self, reference: &str) -> Result<Vec<StreamDescriptor>, ProviderError>;

    /// Download `stream` to `output_dir/filename`.
    fn download(
        &self,
        stream: &StreamDescriptor,
        output_dir: &Path,
        filename: &str,
    ) -> Result<(), ProviderError>;
}

impl<T: VideoInfoProvider + ?Sized> VideoInfoProvider for &T {
    fn list_streams(&self, reference: &str) -> Result<Vec<StreamDescriptor>, ProviderError> {
        (**self).list_streams(reference)
    }

    fn download(
        &self,
        stream: &StreamDescriptor,
        output_dir: &Path,
        filename: &str,
    ) -> Result<(), ProviderError> {
        (**self).download(stream, output_dir, filename)
    }
}
