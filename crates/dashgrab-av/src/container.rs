//! Output container formats.

use std::path::Path;

/// Container formats dashgrab can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// WebM, the combined container (VP9 video + Opus audio)
    Webm,
    /// Opus in WebM/Ogg, YouTube's native audio-only format
    Opus,
    /// MPEG-1 Layer III audio, produced by transcoding
    Mp3,
}

impl Container {
    /// Get the file extension for this container, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Webm => "webm",
            Container::Opus => "opus",
            Container::Mp3 => "mp3",
        }
    }

    /// Container matching the extension of `path`, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    /// Render a set of containers as `.a, .b` for messages.
    pub fn describe(set: &[Container]) -> String {
        set.iter()
            .map(|c| format!(".{}", c.extension()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for Container {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "webm" => Ok(Container::Webm),
            "opus" => Ok(Container::Opus),
            "mp3" => Ok(Container::Mp3),
            _ => Err(format!("Unknown container format: {}", s)),
        }
    }
}
