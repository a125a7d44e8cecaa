use dashgrab_av::actions::{Mp3Quality, MuxMode};
use dashgrab_av::ToolsConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub mux: MuxConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WorkspaceConfig {
    /// Directory for `tmp_*` files. Keeping it on the same filesystem as the
    /// destinations lets the final move be a plain rename.
    #[serde(default = "default_work_dir")]
    pub dir: PathBuf,
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            dir: default_work_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AudioConfig {
    /// LAME VBR quality for MP3 output, 0 (best) to 9.
    #[serde(default)]
    pub mp3_quality: u8,
}

impl AudioConfig {
    pub fn quality(&self) -> Option<Mp3Quality> {
        Mp3Quality::new(self.mp3_quality)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MuxConfig {
    #[serde(default)]
    pub mode: MuxMode,
}
