//! Audio transcoding to MP3.

use crate::{ProcessInvoker, Result, ToolCommand, ToolOutput};
use std::path::Path;
use std::time::Duration;

/// LAME variable bit rate quality, 0 (best) through 9 (smallest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mp3Quality(u8);

impl Mp3Quality {
    pub const BEST: Mp3Quality = Mp3Quality(0);
    pub const WORST: Mp3Quality = Mp3Quality(9);

    /// Quality level, or `None` when outside 0..=9.
    pub fn new(level: u8) -> Option<Self> {
        (level <= Self::WORST.0).then_some(Self(level))
    }

    pub fn level(&self) -> u8 {
        self.0
    }
}

impl Default for Mp3Quality {
    fn default() -> Self {
        Self::BEST
    }
}

/// `ffmpeg -i <input> -c:a libmp3lame -q:a <quality> <output>`.
pub fn mp3_command(ffmpeg: &Path, input: &Path, output: &Path, quality: Mp3Quality) -> ToolCommand {
    let mut cmd = ToolCommand::new(ffmpeg);
    cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-n"])
        .arg("-i")
        .arg(input)
        .args(["-vn", "-c:a", "libmp3lame", "-q:a"])
        .arg(quality.level().to_string())
        .arg(output);
    cmd
}

/// Transcode an audio file to MP3 with ffmpeg.
pub fn transcode_to_mp3<I: ProcessInvoker>(
    invoker: &I,
    ffmpeg: &Path,
    input: &Path,
    output: &Path,
    quality: Mp3Quality,
    timeout: Option<Duration>,
) -> Result<ToolOutput> {
    tracing::info!(
        "Transcoding {} to MP3 (quality {})",
        input.display(),
        quality.level()
    );

    let mut cmd = mp3_command(ffmpeg, input, output, quality);
    cmd.timeout(timeout);
    let result = invoker.run(&cmd)?;

    if !result.success() {
        tracing::warn!("MP3 transcode failed ({}): {}", result.status_text(), result.stderr.trim());
    }

    Ok(result)
}
