//! Muxing separate video and audio streams into WebM.

use crate::{ProcessInvoker, Result, ToolCommand, ToolOutput};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How the video and audio inputs end up in the output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MuxMode {
    /// Copy the VP9 and Opus streams as they are.
    #[default]
    Copy,
    /// Re-encode to libvpx-vp9 and libopus. Slow and memory hungry on 4K
    /// sources, but tolerates odd inputs.
    Reencode,
}

/// `ffmpeg -i <video> -i <audio> -map 0:v:0 -map 1:a:0 ... <output>`.
pub fn mux_command(
    ffmpeg: &Path,
    video: &Path,
    audio: &Path,
    output: &Path,
    mode: MuxMode,
) -> ToolCommand {
    let mut cmd = ToolCommand::new(ffmpeg);
    cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-n"])
        .arg("-i")
        .arg(video)
        .arg("-i")
        .arg(audio)
        .args(["-map", "0:v:0", "-map", "1:a:0"]);

    match mode {
        MuxMode::Copy => {
            cmd.args(["-c", "copy"]);
        }
        MuxMode::Reencode => {
            cmd.args(["-c:v", "libvpx-vp9", "-c:a", "libopus"]);
        }
    }

    cmd.arg(output);
    cmd
}

/// Combine a video-only and an audio-only file into one WebM file.
pub fn mux_webm<I: ProcessInvoker>(
    invoker: &I,
    ffmpeg: &Path,
    video: &Path,
    audio: &Path,
    output: &Path,
    mode: MuxMode,
    timeout: Option<Duration>,
) -> Result<ToolOutput> {
    tracing::info!(
        "Muxing {} + {} ({:?})",
        video.display(),
        audio.display(),
        mode
    );

    let mut cmd = mux_command(ffmpeg, video, audio, output, mode);
    cmd.timeout(timeout);
    let result = invoker.run(&cmd)?;

    if !result.success() {
        tracing::warn!("Mux failed ({}): {}", result.status_text(), result.stderr.trim());
    }

    Ok(result)
}
