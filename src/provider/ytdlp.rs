//! yt-dlp backed video-info provider.

use super::{ProviderError, StreamDescriptor, VideoInfoProvider};
use dashgrab_av::{ProcessInvoker, SystemInvoker, ToolCommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const TOOL: &str = "yt-dlp";

#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    webpage_url: Option<String>,
    #[serde(default)]
    formats: Vec<YtDlpFormat>,
}

#[derive(Debug, Deserialize)]
struct YtDlpFormat {
    format_id: String,
    ext: String,
    vcodec: Option<String>,
    acodec: Option<String>,
    height: Option<u32>,
    fps: Option<f64>,
    /// Audio bit rate in kbit/s.
    abr: Option<f64>,
    /// Total bit rate in kbit/s.
    tbr: Option<f64>,
    filesize: Option<u64>,
    filesize_approx: Option<u64>,
}

/// Lists and downloads streams by running yt-dlp.
#[derive(Debug, Clone)]
pub struct YtDlpProvider<I = SystemInvoker> {
    program: PathBuf,
    invoker: I,
    timeout: Option<Duration>,
}

impl YtDlpProvider<SystemInvoker> {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_invoker(program, SystemInvoker)
    }
}

impl<I: ProcessInvoker> YtDlpProvider<I> {
    pub fn with_invoker(program: impl Into<PathBuf>, invoker: I) -> Self {
        Self {
            program: program.into(),
            invoker,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn run(&self, cmd: &mut ToolCommand) -> Result<String, ProviderError> {
        cmd.timeout(self.timeout);
        let output = self.invoker.run(cmd)?;

        if !output.success() {
            return Err(ProviderError::ToolFailed {
                tool: TOOL.to_string(),
                message: format!("{}: {}", output.status_text(), output.stderr.trim()),
            });
        }

        Ok(output.stdout)
    }
}

impl<I: ProcessInvoker> VideoInfoProvider for YtDlpProvider<I> {
    fn list_streams(&self, reference: &str) -> Result<Vec<StreamDescriptor>, ProviderError> {
        tracing::debug!("Listing streams of {}", reference);

        let mut cmd = ToolCommand::new(&self.program);
        cmd.args(["--dump-single-json", "--no-playlist", "--no-warnings"])
            .arg("--")
            .arg(reference);

        let json = self.run(&mut cmd)?;
        let streams = parse_streams(reference, &json)?;

        tracing::debug!("{} lists {} streams", reference, streams.len());
        Ok(streams)
    }

    fn download(
        &self,
        stream: &StreamDescriptor,
        output_dir: &Path,
        filename: &str,
    ) -> Result<(), ProviderError> {
        let target = output_dir.join(filename);
        tracing::info!("Downloading {} to {}", stream, target.display());

        let mut cmd = ToolCommand::new(&self.program);
        cmd.arg("-f")
            .arg(&stream.format_id)
            .args(["--no-playlist", "--no-part", "--no-progress", "--no-warnings"])
            .arg("-o")
            .arg(escape_template(&target))
            .arg("--")
            .arg(&stream.source);

        self.run(&mut cmd)?;
        Ok(())
    }
}

/// Map yt-dlp's `--dump-single-json` output to stream descriptors.
fn parse_streams(reference: &str, json: &str) -> Result<Vec<StreamDescriptor>, ProviderError> {
    let info: YtDlpInfo = serde_json::from_str(json).map_err(|e| ProviderError::Parse {
        tool: TOOL.to_string(),
        message: e.to_string(),
    })?;

    tracing::debug!(
        "Resolved {} ({})",
        info.title.as_deref().unwrap_or("untitled"),
        info.id.as_deref().unwrap_or("no id")
    );

    let source = info.webpage_url.unwrap_or_else(|| reference.to_string());

    Ok(info
        .formats
        .into_iter()
        .filter_map(|format| descriptor_from_format(&source, format))
        .collect())
}

fn descriptor_from_format(source: &str, format: YtDlpFormat) -> Option<StreamDescriptor> {
    let video_codec = present_codec(format.vcodec);
    let audio_codec = present_codec(format.acodec);

    // Storyboards and the like carry neither track.
    let kind = match (&video_codec, &audio_codec) {
        (None, None) => return None,
        (Some(_), _) => "video",
        (None, Some(_)) => "audio",
    };

    let bitrate = format
        .abr
        .or(if video_codec.is_none() { format.tbr } else { None })
        .map(|kbps| (kbps * 1000.0).round() as u64);

    Some(StreamDescriptor {
        format_id: format.format_id,
        source: source.to_string(),
        mime_type: format!("{}/{}", kind, format.ext),
        adaptive: video_codec.is_some() != audio_codec.is_some(),
        video_codec,
        audio_codec,
        resolution: format.height,
        fps: format.fps,
        bitrate,
        filesize: format.filesize.or(format.filesize_approx),
    })
}

/// yt-dlp spells an absent track as `"none"`.
fn present_codec(codec: Option<String>) -> Option<String> {
    codec.filter(|c| !c.is_empty() && c != "none")
}

/// `-o` takes an output template; keep literal `%` out of its hands.
fn escape_template(path: &Path) -> String {
    path.to_string_lossy().replace('%', "%%")
}
