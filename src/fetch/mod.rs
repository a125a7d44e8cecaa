//! Fetch orchestration: pick streams, download, post-process, move into place.

pub mod select;
mod target;

pub use target::DownloadTarget;

use crate::error::{FetchError, Result, StreamKind};
use crate::provider::{StreamDescriptor, VideoInfoProvider};
use dashgrab_av::actions::{mux_webm, transcode_to_mp3, Mp3Quality, MuxMode};
use dashgrab_av::{workspace, Container, ProcessInvoker, TempArtifact, ToolOutput};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Extensions `fetch_video` and `fetch_combined` write.
pub const VIDEO_TARGETS: &[Container] = &[Container::Webm];
/// Extensions `fetch_audio` writes.
pub const AUDIO_TARGETS: &[Container] = &[Container::Opus, Container::Mp3];

/// Knobs of a [`MediaFetcher`].
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Where `tmp_*` artifacts are created.
    pub work_dir: PathBuf,
    /// ffmpeg executable, only run for MP3 output and muxing.
    pub ffmpeg: PathBuf,
    pub mp3_quality: Mp3Quality,
    pub mux_mode: MuxMode,
    /// Per-process limit for ffmpeg. `None` waits as long as it takes.
    pub timeout: Option<Duration>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            ffmpeg: PathBuf::from("ffmpeg"),
            mp3_quality: Mp3Quality::default(),
            mux_mode: MuxMode::default(),
            timeout: None,
        }
    }
}

/// Downloads the best streams of a video into a single local file.
///
/// Every operation validates its destination before talking to the provider,
/// owns the temp artifacts it creates, and writes the destination only in its
/// final step. Nothing is retried.
pub struct MediaFetcher<P, I> {
    provider: P,
    invoker: I,
    settings: FetchSettings,
}

impl<P: VideoInfoProvider, I: ProcessInvoker> MediaFetcher<P, I> {
    pub fn new(provider: P, invoker: I, settings: FetchSettings) -> Self {
        Self {
            provider,
            invoker,
            settings,
        }
    }

    /// Save the best VP9 video-only stream as a `.webm` file.
    pub fn fetch_video(&self, reference: &str, destination: &Path) -> Result<PathBuf> {
        let target = DownloadTarget::validate(destination, VIDEO_TARGETS)?;
        let stamp = workspace::timestamp();

        let streams = self.list_streams(reference)?;
        let stream = pick(select::best_video(&streams), StreamKind::Video, reference)?;

        let video = self.download(stream, "video", &stamp, Container::Webm)?;
        let path = video.persist(target.path())?;

        tracing::info!("Saved video to {}", path.display());
        Ok(path)
    }

    /// Save the best Opus stream as `.opus`, or transcode it for `.mp3`.
    pub fn fetch_audio(&self, reference: &str, destination: &Path) -> Result<PathBuf> {
        let target = DownloadTarget::validate(destination, AUDIO_TARGETS)?;
        let stamp = workspace::timestamp();

        let streams = self.list_streams(reference)?;
        let stream = pick(select::best_audio(&streams), StreamKind::Audio, reference)?;

        let audio = self.download(stream, "audio", &stamp, Container::Opus)?;

        let path = match target.container() {
            Container::Mp3 => {
                let output = self.reserve("output", &stamp, Container::Mp3)?;
                let result = transcode_to_mp3(
                    &self.invoker,
                    &self.settings.ffmpeg,
                    audio.path(),
                    output.path(),
                    self.settings.mp3_quality,
                    self.settings.timeout,
                )?;
                check_exit(&result, |status, stderr| FetchError::Transcode { status, stderr })?;
                output.persist(target.path())?
            }
            _ => audio.persist(target.path())?,
        };

        tracing::info!("Saved audio to {}", path.display());
        Ok(path)
    }

    /// Download the best video and audio and mux them into one `.webm` file.
    pub fn fetch_combined(&self, reference: &str, destination: &Path) -> Result<PathBuf> {
        let target = DownloadTarget::validate(destination, VIDEO_TARGETS)?;
        // One stamp for every artifact of this call keeps them easy to match up.
        let stamp = workspace::timestamp();

        let streams = self.list_streams(reference)?;
        let video_stream = pick(select::best_video(&streams), StreamKind::Video, reference)?;
        let audio_stream = pick(select::best_audio(&streams), StreamKind::Audio, reference)?;

        let video = self.download(video_stream, "video", &stamp, Container::Webm)?;
        let audio = self.download(audio_stream, "audio", &stamp, Container::Opus)?;

        let output = self.reserve("output", &stamp, Container::Webm)?;
        let result = mux_webm(
            &self.invoker,
            &self.settings.ffmpeg,
            video.path(),
            audio.path(),
            output.path(),
            self.settings.mux_mode,
            self.settings.timeout,
        )?;
        check_exit(&result, |status, stderr| FetchError::Mux { status, stderr })?;

        let path = output.persist(target.path())?;
        tracing::info!("Saved video with audio to {}", path.display());
        Ok(path)
    }

    fn list_streams(&self, reference: &str) -> Result<Vec<StreamDescriptor>> {
        tracing::info!("Resolving streams for {}", reference);
        Ok(self.provider.list_streams(reference)?)
    }

    fn reserve(&self, kind: &str, stamp: &str, container: Container) -> Result<TempArtifact> {
        Ok(TempArtifact::new(&self.settings.work_dir, kind, stamp, container)?)
    }

    /// Download `stream` into a fresh artifact. A failed download drops the
    /// artifact, which removes whatever was written so far.
    fn download(
        &self,
        stream: &StreamDescriptor,
        kind: &str,
        stamp: &str,
        container: Container,
    ) -> Result<TempArtifact> {
        let artifact = self.reserve(kind, stamp, container)?;
        self.provider
            .download(stream, artifact.dir(), &artifact.file_name())?;
        Ok(artifact)
    }
}

fn pick<'a>(
    stream: Option<&'a StreamDescriptor>,
    kind: StreamKind,
    reference: &str,
) -> Result<&'a StreamDescriptor> {
    let stream = stream.ok_or_else(|| FetchError::NoStreamFound {
        kind,
        reference: reference.to_string(),
    })?;
    tracing::info!("Selected {} stream {}", kind, stream);
    Ok(stream)
}

fn check_exit(
    result: &ToolOutput,
    err: impl FnOnce(String, String) -> FetchError,
) -> Result<()> {
    if result.success() {
        Ok(())
    } else {
        Err(err(result.status_text(), result.stderr.trim().to_string()))
    }
}
