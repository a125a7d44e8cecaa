//! Shared test harness for fetch integration tests.
//!
//! Provides a [`StubProvider`] serving a canned stream list and writing fake
//! stream data on download, and a [`FakeInvoker`] standing in for ffmpeg.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use dashgrab::{FetchSettings, MediaFetcher, ProviderError, StreamDescriptor, VideoInfoProvider};
use dashgrab_av::{ProcessInvoker, ToolCommand, ToolOutput};
use tempfile::TempDir;

pub const REFERENCE: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// Adaptive VP9 WebM video stream.
pub fn vp9(id: &str, height: u32, fps: f64) -> StreamDescriptor {
    StreamDescriptor {
        format_id: id.to_string(),
        mime_type: "video/webm".to_string(),
        video_codec: Some("vp9".to_string()),
        adaptive: true,
        resolution: Some(height),
        fps: Some(fps),
        ..Default::default()
    }
}

/// Adaptive Opus WebM audio stream.
pub fn opus(id: &str, kbps: u64) -> StreamDescriptor {
    StreamDescriptor {
        format_id: id.to_string(),
        mime_type: "audio/webm".to_string(),
        audio_codec: Some("opus".to_string()),
        adaptive: true,
        bitrate: Some(kbps * 1000),
        ..Default::default()
    }
}

/// A stream list shaped like a typical YouTube video.
pub fn typical_streams() -> Vec<StreamDescriptor> {
    vec![
        StreamDescriptor {
            format_id: "18".to_string(),
            mime_type: "video/mp4".to_string(),
            video_codec: Some("avc1.42001E".to_string()),
            audio_codec: Some("mp4a.40.2".to_string()),
            adaptive: false,
            resolution: Some(360),
            fps: Some(30.0),
            ..Default::default()
        },
        StreamDescriptor {
            format_id: "299".to_string(),
            mime_type: "video/mp4".to_string(),
            video_codec: Some("avc1.64002a".to_string()),
            adaptive: true,
            resolution: Some(1080),
            fps: Some(60.0),
            ..Default::default()
        },
        vp9("247", 720, 30.0),
        vp9("248", 1080, 30.0),
        vp9("303", 1080, 60.0),
        vp9("244", 480, 60.0),
        StreamDescriptor {
            format_id: "140".to_string(),
            mime_type: "audio/mp4".to_string(),
            audio_codec: Some("mp4a.40.2".to_string()),
            adaptive: true,
            bitrate: Some(320_000),
            ..Default::default()
        },
        opus("249", 50),
        opus("251", 160),
        opus("250", 70),
    ]
}

/// Provider answering from a fixed stream list.
#[derive(Default)]
pub struct StubProvider {
    pub streams: Vec<StreamDescriptor>,
    pub list_calls: Cell<usize>,
    /// `(format_id, path)` of every download attempt, in order.
    pub downloads: RefCell<Vec<(String, PathBuf)>>,
    fail_format: Option<String>,
    fail_listing: bool,
}

impl StubProvider {
    pub fn new(streams: Vec<StreamDescriptor>) -> Self {
        Self {
            streams,
            ..Default::default()
        }
    }

    /// Downloading `format_id` writes a partial file, then fails.
    pub fn failing_download(mut self, format_id: &str) -> Self {
        self.fail_format = Some(format_id.to_string());
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn download_ids(&self) -> Vec<String> {
        self.downloads.borrow().iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn download_paths(&self) -> Vec<PathBuf> {
        self.downloads.borrow().iter().map(|(_, p)| p.clone()).collect()
    }

    pub fn was_called(&self) -> bool {
        self.list_calls.get() > 0 || !self.downloads.borrow().is_empty()
    }
}

impl VideoInfoProvider for StubProvider {
    fn list_streams(&self, reference: &str) -> Result<Vec<StreamDescriptor>, ProviderError> {
        self.list_calls.set(self.list_calls.get() + 1);
        if self.fail_listing {
            return Err(ProviderError::ToolFailed {
                tool: "stub".to_string(),
                message: format!("video unavailable: {reference}"),
            });
        }
        Ok(self
            .streams
            .iter()
            .cloned()
            .map(|mut s| {
                s.source = reference.to_string();
                s
            })
            .collect())
    }

    fn download(
        &self,
        stream: &StreamDescriptor,
        output_dir: &Path,
        filename: &str,
    ) -> Result<(), ProviderError> {
        let path = output_dir.join(filename);
        self.downloads
            .borrow_mut()
            .push((stream.format_id.clone(), path.clone()));

        if self.fail_format.as_deref() == Some(stream.format_id.as_str()) {
            fs::write(&path, b"partial")?;
            return Err(ProviderError::ToolFailed {
                tool: "stub".to_string(),
                message: "connection reset".to_string(),
            });
        }

        fs::write(&path, stream_data(&stream.format_id))?;
        Ok(())
    }
}

/// Bytes the stub writes for a downloaded stream.
pub fn stream_data(format_id: &str) -> Vec<u8> {
    format!("stream {format_id}").into_bytes()
}

/// Bytes the fake ffmpeg writes to its output on success.
pub const FFMPEG_OUTPUT: &[u8] = b"ffmpeg output";

/// Stand-in for ffmpeg: records commands and writes its last argument.
pub struct FakeInvoker {
    exit_code: i32,
    /// Arguments of every run, lossily converted.
    pub runs: RefCell<Vec<Vec<String>>>,
    /// Whether every `-i` input existed when the command ran.
    pub inputs_present: RefCell<Vec<bool>>,
}

impl FakeInvoker {
    pub fn new() -> Self {
        Self::exiting_with(0)
    }

    /// Exits with `code`. A nonzero exit still leaves a truncated output file.
    pub fn exiting_with(code: i32) -> Self {
        Self {
            exit_code: code,
            runs: RefCell::new(Vec::new()),
            inputs_present: RefCell::new(Vec::new()),
        }
    }

    pub fn run_count(&self) -> usize {
        self.runs.borrow().len()
    }
}

impl ProcessInvoker for FakeInvoker {
    fn run(&self, cmd: &ToolCommand) -> dashgrab_av::Result<ToolOutput> {
        let args: Vec<String> = cmd
            .get_args()
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();

        let inputs_ok = args
            .windows(2)
            .filter(|w| w[0] == "-i")
            .all(|w| Path::new(&w[1]).exists());
        self.inputs_present.borrow_mut().push(inputs_ok);

        if let Some(output) = cmd.last_arg() {
            let data: &[u8] = if self.exit_code == 0 {
                FFMPEG_OUTPUT
            } else {
                b"truncated"
            };
            fs::write(output, data)?;
        }

        self.runs.borrow_mut().push(args);

        let mut result = ToolOutput::with_code(self.exit_code);
        if self.exit_code != 0 {
            result.stderr = "Conversion failed!\n".to_string();
        }
        Ok(result)
    }
}

/// Temp layout with separate work and output directories.
pub struct Sandbox {
    _root: TempDir,
    pub work: PathBuf,
    pub out: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let work = root.path().join("work");
        let out = root.path().join("out");
        fs::create_dir(&work).unwrap();
        fs::create_dir(&out).unwrap();
        Self {
            _root: root,
            work,
            out,
        }
    }

    pub fn settings(&self) -> FetchSettings {
        FetchSettings {
            work_dir: self.work.clone(),
            ..Default::default()
        }
    }

    pub fn fetcher<'a>(
        &self,
        provider: &'a StubProvider,
        invoker: &'a FakeInvoker,
    ) -> MediaFetcher<&'a StubProvider, &'a FakeInvoker> {
        MediaFetcher::new(provider, invoker, self.settings())
    }

    /// File names left in the work directory.
    pub fn work_files(&self) -> Vec<String> {
        list_dir(&self.work)
    }

    pub fn out_files(&self) -> Vec<String> {
        list_dir(&self.out)
    }
}

fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
