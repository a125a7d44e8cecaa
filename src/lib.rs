//! dashgrab - best quality YouTube downloads
//!
//! Selects the best DASH VP9 video and Opus audio streams for a video,
//! downloads them into scoped temp files and assembles the requested output
//! with ffmpeg. The library crate exposes the fetch pipeline for integration
//! testing and for use with other stream providers.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod provider;

pub use error::{FetchError, StreamKind};
pub use fetch::{DownloadTarget, FetchSettings, MediaFetcher};
pub use provider::{ProviderError, StreamDescriptor, VideoInfoProvider, YtDlpProvider};
