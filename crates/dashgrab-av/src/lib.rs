//! # dashgrab-av
//!
//! External tool plumbing for dashgrab.
//!
//! This crate provides:
//! - **Command execution** ([`ToolCommand`], [`ProcessInvoker`]) -- blocking
//!   process runner behind a trait so tests can substitute a fake.
//! - **Tool discovery** ([`ToolRegistry`]) -- find ffmpeg and yt-dlp.
//! - **Temp artifacts** ([`TempArtifact`]) -- scoped temp files that delete
//!   themselves and move into place without clobbering.
//! - **Actions** ([`actions`]) -- MP3 transcoding and WebM muxing via ffmpeg.
//!
//! ## Example
//!
//! ```no_run
//! use dashgrab_av::actions::{transcode_to_mp3, Mp3Quality};
//! use dashgrab_av::{SystemInvoker, ToolRegistry, ToolsConfig};
//! use std::path::Path;
//!
//! let tools = ToolRegistry::discover(&ToolsConfig::default());
//! let ffmpeg = tools.require("ffmpeg")?;
//! let output = transcode_to_mp3(
//!     &SystemInvoker,
//!     ffmpeg,
//!     Path::new("song.opus"),
//!     Path::new("song.mp3"),
//!     Mp3Quality::BEST,
//!     None,
//! )?;
//! assert!(output.success());
//! # Ok::<(), dashgrab_av::Error>(())
//! ```

pub mod actions;
pub mod command;
mod container;
mod error;
pub mod tools;
pub mod workspace;

// Re-exports
pub use command::{ProcessInvoker, SystemInvoker, ToolCommand, ToolOutput};
pub use container::Container;
pub use error::{Error, Result};
pub use tools::{ToolInfo, ToolRegistry, ToolsConfig};
pub use workspace::TempArtifact;
