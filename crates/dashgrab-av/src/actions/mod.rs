//! ffmpeg actions: MP3 transcoding and WebM muxing.
//!
//! Each action builds a [`ToolCommand`](crate::ToolCommand) and runs it
//! through a [`ProcessInvoker`](crate::ProcessInvoker). A nonzero exit is
//! reported in the returned [`ToolOutput`](crate::ToolOutput), not as an
//! error, so callers can attach their own meaning to it.

mod mux;
mod transcode;

pub use mux::{mux_command, mux_webm, MuxMode};
pub use transcode::{mp3_command, transcode_to_mp3, Mp3Quality};
