//! Command-line flow: version, tool check, or a fetch.

use crate::cli::Cli;
use crate::config::{self, Config};
use crate::fetch::{FetchSettings, MediaFetcher};
use crate::provider::{VideoInfoProvider, YtDlpProvider};
use anyhow::{Context, Result};
use dashgrab_av::tools::{FFMPEG, YT_DLP};
use dashgrab_av::{ProcessInvoker, SystemInvoker, ToolRegistry};
use std::io::Write;
use std::path::PathBuf;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the CLI against real yt-dlp and ffmpeg.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    run_with(cli, out, connect)
}

/// Run the CLI, building the fetcher with `connect` once it is needed.
///
/// `--version` returns before config is read or `connect` is called.
pub fn run_with<P, I, F>(cli: &Cli, out: &mut dyn Write, connect: F) -> Result<()>
where
    P: VideoInfoProvider,
    I: ProcessInvoker,
    F: FnOnce(&Config) -> Result<MediaFetcher<P, I>>,
{
    if cli.version {
        writeln!(out, "dashgrab {}", VERSION)?;
        return Ok(());
    }

    let config = config::load_config_or_default(cli.config.as_deref())?;

    if cli.check_tools {
        return check_tools(&config, out);
    }

    let reference = cli
        .hyperlink
        .as_deref()
        .context("missing video hyperlink")?;
    let target = cli.target.as_deref().context("missing target file")?;

    let fetcher = connect(&config)?;

    let saved = if cli.audio_only {
        fetcher.fetch_audio(reference, target)?
    } else {
        fetcher.fetch_combined(reference, target)?
    };

    writeln!(out, "Saved {}", saved.display())?;
    Ok(())
}

/// Build a fetcher backed by the discovered yt-dlp and ffmpeg.
///
/// Missing tools are not an error here; they fail with `ToolNotFound` when
/// first run, after the destination has been validated.
pub fn connect(config: &Config) -> Result<MediaFetcher<YtDlpProvider, SystemInvoker>> {
    let tools = ToolRegistry::discover(&config.tools);
    let timeout = config.tools.timeout();

    let tool_path = |name: &str| {
        tools.require(name).map(|p| p.to_path_buf()).unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            PathBuf::from(name)
        })
    };

    let settings = FetchSettings {
        work_dir: config.workspace.dir.clone(),
        ffmpeg: tool_path(FFMPEG),
        mp3_quality: config.audio.quality().unwrap_or_default(),
        mux_mode: config.mux.mode,
        timeout,
    };

    let provider = YtDlpProvider::new(tool_path(YT_DLP)).with_timeout(timeout);

    Ok(MediaFetcher::new(provider, SystemInvoker, settings))
}

fn check_tools(config: &Config, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Checking external tools...\n")?;

    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        write!(out, "{} {}", status, tool.name)?;

        if let Some(ref version) = tool.version {
            write!(out, " ({})", version)?;
        }

        if let Some(ref path) = tool.path {
            write!(out, " - {}", path.display())?;
        }

        writeln!(out)?;
    }

    writeln!(out)?;
    if all_ok {
        writeln!(out, "All required tools are available!")?;
    } else {
        writeln!(out, "Some tools are missing. Install them to enable all features.")?;
    }

    Ok(())
}
