mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    expand_paths(&mut config);

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./dashgrab.toml",
        "~/.config/dashgrab/config.toml",
        "/etc/dashgrab/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

fn expand_paths(config: &mut Config) {
    config.workspace.dir = expand(&config.workspace.dir);
    config.tools.ffmpeg_path = config.tools.ffmpeg_path.as_deref().map(expand);
    config.tools.yt_dlp_path = config.tools.yt_dlp_path.as_deref().map(expand);
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.audio.quality().is_none() {
        anyhow::bail!(
            "audio.mp3_quality must be between 0 and 9, got {}",
            config.audio.mp3_quality
        );
    }

    if config.tools.timeout_secs == Some(0) {
        anyhow::bail!("tools.timeout_secs cannot be 0; leave it unset to disable the timeout");
    }

    if !config.workspace.dir.is_dir() {
        tracing::warn!(
            "Working directory does not exist: {:?}",
            config.workspace.dir
        );
    }

    for path in [&config.tools.ffmpeg_path, &config.tools.yt_dlp_path]
        .into_iter()
        .flatten()
    {
        if !path.exists() {
            tracing::warn!("Configured tool path does not exist: {:?}", path);
        }
    }

    Ok(())
}
