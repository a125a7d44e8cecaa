use clap::Parser;
use std::path::PathBuf;

const LONG_ABOUT: &str = "\
Downloads high quality content from YouTube.

YouTube serves its best video and audio as separate DASH streams. dashgrab
picks the best VP9 video (by resolution, then frame rate) and the best Opus
audio (by bit rate), downloads them with yt-dlp and combines them with ffmpeg.

Supported outputs: *.webm (VP9 video + Opus audio), and with --audio_only
*.opus (Opus audio as served) or *.mp3 (transcoded with ffmpeg).

Muxing long 4K/60 videos with re-encoding enabled can take a long time and
over a gigabyte of RAM.";

#[derive(Parser, Debug)]
#[command(name = "dashgrab")]
#[command(author, about = "Download the best quality YouTube video and audio into one file")]
#[command(long_about = LONG_ABOUT, disable_version_flag = true)]
pub struct Cli {
    /// Hyperlink to (or id of) the YouTube video to download
    #[arg(required_unless_present_any = ["version", "check_tools"])]
    pub hyperlink: Option<String>,

    /// File the downloaded content is saved to
    #[arg(required_unless_present_any = ["version", "check_tools"])]
    pub target: Option<PathBuf>,

    /// Download only audio (.opus or .mp3 target)
    #[arg(short = 'a', long = "audio_only", visible_alias = "audio-only")]
    pub audio_only: bool,

    /// Print the version and exit
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Check that ffmpeg and yt-dlp are available, then exit
    #[arg(long)]
    pub check_tools: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn positional_arguments() {
        let cli = Cli::try_parse_from(["dashgrab", "https://youtu.be/x", "out.webm"]).unwrap();
        assert_eq!(cli.hyperlink.as_deref(), Some("https://youtu.be/x"));
        assert_eq!(cli.target, Some(PathBuf::from("out.webm")));
        assert!(!cli.audio_only);
        assert!(!cli.version);
    }

    #[test]
    fn audio_only_spellings() {
        for flag in ["-a", "--audio_only", "--audio-only"] {
            let cli = Cli::try_parse_from(["dashgrab", flag, "x", "song.mp3"]).unwrap();
            assert!(cli.audio_only, "{flag}");
        }
    }

    #[test]
    fn version_needs_no_positionals() {
        for flag in ["-v", "--version"] {
            let cli = Cli::try_parse_from(["dashgrab", flag]).unwrap();
            assert!(cli.version);
            assert!(cli.hyperlink.is_none());
        }
    }

    #[test]
    fn positionals_required_otherwise() {
        assert!(Cli::try_parse_from(["dashgrab"]).is_err());
        assert!(Cli::try_parse_from(["dashgrab", "x"]).is_err());
    }
}
