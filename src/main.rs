use dashgrab::{app, cli::Cli};

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "dashgrab=debug,dashgrab_av=debug".to_string()
        } else {
            "dashgrab=info,dashgrab_av=info".to_string()
        }
    });

    // stdout carries only the version / tool report / saved path
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();
    app::run(&cli, &mut stdout)
}
