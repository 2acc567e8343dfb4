//! spiry - look up domain name and TLS certificate expiration

use anyhow::Context;
use clap::Parser;
use console::style;
use spiry::{commands, Cli, Settings};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug_enabled() { "debug" } else { "warn" };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from_file(path)
            .with_context(|| format!("unable to load settings from {}", path.display()))?,
        None => Settings::load_default().context("unable to load default settings")?,
    };

    let output = commands::run(cli, &settings)?;
    println!("{}", output);
    Ok(())
}
