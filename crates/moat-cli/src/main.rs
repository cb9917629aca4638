//! Moat CLI - thesis-driven moat scoring from the command line.

use anyhow::Context;
use clap::Parser;
use moat_cli::commands::{self, Session};
use moat_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize tracing (log to stderr, RUST_LOG overrides)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let session = Session::new(config, cli.db, cli.thesis)?;

    match cli.command {
        Command::Discover(args) => commands::execute_discover(args, &session, &formatter)?,
        Command::Run(args) => commands::execute_run(args, &session, &formatter)?,
        Command::Scores(args) => commands::execute_scores(args, &session, &formatter)?,
        Command::Report(args) => commands::execute_report(args, &session, &formatter)?,
        Command::Thesis(args) => commands::execute_thesis(args, &session, &formatter)?,
    }

    Ok(())
}
