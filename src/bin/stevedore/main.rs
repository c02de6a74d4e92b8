//! Stevedore CLI - sdist amending and external dependency tooling

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("stevedore=debug")
    } else {
        EnvFilter::new("stevedore=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Fetch(args) => commands::fetch::execute(args),
        Commands::Show(args) => commands::show::execute(args),
        Commands::Summarize(args) => commands::summarize::execute(args),
        Commands::Triage(args) => commands::triage::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
