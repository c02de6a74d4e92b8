//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Stevedore - tooling for Python sdists with external dependencies
#[derive(Parser)]
#[command(name = "stevedore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a package's sdist and amend it with external dependency metadata
    Fetch(FetchArgs),

    /// Inspect the external dependencies declared by an amended sdist
    Show(ShowArgs),

    /// Summarize CI build results into markdown tables
    Summarize(SummarizeArgs),

    /// Classify top downloaded packages as pure or non-pure
    Triage(TriageArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct FetchArgs {
    /// Package name
    pub package: String,

    /// Workspace root (defaults to the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Package name
    pub package: String,

    /// Show external dependencies for the package
    #[arg(long)]
    pub external: bool,

    /// Validate external dependencies against the central registry
    #[arg(long)]
    pub validate: bool,

    /// Show the install command for the external dependencies with the
    /// system package manager
    #[arg(long)]
    pub system_install_cmd: bool,

    /// Use this package manager rather than auto-detecting one
    #[arg(long)]
    pub package_manager: Option<String>,

    /// Directory where amended sdists are located
    #[arg(long)]
    pub sdist_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct SummarizeArgs {
    /// Workspace root (defaults to the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Regenerate the report tables in README.md
    #[arg(long)]
    pub update_readme: bool,
}

#[derive(Args)]
pub struct TriageArgs {
    /// How many top packages to classify
    #[arg(long, default_value_t = 150)]
    pub limit: usize,

    /// Top-packages dump to read (defaults to the workspace copy)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Directory to write the pure/non-pure lists to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
