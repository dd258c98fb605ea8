use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "patchkit",
    about = "Incremental asset patch packager",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to ./patchkit.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Package files changed since the last index into a patch archive
    Build,
    /// Discard the index and rebuild it from the asset tree
    Index,
    /// Show files that the next build would package
    Status,
    /// List the patches published for a version line
    History(HistoryArgs),
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Version whose `main.primary` line to list (defaults to the version file)
    #[arg(long = "for", value_name = "VERSION")]
    pub target: Option<String>,
}
