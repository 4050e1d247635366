//! 命令行参数

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "job_apply_agent",
    about = "Search LinkedIn jobs, filter them and apply automatically",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the search-and-apply pipeline (default command)
    Run(RunArgs),
    /// Print the application history recorded in the ledger
    History(HistoryArgs),
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Path to the TOML configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,
    /// Launch a headless browser instead of attaching to a running one
    #[arg(long)]
    pub headless: bool,
    /// Number of passes over all search terms (overrides run_non_stop)
    #[arg(long = "loop", value_name = "N")]
    pub passes: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct HistoryArgs {
    /// Path to the TOML configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,
    /// Only show failed or skipped attempts
    #[arg(long)]
    pub failed: bool,
}
