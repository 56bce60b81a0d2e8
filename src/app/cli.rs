use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Batch-run HTML Tidy and restructure exported blog pages"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run tidy over every index.html below the current directory
    Tidy(TidyArgs),
    /// Move each page's sidebar so it sits after the content section
    MoveSidebar(MoveArgs),
}

#[derive(Args, Debug)]
pub struct TidyArgs {
    /// Use a predefined set of options from presets.toml
    #[arg(long)]
    pub preset: Option<String>,

    /// Directory holding tidy_config.txt
    #[arg(long, value_name = "DIR", conflicts_with = "inline")]
    pub config_dir: Option<PathBuf>,

    /// Skip the config file and run tidy with a fixed set of flags,
    /// echoing each command before it runs
    #[arg(long)]
    pub inline: bool,

    /// Tidy executable to invoke
    #[arg(long, value_name = "BIN")]
    pub tidy_bin: Option<String>,
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// An .html file, or a directory to scan for .html files
    pub path: PathBuf,

    /// Rewrite files in place instead of only reporting what would change
    #[arg(long, short = 'e')]
    pub execute: bool,

    /// Write a .bak copy of each page before rewriting it
    #[arg(long, short = 'b')]
    pub backup: bool,
}
