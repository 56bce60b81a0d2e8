// Declare modules
pub mod cli;
pub mod config;
pub mod models;
pub mod mover;
pub mod report;
pub mod runner;
pub mod scanner;

use anyhow::{bail, Context, Result};
use clap::Parser;
use pathdiff::diff_paths;
use std::env;
use std::io;
use std::path::{Path, PathBuf};

use self::cli::{Cli, Command, MoveArgs, TidyArgs};
use self::config::resolve_config;
use self::models::PageOutcome;
use self::mover::WritePolicy;
use self::report::Report;
use self::runner::{BatchTidy, SystemRunner};
use self::scanner::Scanner;

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    let args = Cli::parse();

    match args.command {
        Command::Tidy(args) => run_tidy(args),
        Command::MoveSidebar(args) => run_move_sidebar(args),
    }
}

fn run_tidy(args: TidyArgs) -> Result<()> {
    // 1. Identify Project Name for preset auto-detection
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    // Simple heuristic: name of current folder
    let project_name = current_dir.file_name().and_then(|n| n.to_str());

    // 2. Resolve Configuration
    let config = resolve_config(args, project_name)?;

    // 3. Scan for index pages. Walking "." keeps the announced and echoed
    //    paths relative, the same form `find .` prints.
    let pages = Scanner::index_pages(PathBuf::from("."))?.scan();

    if pages.is_empty() {
        log::warn!("⚠️ No index.html files below the current directory.");
        return Ok(());
    }

    // 4. Run tidy over each page
    let tidy = BatchTidy::new(&config, &SystemRunner);
    let summary = tidy.process(&pages, &mut io::stdout().lock())?;

    log::info!("{}", Report::tidy_summary(&summary));

    Ok(())
}

fn run_move_sidebar(args: MoveArgs) -> Result<()> {
    let policy = WritePolicy {
        execute: args.execute,
        backup: args.backup,
    };
    if !policy.execute {
        log::info!("💡 Dry run: pass --execute to rewrite files.");
    }

    let pages = if args.path.is_dir() {
        Scanner::html_pages(args.path.clone())?.scan()
    } else if args.path.is_file() {
        if !has_html_extension(&args.path) {
            bail!("{:?} is not an .html file", args.path);
        }
        vec![args.path.clone()]
    } else {
        bail!("{:?} is neither a file nor a directory", args.path);
    };

    if pages.is_empty() {
        log::warn!("⚠️ No .html files found under {:?}.", args.path);
        return Ok(());
    }

    let mut outcomes = Vec::with_capacity(pages.len());
    for page in &pages {
        // Report paths relative to the argument; fall back to the full path.
        let shown = diff_paths(page, &args.path)
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| page.clone());
        outcomes.push(PageOutcome {
            path: shown,
            status: mover::process_page(page, policy),
        });
    }

    print!("{}", Report::render_outcomes(&outcomes, !policy.execute));

    Ok(())
}

fn has_html_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("html"))
}
