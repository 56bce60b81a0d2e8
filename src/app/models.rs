use std::path::PathBuf;

/// Represents the final tidy-run configuration after merging presets and CLI args.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub tidy_bin: String,
    pub mode: TidyMode,
}

/// How the external tidy process is told what to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TidyMode {
    /// A shared config file is passed via `-config`; the exit status of every
    /// invocation is checked and failures are reported per page.
    Config { config_file: PathBuf },
    /// Fixed command-line flags; the full command is echoed before running
    /// and the exit status is not checked.
    Inline,
}

/// Tally of one batch-tidy run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub processed: usize,
    pub failures: Vec<PathBuf>,
}

/// Junk stripped from a single page while relocating its sidebar.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RewriteStats {
    pub scripts: usize,
    pub iframes: usize,
    pub share_divs: usize,
    pub unwanted_asides: usize,
    pub duplicate_asides: usize,
}

impl RewriteStats {
    pub fn total(&self) -> usize {
        self.scripts + self.iframes + self.share_divs + self.unwanted_asides + self.duplicate_asides
    }
}

/// Result of feeding one page through the sidebar mover.
#[derive(Debug)]
pub struct PageOutcome {
    pub path: PathBuf,
    pub status: PageStatus,
}

#[derive(Debug)]
pub enum PageStatus {
    Moved(RewriteStats),
    Skipped(String),
    Failed(String),
}
