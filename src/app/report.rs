use crate::app::models::{PageOutcome, PageStatus, RewriteStats, RunSummary};

pub struct Report;

impl Report {
    /// One line per page plus a closing tally. Dry runs are phrased as such.
    pub fn render_outcomes(outcomes: &[PageOutcome], dry_run: bool) -> String {
        let mut out = String::new();
        let mut moved = 0usize;
        let mut skipped = 0usize;
        let mut failed = 0usize;

        for outcome in outcomes {
            let shown = outcome.path.display();
            match &outcome.status {
                PageStatus::Moved(stats) => {
                    moved += 1;
                    let verb = if dry_run {
                        "would move sidebar"
                    } else {
                        "moved sidebar"
                    };
                    out.push_str(&format!(
                        "{}: {}{}\n",
                        shown,
                        verb,
                        Self::describe_stats(stats, dry_run)
                    ));
                }
                PageStatus::Skipped(reason) => {
                    skipped += 1;
                    out.push_str(&format!("{}: skipped ({})\n", shown, reason));
                }
                PageStatus::Failed(reason) => {
                    failed += 1;
                    out.push_str(&format!("{}: failed ({})\n", shown, reason));
                }
            }
        }

        let updated = if dry_run { "would change" } else { "updated" };
        out.push_str(&format!(
            "{} page(s): {} {}, {} skipped, {} failed\n",
            outcomes.len(),
            moved,
            updated,
            skipped,
            failed
        ));
        out
    }

    /// Summary of one batch-tidy run, for the log.
    pub fn tidy_summary(summary: &RunSummary) -> String {
        if summary.failures.is_empty() {
            return format!("tidied {} page(s)", summary.processed);
        }
        let failed: Vec<String> = summary
            .failures
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        format!(
            "tidied {} page(s), {} failed: {}",
            summary.processed,
            summary.failures.len(),
            failed.join(", ")
        )
    }

    fn describe_stats(stats: &RewriteStats, dry_run: bool) -> String {
        if stats.total() == 0 {
            return String::new();
        }

        let mut parts = Vec::new();
        if stats.scripts > 0 {
            parts.push(format!("{} script(s)", stats.scripts));
        }
        if stats.iframes > 0 {
            parts.push(format!("{} iframe(s)", stats.iframes));
        }
        if stats.share_divs > 0 {
            parts.push(format!("{} share widget(s)", stats.share_divs));
        }
        if stats.unwanted_asides > 0 {
            parts.push(format!("{} unwanted aside(s)", stats.unwanted_asides));
        }
        if stats.duplicate_asides > 0 {
            parts.push(format!("{} duplicate aside(s)", stats.duplicate_asides));
        }

        let verb = if dry_run { "removing" } else { "removed" };
        format!(" ({} {})", verb, parts.join(", "))
    }
}
