use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::app::models::{RunSummary, RuntimeConfig, TidyMode};

/// Flags handed to tidy when no config file is in play.
const INLINE_FLAGS: [&str; 6] = ["--indent", "yes", "--wrap", "0", "-quiet", "-modify"];

/// Capability to run an external program and report its exit code.
///
/// The batch loop only cares about the code, so tests can swap in a recorder
/// instead of spawning real child processes.
pub trait ToolRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<i32>;
}

/// Spawns the program with inherited stdio and waits for it to finish.
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<i32> {
        let status = Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("failed to launch {}", program))?;
        // A signal-terminated child has no code; report it as a plain failure.
        Ok(status.code().unwrap_or(-1))
    }
}

/// Feeds every discovered page to the external tool, one at a time.
///
/// Per-page failures are reported on `out` and collected in the summary;
/// they never abort the batch and never change the process exit code.
pub struct BatchTidy<'a> {
    config: &'a RuntimeConfig,
    runner: &'a dyn ToolRunner,
}

impl<'a> BatchTidy<'a> {
    pub fn new(config: &'a RuntimeConfig, runner: &'a dyn ToolRunner) -> Self {
        Self { config, runner }
    }

    pub fn process<W: Write>(&self, pages: &[PathBuf], out: &mut W) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for page in pages {
            summary.processed += 1;
            match &self.config.mode {
                TidyMode::Config { config_file } => {
                    writeln!(out, "Tidying {}", page.display())?;
                    let args = config_args(config_file, page);
                    match self.runner.run(&self.config.tidy_bin, &args) {
                        Ok(0) => {}
                        Ok(code) => {
                            writeln!(
                                out,
                                "tidy exited with status {} on {}",
                                code,
                                page.display()
                            )?;
                            summary.failures.push(page.clone());
                        }
                        Err(err) => {
                            writeln!(out, "tidy could not be run on {}: {}", page.display(), err)?;
                            summary.failures.push(page.clone());
                        }
                    }
                }
                TidyMode::Inline => {
                    let args = inline_args(page);
                    writeln!(out, "{}", render_command(&self.config.tidy_bin, &args))?;
                    // This variant never checks the tool's status; only a
                    // failed spawn is worth a note, and that goes to the log.
                    if let Err(err) = self.runner.run(&self.config.tidy_bin, &args) {
                        log::warn!("failed to run {}: {}", self.config.tidy_bin, err);
                    }
                }
            }
        }

        Ok(summary)
    }
}

/// Argument list for a config-file invocation: `-config <file> -m <page>`.
pub fn config_args(config_file: &Path, page: &Path) -> Vec<OsString> {
    vec![
        "-config".into(),
        config_file.as_os_str().to_owned(),
        "-m".into(),
        page.as_os_str().to_owned(),
    ]
}

/// Argument list for an inline invocation:
/// `--indent yes --wrap 0 -quiet -modify <page>`.
pub fn inline_args(page: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = INLINE_FLAGS.iter().map(OsString::from).collect();
    args.push(page.as_os_str().to_owned());
    args
}

/// The full command line as one printable string.
pub fn render_command(program: &str, args: &[OsString]) -> String {
    let mut line = String::from(program);
    for arg in args {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Records every call and replays scripted exit codes (0 when exhausted).
    struct RecordingRunner {
        calls: RefCell<Vec<(String, Vec<OsString>)>>,
        codes: RefCell<VecDeque<i32>>,
    }

    impl RecordingRunner {
        fn new(codes: &[i32]) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                codes: RefCell::new(codes.iter().copied().collect()),
            }
        }

        fn calls(&self) -> Vec<(String, Vec<OsString>)> {
            self.calls.borrow().clone()
        }
    }

    impl ToolRunner for RecordingRunner {
        fn run(&self, program: &str, args: &[OsString]) -> Result<i32> {
            self.calls
                .borrow_mut()
                .push((program.to_string(), args.to_vec()));
            Ok(self.codes.borrow_mut().pop_front().unwrap_or(0))
        }
    }

    /// Simulates a tool that cannot be spawned at all.
    struct UnspawnableRunner;

    impl ToolRunner for UnspawnableRunner {
        fn run(&self, program: &str, _args: &[OsString]) -> Result<i32> {
            Err(anyhow!("No such file or directory (os error 2): {}", program))
        }
    }

    fn config_runtime(config_file: &str) -> RuntimeConfig {
        RuntimeConfig {
            tidy_bin: "tidy".to_string(),
            mode: TidyMode::Config {
                config_file: PathBuf::from(config_file),
            },
        }
    }

    fn inline_runtime() -> RuntimeConfig {
        RuntimeConfig {
            tidy_bin: "tidy".to_string(),
            mode: TidyMode::Inline,
        }
    }

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn inline_mode_echoes_the_exact_command_per_page() {
        let config = inline_runtime();
        let runner = RecordingRunner::new(&[]);
        let pages = vec![PathBuf::from("a/index.html"), PathBuf::from("b/c/index.html")];
        let mut out = Vec::new();

        let summary = BatchTidy::new(&config, &runner)
            .process(&pages, &mut out)
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(
            printed,
            "tidy --indent yes --wrap 0 -quiet -modify a/index.html\n\
             tidy --indent yes --wrap 0 -quiet -modify b/c/index.html\n"
        );
        assert_eq!(summary.processed, 2);
        assert!(summary.failures.is_empty());
        assert_eq!(
            runner.calls(),
            vec![
                (
                    "tidy".to_string(),
                    os(&["--indent", "yes", "--wrap", "0", "-quiet", "-modify", "a/index.html"]),
                ),
                (
                    "tidy".to_string(),
                    os(&["--indent", "yes", "--wrap", "0", "-quiet", "-modify", "b/c/index.html"]),
                ),
            ]
        );
    }

    #[test]
    fn inline_mode_ignores_nonzero_exit_codes() {
        let config = inline_runtime();
        let runner = RecordingRunner::new(&[2, 1]);
        let pages = vec![PathBuf::from("a/index.html"), PathBuf::from("b/index.html")];
        let mut out = Vec::new();

        let summary = BatchTidy::new(&config, &runner)
            .process(&pages, &mut out)
            .unwrap();

        assert!(summary.failures.is_empty());
        // Only the two echo lines; no diagnostics.
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
    }

    #[test]
    fn config_mode_passes_the_same_config_file_to_every_page() {
        let config = config_runtime("conf/tidy_config.txt");
        let runner = RecordingRunner::new(&[]);
        let pages = vec![PathBuf::from("a/index.html"), PathBuf::from("b/index.html")];
        let mut out = Vec::new();

        BatchTidy::new(&config, &runner)
            .process(&pages, &mut out)
            .unwrap();

        assert_eq!(
            runner.calls(),
            vec![
                (
                    "tidy".to_string(),
                    os(&["-config", "conf/tidy_config.txt", "-m", "a/index.html"]),
                ),
                (
                    "tidy".to_string(),
                    os(&["-config", "conf/tidy_config.txt", "-m", "b/index.html"]),
                ),
            ]
        );
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Tidying a/index.html\nTidying b/index.html\n"
        );
    }

    #[test]
    fn config_mode_reports_failed_pages_and_keeps_going() {
        let config = config_runtime("tidy_config.txt");
        let runner = RecordingRunner::new(&[1, 0]);
        let pages = vec![PathBuf::from("bad/index.html"), PathBuf::from("good/index.html")];
        let mut out = Vec::new();

        let summary = BatchTidy::new(&config, &runner)
            .process(&pages, &mut out)
            .unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failures, vec![PathBuf::from("bad/index.html")]);

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(
            printed,
            "Tidying bad/index.html\n\
             tidy exited with status 1 on bad/index.html\n\
             Tidying good/index.html\n"
        );
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn config_mode_counts_a_spawn_failure_like_any_other() {
        let config = config_runtime("tidy_config.txt");
        let runner = UnspawnableRunner;
        let pages = vec![PathBuf::from("a/index.html")];
        let mut out = Vec::new();

        let summary = BatchTidy::new(&config, &runner)
            .process(&pages, &mut out)
            .unwrap();

        assert_eq!(summary.failures, vec![PathBuf::from("a/index.html")]);
        assert!(String::from_utf8(out)
            .unwrap()
            .contains("tidy could not be run on a/index.html"));
    }

    #[test]
    fn no_pages_means_no_invocations_and_no_output() {
        let config = config_runtime("tidy_config.txt");
        let runner = RecordingRunner::new(&[]);
        let mut out = Vec::new();

        let summary = BatchTidy::new(&config, &runner).process(&[], &mut out).unwrap();

        assert_eq!(summary.processed, 0);
        assert!(summary.failures.is_empty());
        assert!(runner.calls().is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn custom_tool_name_is_used_verbatim() {
        let config = RuntimeConfig {
            tidy_bin: "tidy5".to_string(),
            mode: TidyMode::Inline,
        };
        let runner = RecordingRunner::new(&[]);
        let mut out = Vec::new();

        BatchTidy::new(&config, &runner)
            .process(&[PathBuf::from("index.html")], &mut out)
            .unwrap();

        assert!(String::from_utf8(out)
            .unwrap()
            .starts_with("tidy5 --indent yes"));
        assert_eq!(runner.calls()[0].0, "tidy5");
    }
}
