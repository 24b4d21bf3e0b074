//! Spinner feedback while external converters run.
//!
//! Progress output goes to stderr and is hidden in quiet mode, with `--json`,
//! and when stderr is not a terminal.

use std::io::IsTerminal;
use std::time::Duration;

use abstract_lint_core::{Invocation, LintResult, ToolOutput, ToolRunner};
use camino::Utf8PathBuf;
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner template: animation then message.
pub const TEMPLATE_SPINNER: &str = "{spinner} {msg}";

/// Configuration for progress display behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressConfig {
    /// Whether to suppress all progress output.
    pub quiet_mode: bool,
}

impl ProgressConfig {
    /// Progress configuration from CLI flags.
    pub const fn new(quiet: bool) -> Self {
        Self { quiet_mode: quiet }
    }

    /// Determine if spinners should be displayed.
    pub fn should_show_progress(&self) -> bool {
        !self.quiet_mode && std::io::stderr().is_terminal()
    }

    /// A ticking spinner, or a hidden one when progress is off.
    pub fn create_spinner(&self, msg: String) -> ProgressBar {
        if !self.should_show_progress() {
            return ProgressBar::hidden();
        }
        let style = ProgressStyle::default_spinner()
            .template(TEMPLATE_SPINNER)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let pb = ProgressBar::new_spinner().with_style(style).with_message(msg);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// Wraps a [`ToolRunner`] and spins while each program runs.
pub struct SpinnerRunner<'a> {
    inner: &'a dyn ToolRunner,
    config: ProgressConfig,
}

impl<'a> SpinnerRunner<'a> {
    /// Wrap `inner`.
    pub const fn new(inner: &'a dyn ToolRunner, config: ProgressConfig) -> Self {
        Self { inner, config }
    }
}

impl ToolRunner for SpinnerRunner<'_> {
    fn locate(&self, program: &str) -> Option<Utf8PathBuf> {
        self.inner.locate(program)
    }

    fn run(&self, invocation: &Invocation) -> LintResult<ToolOutput> {
        let spinner = self
            .config
            .create_spinner(format!("running {}", invocation.name()));
        let result = self.inner.run(invocation);
        spinner.finish_and_clear();
        result
    }
}
