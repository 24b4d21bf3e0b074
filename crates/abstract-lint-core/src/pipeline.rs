//! End-to-end run: backup, check, fixed copy, HTML and PDF export.
//!
//! Failed checks are data in the returned [`RunSummary`], not errors. A
//! missing or failing external tool only degrades its own step; the only
//! fatal conditions are an unresolvable input and I/O or decoding failures.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::checks::{Analysis, CheckReport, run_checks};
use crate::css::{DEFAULT_CSS_FILE, css_sources, local_sources, write_default_css};
use crate::error::{LintError, LintResult};
use crate::fix::{output_path, write_fixed};
use crate::freshness::needs_redo;
use crate::input::{DEFAULT_ENCODING, TextCodec, resolve_input};
use crate::profile::Profile;
use crate::report::{ReportStyle, render_report};
use crate::runner::{Invocation, ToolOutput, ToolRunner};
use crate::tools::{DEFAULT_FIGS_DPI, ToolPrograms};

/// Export target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Standalone HTML page.
    Html,
    /// PDF rendered from the HTML page.
    Pdf,
}

/// Everything a run needs besides the tool runner.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Abstract file, or a directory holding `<dir>.md`.
    pub input: Utf8PathBuf,
    /// Fixed copy destination; defaults to `fix_<name>` next to the input.
    pub output: Option<Utf8PathBuf>,
    /// Requested exports. PDF export implies HTML export.
    pub export: Vec<ExportFormat>,
    /// Append the report to the fixed copy and to the HTML export.
    pub attach: bool,
    /// Commit tracked changes before checking.
    pub backup: bool,
    /// CSS sources; `None` uses the generated default stylesheet.
    pub css: Option<Vec<String>>,
    /// Ask the converter to inline all resources.
    pub self_contained: bool,
    /// Text encoding label for the input and every written file.
    pub encoding: String,
    /// Image DPI for PDF export.
    pub figs_dpi: u32,
    /// Regenerate outputs even when they are up to date.
    pub force: bool,
    /// Limits and parsing tables.
    pub profile: Profile,
    /// External program names.
    pub programs: ToolPrograms,
    /// Extra freshness input for exports, normally the running executable,
    /// so that upgrading the tool regenerates them.
    pub tool_stamp: Option<Utf8PathBuf>,
}

impl RunOptions {
    /// Options with the default behaviour for `input`.
    pub fn new(input: impl Into<Utf8PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            export: vec![ExportFormat::Html, ExportFormat::Pdf],
            attach: true,
            backup: true,
            css: None,
            self_contained: false,
            encoding: DEFAULT_ENCODING.to_string(),
            figs_dpi: DEFAULT_FIGS_DPI,
            force: false,
            profile: Profile::default(),
            programs: ToolPrograms::default(),
            tool_stamp: None,
        }
    }

    fn exports(&self, format: ExportFormat) -> bool {
        self.export.contains(&format)
    }
}

/// What happened to one output-producing step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum StepStatus {
    /// Not requested.
    Skipped,
    /// Ran successfully without producing a file.
    Done,
    /// Produced or replaced this file.
    Written {
        /// The file written.
        path: Utf8PathBuf,
    },
    /// The existing file is newer than its inputs.
    UpToDate {
        /// The file kept.
        path: Utf8PathBuf,
    },
    /// The program is not on the search path.
    Unavailable {
        /// Program that was looked up.
        program: String,
    },
    /// The program ran but did not succeed.
    Failed {
        /// Program that was run.
        program: String,
        /// Exit code, if it exited normally.
        code: Option<i32>,
    },
    /// The program was killed after the configured timeout.
    TimedOut {
        /// Program that was killed.
        program: String,
        /// Timeout in seconds.
        seconds: u64,
    },
    /// A file this step reads from does not exist.
    Blocked {
        /// The missing file.
        missing: Utf8PathBuf,
    },
}

impl StepStatus {
    /// The file produced or kept by this step, if any.
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Written { path } | Self::UpToDate { path } => Some(path),
            _ => None,
        }
    }

    /// True for statuses that deserve a warning.
    pub const fn is_problem(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. }
                | Self::Failed { .. }
                | Self::TimedOut { .. }
                | Self::Blocked { .. }
        )
    }
}

/// Result of a complete run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// The resolved input file.
    pub input: Utf8PathBuf,
    /// Parsed sections and figures.
    pub analysis: Analysis,
    /// Check results.
    pub report: CheckReport,
    /// Version control backup.
    pub backup: StepStatus,
    /// Fixed copy of the input.
    pub fixed: StepStatus,
    /// Default stylesheet, when it was (re)generated.
    pub css_written: Option<Utf8PathBuf>,
    /// CSS sources handed to the converter.
    pub css: Vec<String>,
    /// HTML export.
    pub html: StepStatus,
    /// PDF export.
    pub pdf: StepStatus,
}

impl RunSummary {
    /// Whether no check failed.
    pub fn passed(&self) -> bool {
        self.report.passed()
    }
}

/// Locate and run `invocation`, folding tool problems into a [`StepStatus`].
fn execute(runner: &dyn ToolRunner, invocation: &Invocation) -> Result<ToolOutput, StepStatus> {
    let program = invocation.program.clone();
    if runner.locate(&program).is_none() {
        tracing::warn!(program = %program, "tool not found");
        return Err(StepStatus::Unavailable { program });
    }
    match runner.run(invocation) {
        Ok(output) if output.success() => Ok(output),
        Ok(output) => {
            tracing::warn!(program = %program, code = ?output.code, stderr = %output.stderr, "tool failed");
            Err(StepStatus::Failed {
                program,
                code: output.code,
            })
        }
        Err(LintError::ToolTimeout { program, seconds }) => {
            tracing::warn!(program = %program, seconds, "tool timed out");
            Err(StepStatus::TimedOut { program, seconds })
        }
        Err(e) => {
            tracing::warn!(program = %program, error = %e, "tool could not be run");
            Err(StepStatus::Failed {
                program,
                code: None,
            })
        }
    }
}

fn run_backup(runner: &dyn ToolRunner, programs: &ToolPrograms, dir: &Utf8Path) -> StepStatus {
    let invocation = programs.vcs_commit().current_dir(dir);
    match execute(runner, &invocation) {
        Ok(_) => StepStatus::Done,
        Err(status) => status,
    }
}

struct Exporter<'a> {
    options: &'a RunOptions,
    runner: &'a dyn ToolRunner,
    codec: TextCodec,
    input: &'a Utf8Path,
    dir: &'a Utf8Path,
}

impl Exporter<'_> {
    fn freshness_inputs(&self, primary: &Utf8Path) -> Vec<Utf8PathBuf> {
        let mut inputs = vec![primary.to_path_buf()];
        inputs.extend(self.options.tool_stamp.iter().cloned());
        inputs
    }

    #[tracing::instrument(skip_all)]
    fn html(&self, css: &[String], report: &CheckReport) -> LintResult<StepStatus> {
        let html = self.input.with_extension("html");
        if !needs_redo(&self.freshness_inputs(self.input), &[&html], self.options.force)? {
            return Ok(StepStatus::UpToDate { path: html });
        }
        let mut document = self.codec.read(self.input)?;
        if self.options.attach {
            document.push_str(&render_report(&report.results, &ReportStyle::html()));
        }
        let invocation = self
            .options
            .programs
            .md_to_html(css, self.options.self_contained)
            .stdin(document)
            .current_dir(self.dir);
        match execute(self.runner, &invocation) {
            Ok(output) => {
                self.codec.write(&html, &output.stdout)?;
                tracing::info!(path = %html, "exported HTML");
                Ok(StepStatus::Written { path: html })
            }
            Err(status) => Ok(status),
        }
    }

    #[tracing::instrument(skip_all)]
    fn pdf(&self, css: &[String]) -> LintResult<StepStatus> {
        let html = self.input.with_extension("html");
        let pdf = self.input.with_extension("pdf");
        if !html.exists() {
            tracing::warn!(path = %html, "no HTML to render");
            return Ok(StepStatus::Blocked { missing: html });
        }
        let mut inputs = self.freshness_inputs(&html);
        inputs.extend(local_sources(css, self.dir));
        if !needs_redo(&inputs, &[&pdf], self.options.force)? {
            return Ok(StepStatus::UpToDate { path: pdf });
        }
        let invocation = self
            .options
            .programs
            .html_to_pdf(self.options.figs_dpi, &html, &pdf)
            .current_dir(self.dir);
        Ok(match execute(self.runner, &invocation) {
            Ok(_) => {
                tracing::info!(path = %pdf, "exported PDF");
                StepStatus::Written { path: pdf }
            }
            Err(status) => status,
        })
    }
}

/// Run the whole pipeline on `options.input`.
///
/// # Errors
///
/// Returns an error when the input cannot be found, read or decoded, or when
/// an output file cannot be written.
#[tracing::instrument(skip_all, fields(input = %options.input))]
pub fn run(options: &RunOptions, runner: &dyn ToolRunner) -> LintResult<RunSummary> {
    let codec = TextCodec::for_label(&options.encoding)?;
    let input = resolve_input(&options.input)?;
    let dir = input
        .parent()
        .map_or_else(|| Utf8PathBuf::from("."), Utf8Path::to_path_buf);
    tracing::info!(input = %input, "checking abstract");

    let backup = if options.backup {
        run_backup(runner, &options.programs, &dir)
    } else {
        StepStatus::Skipped
    };

    let text = codec.read(&input)?;
    let analysis = Analysis::of(&text, &options.profile);
    let report = run_checks(&analysis, &options.profile.limits, &dir);
    tracing::debug!(outcome = ?report.outcome(), results = report.results.len(), "checks done");

    let fixed_path = output_path(&input, options.output.as_deref());
    let attachment = options
        .attach
        .then(|| render_report(&report.results, &ReportStyle::default()));
    let fixed = if write_fixed(&input, &fixed_path, attachment.as_deref(), &codec, options.force)? {
        StepStatus::Written { path: fixed_path }
    } else {
        StepStatus::UpToDate { path: fixed_path }
    };

    let mut summary = RunSummary {
        input: input.clone(),
        analysis,
        report,
        backup,
        fixed,
        css_written: None,
        css: Vec::new(),
        html: StepStatus::Skipped,
        pdf: StepStatus::Skipped,
    };

    let want_pdf = options.exports(ExportFormat::Pdf);
    if !(want_pdf || options.exports(ExportFormat::Html)) {
        return Ok(summary);
    }

    if options.css.is_none() {
        let css_path = dir.join(DEFAULT_CSS_FILE);
        let stamps: Vec<&Utf8Path> = options.tool_stamp.iter().map(|p| p.as_path()).collect();
        if write_default_css(&css_path, &stamps, &codec, options.force)? {
            summary.css_written = Some(css_path);
        }
    }
    summary.css = css_sources(options.css.as_deref());

    let exporter = Exporter {
        options,
        runner,
        codec,
        input: &input,
        dir: &dir,
    };
    summary.html = exporter.html(&summary.css, &summary.report)?;
    if want_pdf {
        summary.pdf = exporter.pdf(&summary.css)?;
    }
    Ok(summary)
}
