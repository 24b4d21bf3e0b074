//! Check command: the full run. Backup, checks, fixed copy, and exports.

use std::time::Instant;

use abstract_lint_core::config::{Config, Verbosity};
use abstract_lint_core::input::{TextCodec, resolve_input};
use abstract_lint_core::pipeline::{self, ExportFormat, RunSummary, StepStatus};
use abstract_lint_core::{SystemRunner, Verdict};
use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use super::input_or_cwd;
use crate::progress::{ProgressConfig, SpinnerRunner};

/// Arguments for the `check` subcommand.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Abstract file, or a directory holding `<dir>.md` [default: .]
    #[arg(value_name = "PATH")]
    pub input: Option<Utf8PathBuf>,

    /// Where to write the fixed copy [default: fix_<name> next to the input]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,

    /// Export formats (comma-separated or repeated)
    #[arg(short = 'x', long, value_enum, value_delimiter = ',')]
    pub export: Option<Vec<ExportFormat>>,

    /// Skip HTML and PDF export
    #[arg(long, conflicts_with = "export")]
    pub no_export: bool,

    /// Do not append the report to the fixed copy and HTML export
    #[arg(long)]
    pub no_attach: bool,

    /// Do not commit tracked changes before checking
    #[arg(long)]
    pub no_backup: bool,

    /// Do not write `.{tool}.{out,err}.log` files
    #[arg(long)]
    pub no_tool_logs: bool,

    /// CSS source for export (repeatable); replaces the default stylesheet
    #[arg(long, value_name = "SRC")]
    pub css: Vec<String>,

    /// Inline all resources in the HTML export
    #[arg(short, long)]
    pub self_contained: bool,

    /// Text encoding of the input and outputs (e.g. utf-8, latin1)
    #[arg(short, long, value_name = "LABEL")]
    pub encoding: Option<String>,

    /// Regenerate outputs even when up to date
    #[arg(short, long)]
    pub force: bool,

    /// Image DPI for PDF export
    #[arg(long, value_name = "DPI")]
    pub dpi: Option<u32>,

    /// Kill external tools after SECS seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Exit with an error when a check fails
    #[arg(long)]
    pub strict: bool,

    /// Output tier before -v/-q adjustments
    #[arg(long, value_enum, value_name = "TIER")]
    pub verbosity: Option<Verbosity>,
}

/// Terminal output gated by verbosity tier.
struct Printer {
    verbosity: Verbosity,
}

impl Printer {
    fn enabled(&self, tier: Verbosity) -> bool {
        self.verbosity != Verbosity::None && self.verbosity >= tier
    }

    /// Print `text`, colouring its first word by the `I:`/`W:`/`E:` convention.
    fn msg(&self, tier: Verbosity, text: &str) {
        if !self.enabled(tier) {
            return;
        }
        let (head, rest) = text.split_once(' ').unwrap_or((text, ""));
        let head = match head {
            "I:" => head.green().to_string(),
            "W:" => head.yellow().to_string(),
            "E:" => head.red().to_string(),
            _ => head.bold().to_string(),
        };
        println!("{head} {rest}");
    }

    fn step(&self, label: &str, what: &str, status: &StepStatus) {
        let text = match status {
            StepStatus::Skipped => return,
            StepStatus::Done => format!("I: {what} done."),
            StepStatus::Written { path } => format!("{label}: {path}"),
            StepStatus::UpToDate { path } => format!("{label}: {path} (up to date)"),
            StepStatus::Unavailable { program } => {
                format!("W: cannot {what} without `{program}`.")
            }
            StepStatus::Failed { program, code } => match code {
                Some(code) => format!("W: `{program}` failed (Returned: {code})."),
                None => format!("W: `{program}` failed."),
            },
            StepStatus::TimedOut { program, seconds } => {
                format!("W: `{program}` timed out after {seconds}s.")
            }
            StepStatus::Blocked { missing } => {
                format!("W: cannot {what}, `{missing}` is missing.")
            }
        };
        self.msg(Verbosity::Lowest, &text);
    }

    fn backup(&self, status: &StepStatus) {
        let reason = match status {
            StepStatus::Skipped => return,
            StepStatus::Done => {
                self.msg(Verbosity::Lowest, "I: Your VCS has been updated.");
                return;
            }
            StepStatus::Unavailable { program } => format!("(`{program}` not found)"),
            StepStatus::Failed {
                code: Some(code), ..
            } => format!("(Returned: {code})"),
            StepStatus::TimedOut { seconds, .. } => format!("(timed out after {seconds}s)"),
            _ => String::new(),
        };
        self.msg(
            Verbosity::Lowest,
            &format!("W: VCS backup failed {reason}.").replace(" .", "."),
        );
    }

    fn summary(&self, summary: &RunSummary) {
        if self.enabled(Verbosity::High) {
            for uri in &summary.analysis.figures.figures {
                self.msg(Verbosity::High, &format!("Figure: {uri}"));
            }
        }
        for result in &summary.report.results {
            if !self.enabled(Verbosity::Lowest) {
                break;
            }
            let line = &result.description;
            match result.verdict {
                Verdict::Pass => println!("{}", line.green()),
                Verdict::Fail => println!("{}", line.red()),
                Verdict::Info => println!("{line}"),
            }
        }

        self.step("Output", "write the fixed copy", &summary.fixed);
        if let Some(ref css) = summary.css_written {
            self.msg(
                Verbosity::Lowest,
                &format!("W: CSS `{css}` may have been overwritten."),
            );
        }
        if !summary.css.is_empty() {
            self.msg(
                Verbosity::Medium,
                &format!("CSS: {}", summary.css.join(", ")),
            );
        }
        self.step("HTML", "export HTML", &summary.html);
        self.step("PDF", "export PDF", &summary.pdf);

        if !summary.passed() && self.enabled(Verbosity::Lowest) {
            println!("{}", "WARNING! SOME TESTS HAVE FAILED!".red().bold());
        }
    }
}

/// Resolve the effective tier: `--verbosity` or config, raised by `-v`,
/// silenced by `-q`.
pub fn effective_verbosity(
    requested: Option<Verbosity>,
    configured: Verbosity,
    quiet: bool,
    verbose: u8,
) -> Verbosity {
    if quiet {
        return Verbosity::None;
    }
    requested.unwrap_or(configured).raised(verbose)
}

/// Run the full check on an abstract.
#[instrument(name = "cmd_check", skip_all, fields(input = ?args.input))]
pub fn cmd_check(
    args: CheckArgs,
    global_json: bool,
    quiet: bool,
    verbose: u8,
    config: &Config,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let verbosity = effective_verbosity(args.verbosity, config.verbosity, quiet, verbose);
    let printer = Printer {
        verbosity: if global_json {
            Verbosity::None
        } else {
            verbosity
        },
    };

    let mut options = config.run_options(input_or_cwd(args.input));
    options.output = args.output;
    if args.no_export {
        options.export.clear();
    } else if let Some(export) = args.export {
        options.export = export;
    }
    options.attach &= !args.no_attach;
    options.backup &= !args.no_backup;
    if !args.css.is_empty() {
        options.css = Some(args.css);
    }
    options.self_contained |= args.self_contained;
    if let Some(encoding) = args.encoding {
        options.encoding = encoding;
    }
    options.force |= args.force;
    if let Some(dpi) = args.dpi {
        options.figs_dpi = dpi;
    }
    options.tool_stamp = std::env::current_exe()
        .ok()
        .and_then(|exe| Utf8PathBuf::try_from(exe).ok());
    let strict = args.strict || config.strict;
    let timeout = args
        .timeout
        .map(std::time::Duration::from_secs)
        .or_else(|| config.tool_timeout());

    debug!(?options, %verbosity, strict, ?timeout, "executing check command");
    printer.msg(
        Verbosity::Lower,
        &format!(
            "{} {}: {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_DESCRIPTION")
        ),
    );
    if printer.enabled(Verbosity::Debug) {
        println!("{}", format!("Options: {options:#?}").dimmed());
    }

    let codec = TextCodec::for_label(&options.encoding)?;
    let system = SystemRunner::new()
        .with_timeout(timeout)
        .with_logs(config.log_tools && !args.no_tool_logs)
        .with_codec(codec);
    let progress = ProgressConfig::new(quiet || global_json || verbosity == Verbosity::None);
    let runner = SpinnerRunner::new(&system, progress);

    let input = resolve_input(&options.input)
        .with_context(|| format!("failed to check {}", options.input))?;
    printer.msg(Verbosity::Lowest, &format!("Input: {input}"));
    let summary =
        pipeline::run(&options, &runner).with_context(|| format!("failed to check {input}"))?;

    printer.backup(&summary.backup);
    printer.summary(&summary);
    if global_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    if printer.enabled(Verbosity::Debug) {
        println!("{}", format!("ExecTime: {:?}", started.elapsed()).dimmed());
    }

    if strict && !summary.passed() {
        bail!("{} failed submission checks", summary.input);
    }
    Ok(())
}
