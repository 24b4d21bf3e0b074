//! Constraint checks against a submission profile.
//!
//! Every check yields a [`TestResult`]: a ternary [`Verdict`] plus the fixed
//! width line shown in the terminal and in the attached report.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::figures::{FigureList, find_figures};
use crate::profile::{Limits, Profile};
use crate::sections::split_sections;
use crate::word_count::{WordCount, count_words};

/// Marker for informational results and for sections without a limit.
pub const GLYPH: &str = "⋆";

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The constraint holds.
    Pass,
    /// The constraint is violated.
    Fail,
    /// Reported for reference only; never affects the aggregate.
    Info,
}

impl Verdict {
    /// Build a verdict from a pass/fail condition.
    pub const fn from_bool(ok: bool) -> Self {
        if ok { Self::Pass } else { Self::Fail }
    }

    /// The verdict as a tri-state condition, `None` for informational results.
    pub const fn condition(self) -> Option<bool> {
        match self {
            Self::Pass => Some(true),
            Self::Fail => Some(false),
            Self::Info => None,
        }
    }

    const fn mode(self) -> &'static str {
        match self {
            Self::Pass => "I",
            Self::Fail => "E",
            Self::Info => GLYPH,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Pass => "OK",
            Self::Fail => "ERR",
            Self::Info => " ",
        }
    }
}

/// A verdict and its human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// Pass, fail, or informational.
    pub verdict: Verdict,
    /// Fixed-width description line, e.g. `I: Word Count Total ... OK`.
    pub description: String,
}

impl TestResult {
    /// Format a result line for `text` under `verdict`.
    pub fn new(verdict: Verdict, text: &str) -> Self {
        Self {
            verdict,
            description: format!("{}: {text:64} {:.>6}", verdict.mode(), verdict.label()),
        }
    }
}

/// Aggregate decision over a set of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// At least one gate ran and none failed.
    Passed,
    /// At least one gate failed.
    Failed,
    /// No pass/fail gate ran at all.
    NoChecks,
}

/// The parsed view of a document that the checks run on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// Sections with word counts and totals.
    pub word_count: WordCount,
    /// Figures referenced by the document.
    pub figures: FigureList,
}

impl Analysis {
    /// Split, count and extract figures from a decoded document.
    #[tracing::instrument(skip_all, fields(input_len = text.len()))]
    pub fn of(text: &str, profile: &Profile) -> Self {
        let blocks = split_sections(text, &profile.syntax);
        Self {
            word_count: count_words(blocks, &profile.skip_sections),
            figures: find_figures(text, profile.figures_on_new_lines),
        }
    }
}

/// All check results for one document, in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    /// Individual results.
    pub results: Vec<TestResult>,
    /// Number of blocks recognized as figure captions.
    pub captions: usize,
}

impl CheckReport {
    fn record(&mut self, verdict: Verdict, text: &str) {
        let result = TestResult::new(verdict, text);
        tracing::debug!(verdict = ?result.verdict, description = %result.description, "check");
        self.results.push(result);
    }

    /// Description lines, parallel to [`CheckReport::verdicts`].
    pub fn descriptions(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.description.as_str()).collect()
    }

    /// Verdicts, parallel to [`CheckReport::descriptions`].
    pub fn verdicts(&self) -> Vec<Verdict> {
        self.results.iter().map(|r| r.verdict).collect()
    }

    /// Aggregate outcome; informational results are ignored.
    pub fn outcome(&self) -> Outcome {
        outcome_of(self.results.iter().map(|r| r.verdict))
    }

    /// True unless some gate failed. Also true when no gate ran.
    pub fn passed(&self) -> bool {
        self.outcome() != Outcome::Failed
    }
}

/// Aggregate a sequence of verdicts.
pub fn outcome_of(verdicts: impl IntoIterator<Item = Verdict>) -> Outcome {
    let mut outcome = Outcome::NoChecks;
    for verdict in verdicts {
        match verdict {
            Verdict::Fail => return Outcome::Failed,
            Verdict::Pass => outcome = Outcome::Passed,
            Verdict::Info => {}
        }
    }
    outcome
}

fn line(label: &str, value: &str) -> String {
    format!("{label:<48}  {value:>18}")
}

fn ratio(value: impl std::fmt::Display, limit: impl std::fmt::Display) -> String {
    format!("{value:>8} / {limit:<7}")
}

fn megabytes(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / 1e6)
}

/// Resolve a figure URI to a filesystem path: `~` is expanded and relative
/// paths are taken from `base_dir`.
pub fn figure_path(uri: &str, base_dir: &Utf8Path) -> Utf8PathBuf {
    let expanded = shellexpand::tilde(uri);
    base_dir.join(expanded.as_ref())
}

/// Size in bytes of the regular file at `path`, `None` when it is missing or
/// not a file.
pub fn figure_size(path: &Utf8Path) -> Option<u64> {
    std::fs::metadata(path.as_std_path())
        .ok()
        .filter(std::fs::Metadata::is_file)
        .map(|meta| meta.len())
}

/// Run every constraint check on an analyzed document.
///
/// Figure files are looked up relative to `base_dir`.
#[tracing::instrument(skip(analysis, limits), fields(blocks = analysis.word_count.blocks.len()))]
pub fn run_checks(analysis: &Analysis, limits: &Limits, base_dir: &Utf8Path) -> CheckReport {
    let mut report = CheckReport::default();
    let wc = &analysis.word_count;

    report.record(
        Verdict::from_bool(wc.partial <= limits.wc_tot),
        &line(
            &format!("Word Count Total ({GLYPH})"),
            &ratio(wc.partial, limits.wc_tot),
        ),
    );

    for block in wc.blocks.iter().filter(|b| b.num_words > 0) {
        let (verdict, limit, marker) = if block.title == "Synopsis" {
            let ok = block.num_words <= limits.wc_synopsis;
            (Verdict::from_bool(ok), limits.wc_synopsis.to_string(), "")
        } else if block.title.starts_with("Figure") {
            report.captions += 1;
            let ok = block.num_words <= limits.wc_fig;
            (Verdict::from_bool(ok), limits.wc_fig.to_string(), "")
        } else if block.skip {
            (Verdict::Info, "0".to_string(), "")
        } else {
            (Verdict::Info, GLYPH.to_string(), GLYPH)
        };
        report.record(
            verdict,
            &line(
                &format!("Word Count: {}{marker}", block.title),
                &ratio(block.num_words, limit),
            ),
        );
    }

    let n_figs = analysis.figures.len();
    for (count, label) in [(n_figs, "figures"), (report.captions, "captions")] {
        report.record(
            Verdict::from_bool(count <= limits.n_figs),
            &line(&format!("Number of {label}"), &ratio(count, limits.n_figs)),
        );
    }

    let matching = n_figs == report.captions;
    report.record(
        Verdict::from_bool(matching),
        &line(
            "Matching number of figures and captions",
            &format!(
                "{n_figs:>8} {} {:<7}",
                if matching { "=" } else { "≠" },
                report.captions
            ),
        ),
    );

    for uri in &analysis.figures.figures {
        let path = figure_path(uri, base_dir);
        let label = format!("\"{}\"", uri.chars().take(46).collect::<String>());
        let (verdict, value) = match figure_size(&path) {
            Some(size) => (
                Verdict::from_bool(size <= limits.fig_size),
                ratio(megabytes(size), megabytes(limits.fig_size)),
            ),
            None => {
                tracing::debug!(figure = %path, "figure file not found");
                (Verdict::Fail, "NOT FOUND!".to_string())
            }
        };
        report.record(verdict, &line(&label, &value));
    }

    tracing::info!(
        results = report.results.len(),
        outcome = ?report.outcome(),
        "constraint checks complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn check(text: &str, limits: &Limits) -> CheckReport {
        let analysis = Analysis::of(text, &Profile::default());
        run_checks(&analysis, limits, Utf8Path::new("."))
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn total_word_limit_is_inclusive() {
        let limits = Limits::default();
        let at_limit = check(&format!("# Introduction\n{}\n", words(750)), &limits);
        assert_eq!(at_limit.results[0].verdict, Verdict::Pass);

        let over = check(&format!("# Introduction\n{}\n", words(751)), &limits);
        assert_eq!(over.results[0].verdict, Verdict::Fail);
        assert_eq!(over.outcome(), Outcome::Failed);
    }

    #[test]
    fn figure_caption_mismatch_is_reported() {
        let text = "# Intro\ntext\n![a](a.png)\n![b](b.png)\n![c](c.png)\n\
                    ## Figure 1\ncap one\n## Figure 2\ncap two\n";
        let report = check(text, &Limits::default());
        let matching = report
            .results
            .iter()
            .find(|r| r.description.contains("Matching number"))
            .unwrap();
        assert_eq!(matching.verdict, Verdict::Fail);
        assert!(matching.description.contains("3 ≠ 2"), "{}", matching.description);
        assert_eq!(report.captions, 2);
    }

    #[test]
    fn matching_counts_use_equals_marker() {
        let report = check("# Intro\ntext\n", &Limits::default());
        let matching = report
            .results
            .iter()
            .find(|r| r.description.contains("Matching number"))
            .unwrap();
        assert_eq!(matching.verdict, Verdict::Pass);
        assert!(matching.description.contains("0 = 0"));
    }

    #[test]
    fn synopsis_and_caption_limits() {
        let limits = Limits {
            wc_synopsis: 3,
            wc_fig: 2,
            ..Limits::default()
        };
        let text = "## Synopsis\none two three four\n## Figure 1\nshort cap\n";
        let report = check(text, &limits);
        let synopsis = &report.results[1];
        assert!(synopsis.description.contains("Word Count: Synopsis"));
        assert_eq!(synopsis.verdict, Verdict::Fail);
        let caption = &report.results[2];
        assert_eq!(caption.verdict, Verdict::Pass);
    }

    #[test]
    fn ordinary_sections_are_informational() {
        let report = check("# Methods\nsome words\n## Authors\nA. Person\n", &Limits::default());
        let methods = &report.results[1];
        assert_eq!(methods.verdict, Verdict::Info);
        assert!(methods.description.starts_with(GLYPH));
        assert!(methods.description.contains(&format!("Methods{GLYPH}")));
        let authors = &report.results[2];
        assert_eq!(authors.verdict, Verdict::Info);
        assert!(!authors.description.contains(&format!("Authors{GLYPH}")));
    }

    #[test]
    fn empty_sections_are_not_listed() {
        let report = check("# Empty\n# Full\nwords here\n", &Limits::default());
        assert!(!report.descriptions().iter().any(|d| d.contains("Empty")));
        assert!(report.descriptions().iter().any(|d| d.contains("Full")));
    }

    #[test]
    fn missing_figure_fails_without_error() {
        let report = check("# Intro\n[![x][1]][1]\n", &Limits::default());
        let last = report.results.last().unwrap();
        assert_eq!(last.verdict, Verdict::Fail);
        assert!(last.description.contains("\"1\""));
        assert!(last.description.contains("NOT FOUND!"));
    }

    #[test]
    fn figure_size_is_checked_relative_to_base_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("small.png"), vec![0u8; 10]).unwrap();
        fs::write(tmp.path().join("big.png"), vec![0u8; 200]).unwrap();
        let base = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();

        let limits = Limits {
            fig_size: 100,
            ..Limits::default()
        };
        let analysis = Analysis::of(
            "# Intro\n![s](small.png)\n![b](big.png)\n",
            &Profile::default(),
        );
        let report = run_checks(&analysis, &limits, &base);
        let n = report.results.len();
        assert_eq!(report.results[n - 2].verdict, Verdict::Pass);
        assert_eq!(report.results[n - 1].verdict, Verdict::Fail);
        assert!(report.results[n - 1].description.contains("MB"));
    }

    #[test]
    fn description_layout() {
        let result = TestResult::new(Verdict::Pass, "abc");
        assert!(result.description.starts_with("I: abc "));
        assert!(result.description.ends_with("....OK"));
        assert_eq!(result.description.chars().count(), 3 + 64 + 1 + 6);

        let info = TestResult::new(Verdict::Info, "abc");
        assert!(info.description.ends_with("..... "));
    }

    #[test]
    fn outcome_ignores_informational() {
        assert_eq!(outcome_of([Verdict::Info, Verdict::Pass]), Outcome::Passed);
        assert_eq!(outcome_of([Verdict::Info]), Outcome::NoChecks);
        assert_eq!(outcome_of([]), Outcome::NoChecks);
        assert_eq!(outcome_of([Verdict::Pass, Verdict::Fail]), Outcome::Failed);
    }

    #[test]
    fn verdict_condition_round_trip() {
        assert_eq!(Verdict::Pass.condition(), Some(true));
        assert_eq!(Verdict::Fail.condition(), Some(false));
        assert_eq!(Verdict::Info.condition(), None);
    }

    #[test]
    fn figure_size_only_counts_regular_files() {
        let tmp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        fs::write(dir.join("fig.png"), [0u8; 10]).unwrap();
        assert_eq!(figure_size(&dir.join("fig.png")), Some(10));
        assert_eq!(figure_size(&dir.join("gone.png")), None);
        assert_eq!(figure_size(&dir), None);
    }
}
