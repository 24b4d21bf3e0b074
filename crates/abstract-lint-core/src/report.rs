//! Rendering check results as a Markdown section.
//!
//! Plain mode emits the result lines as-is, for the fixed Markdown copy. HTML
//! mode wraps each line in a `<span>` whose class (`green`/`red`) is picked up
//! by the export stylesheet.

use crate::checks::{Outcome, TestResult, Verdict, outcome_of};
use crate::sections::HEADING_PREFIXES;

/// How the report heading is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingStyle {
    /// ATX heading of the given depth, 1 to 6.
    Atx(usize),
    /// Title underlined with `-`.
    Underlined,
    /// Title on its own line, no markup.
    Bare,
}

/// Options for [`render_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStyle {
    /// Section title.
    pub title: String,
    /// Summary template; `{result}` is replaced by `OK` or `ERR`.
    pub summary: String,
    /// Heading markup.
    pub heading: HeadingStyle,
    /// Text placed before each result line.
    pub prefix: String,
    /// Text placed after each result line.
    pub suffix: String,
    /// Wrap lines in class-tagged spans.
    pub use_html: bool,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            title: "Test Results".to_string(),
            summary: "Final Result: {result}".to_string(),
            heading: HeadingStyle::Atx(2),
            prefix: String::new(),
            suffix: String::new(),
            use_html: false,
        }
    }
}

impl ReportStyle {
    /// The default style with HTML markup enabled.
    pub fn html() -> Self {
        Self {
            use_html: true,
            ..Self::default()
        }
    }
}

/// CSS class for a verdict in HTML mode.
pub const fn css_class(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "green",
        Verdict::Fail => "red",
        Verdict::Info => "",
    }
}

fn heading(style: &ReportStyle) -> String {
    let title = &style.title;
    match style.heading {
        HeadingStyle::Atx(depth) => {
            let index = depth.clamp(1, HEADING_PREFIXES.len()) - 1;
            format!("{}{title}\n", HEADING_PREFIXES[index])
        }
        HeadingStyle::Underlined => {
            format!("{title}\n{}\n", "-".repeat(title.chars().count()))
        }
        HeadingStyle::Bare => format!("{title}\n"),
    }
}

/// Render results as Markdown: heading, one line per result, and a summary.
///
/// The summary is omitted when there are no results.
pub fn render_report(results: &[TestResult], style: &ReportStyle) -> String {
    let mut text = String::from("\n\n");
    text.push_str(&heading(style));

    let (prefix, suffix) = (&style.prefix, &style.suffix);
    if style.use_html {
        for result in results {
            text.push_str(&format!(
                "{prefix}- <span class=\"{}\">{}</span>{suffix}\n",
                css_class(result.verdict),
                result.description.replace(' ', "&nbsp;"),
            ));
        }
    } else {
        let lines: Vec<String> = results
            .iter()
            .map(|r| format!("{prefix}{}{suffix}", r.description))
            .collect();
        text.push_str(&lines.join("\n"));
    }
    text.push('\n');

    let Some(last) = results.last() else {
        return text;
    };
    let passed = outcome_of(results.iter().map(|r| r.verdict)) != Outcome::Failed;
    let summary = style
        .summary
        .replace("{result}", if passed { "OK" } else { "ERR" });
    text.push('\n');
    if style.use_html {
        let class = if passed { "green" } else { "red" };
        text.push_str(&format!("<span class=\"{class}\">{summary}</span>"));
    } else {
        let width = last.description.chars().count();
        text.push_str(&format!("{summary:>width$}"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TestResult> {
        vec![
            TestResult::new(Verdict::Pass, "Word Count Total"),
            TestResult::new(Verdict::Info, "Word Count: Methods"),
            TestResult::new(Verdict::Fail, "Number of figures"),
        ]
    }

    fn non_blank(text: &str) -> Vec<&str> {
        text.lines().filter(|l| !l.trim().is_empty()).collect()
    }

    #[test]
    fn plain_has_title_results_and_summary() {
        let results = sample();
        let text = render_report(&results, &ReportStyle::default());
        let lines = non_blank(&text);
        assert_eq!(lines.len(), results.len() + 2);
        assert_eq!(lines[0], "## Test Results");
        assert_eq!(lines[1], results[0].description);
        assert!(lines.last().unwrap().ends_with("Final Result: ERR"));
    }

    #[test]
    fn plain_summary_is_right_aligned() {
        let results = vec![TestResult::new(Verdict::Pass, "ok")];
        let text = render_report(&results, &ReportStyle::default());
        let summary = text.lines().last().unwrap();
        assert_eq!(summary.chars().count(), results[0].description.chars().count());
        assert!(summary.trim_start().starts_with("Final Result: OK"));
    }

    #[test]
    fn html_wraps_every_line_with_verdict_class() {
        let results = sample();
        let text = render_report(&results, &ReportStyle::html());
        let spans: Vec<&str> = text.lines().filter(|l| l.starts_with("- <span")).collect();
        assert_eq!(spans.len(), results.len());
        assert!(spans[0].starts_with("- <span class=\"green\">"));
        assert!(spans[1].starts_with("- <span class=\"\">"));
        assert!(spans[2].starts_with("- <span class=\"red\">"));
        assert!(spans[0].contains("I:&nbsp;Word&nbsp;Count&nbsp;Total"));
        assert!(text.ends_with("<span class=\"red\">Final Result: ERR</span>"));
    }

    #[test]
    fn informational_results_do_not_fail_the_summary() {
        let results = vec![
            TestResult::new(Verdict::Info, "note"),
            TestResult::new(Verdict::Pass, "gate"),
        ];
        let text = render_report(&results, &ReportStyle::html());
        assert!(text.ends_with("<span class=\"green\">Final Result: OK</span>"));
    }

    #[test]
    fn empty_results_have_no_summary() {
        let text = render_report(&[], &ReportStyle::default());
        assert_eq!(non_blank(&text), vec!["## Test Results"]);
    }

    #[test]
    fn heading_styles() {
        let style = |heading| ReportStyle {
            heading,
            ..ReportStyle::default()
        };
        assert!(render_report(&[], &style(HeadingStyle::Atx(1))).contains("\n# Test Results\n"));
        assert!(
            render_report(&[], &style(HeadingStyle::Underlined))
                .contains("Test Results\n------------\n")
        );
        assert!(render_report(&[], &style(HeadingStyle::Bare)).ends_with("\nTest Results\n\n"));
    }

    #[test]
    fn prefix_and_suffix_wrap_lines() {
        let style = ReportStyle {
            prefix: "> ".to_string(),
            suffix: "  ".to_string(),
            ..ReportStyle::default()
        };
        let results = vec![TestResult::new(Verdict::Pass, "x")];
        let text = render_report(&results, &style);
        assert!(text.contains(&format!("> {}  \n", results[0].description)));
    }
}
