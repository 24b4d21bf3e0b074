//! Command lines for the external collaborators: version control backup,
//! Markdown to HTML, and HTML to PDF.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::runner::Invocation;

/// Commit message used for the pre-check backup.
pub const BACKUP_MESSAGE: &str = "Save before validation.";

/// Default image DPI for PDF export.
pub const DEFAULT_FIGS_DPI: u32 = 72;

/// Program names for each external step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPrograms {
    /// Version control program used for backups.
    pub vcs: String,
    /// Markdown to HTML converter.
    pub md2html: String,
    /// HTML to PDF converter.
    pub html2pdf: String,
}

impl Default for ToolPrograms {
    fn default() -> Self {
        Self {
            vcs: "git".to_string(),
            md2html: "pandoc".to_string(),
            html2pdf: "wkhtmltopdf".to_string(),
        }
    }
}

impl ToolPrograms {
    /// Commit every tracked, modified file.
    pub fn vcs_commit(&self) -> Invocation {
        Invocation::new(&self.vcs).args(["commit", "-uno", "-a", "-m", BACKUP_MESSAGE])
    }

    /// Convert Markdown on stdin to a standalone HTML5 page on stdout.
    pub fn md_to_html<S: AsRef<str>>(&self, css: &[S], self_contained: bool) -> Invocation {
        let mut invocation =
            Invocation::new(&self.md2html).args(["--standalone", "--mathjax", "--section-divs"]);
        for source in css {
            invocation = invocation.arg(format!("--css={}", source.as_ref()));
        }
        if self_contained {
            invocation = invocation.arg("--self-contained");
        }
        invocation.args(["--read", "markdown+tex_math_double_backslash", "--write", "html5"])
    }

    /// Render `html` to an A4 PDF at `pdf`.
    pub fn html_to_pdf(&self, dpi: u32, html: &Utf8Path, pdf: &Utf8Path) -> Invocation {
        let mut invocation = Invocation::new(&self.html2pdf).args(["--page-size", "A4"]);
        for side in ["bottom", "left", "right", "top"] {
            invocation = invocation.arg(format!("--margin-{side}")).arg("15mm");
        }
        invocation
            .args(["--javascript-delay", "2000", "--image-dpi"])
            .arg(dpi.to_string())
            .arg(html.as_str())
            .arg(pdf.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vcs_commit_command() {
        let inv = ToolPrograms::default().vcs_commit();
        assert_eq!(inv.program, "git");
        assert_eq!(inv.args, ["commit", "-uno", "-a", "-m", "Save before validation."]);
    }

    #[test]
    fn md_to_html_with_css_list() {
        let inv = ToolPrograms::default().md_to_html(&["https://x/f.css", "default.css"], true);
        assert_eq!(
            inv.command_line(),
            "pandoc --standalone --mathjax --section-divs --css=https://x/f.css \
             --css=default.css --self-contained --read markdown+tex_math_double_backslash \
             --write html5"
        );
    }

    #[test]
    fn md_to_html_without_css() {
        let none: [&str; 0] = [];
        let inv = ToolPrograms::default().md_to_html(&none, false);
        assert!(!inv.args.iter().any(|a| a.starts_with("--css")));
        assert!(!inv.args.contains(&"--self-contained".to_string()));
    }

    #[test]
    fn html_to_pdf_command() {
        let inv = ToolPrograms::default().html_to_pdf(
            150,
            Utf8Path::new("abs.html"),
            Utf8Path::new("abs.pdf"),
        );
        assert_eq!(
            inv.command_line(),
            "wkhtmltopdf --page-size A4 --margin-bottom 15mm --margin-left 15mm \
             --margin-right 15mm --margin-top 15mm --javascript-delay 2000 \
             --image-dpi 150 abs.html abs.pdf"
        );
    }

    #[test]
    fn program_names_are_configurable() {
        let programs = ToolPrograms {
            md2html: "/opt/pandoc/bin/pandoc".into(),
            ..ToolPrograms::default()
        };
        let none: [&str; 0] = [];
        assert_eq!(programs.md_to_html(&none, false).name(), "pandoc");
    }
}
