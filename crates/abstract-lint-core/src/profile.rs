//! Submission profile: the limits and token tables an abstract is checked against.
//!
//! The defaults match the ISMRM 2017 (Honolulu) abstract rules.

use serde::{Deserialize, Serialize};

use crate::sections::SectionSyntax;
use crate::word_count::SKIP_SECTIONS;

/// Numeric thresholds for the constraint checks. All comparisons are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum words outside skip-sections.
    pub wc_tot: usize,
    /// Maximum words in the `Synopsis` section.
    pub wc_synopsis: usize,
    /// Maximum words in each figure caption.
    pub wc_fig: usize,
    /// Maximum number of figures (and of captions).
    pub n_figs: usize,
    /// Maximum figure file size in bytes.
    pub fig_size: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            wc_tot: 750,
            wc_synopsis: 100,
            wc_fig: 100,
            n_figs: 5,
            fig_size: 2_000_000,
        }
    }
}

/// Everything the parser and checker need, passed around as one immutable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Constraint thresholds.
    pub limits: Limits,
    /// Heading and skip token tables.
    pub syntax: SectionSyntax,
    /// Title substrings that exclude a section from the partial word count.
    pub skip_sections: Vec<String>,
    /// Only recognize figures that start their own line.
    pub figures_on_new_lines: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            syntax: SectionSyntax::default(),
            skip_sections: SKIP_SECTIONS.iter().map(|s| (*s).to_string()).collect(),
            figures_on_new_lines: true,
        }
    }
}
