//! Figure reference extraction.
//!
//! Three line-level forms are recognized:
//!
//! - reference definitions, `[1]: figs/a.png`
//! - referenced images, `[![alt][1]][1]`
//! - inline images, `![alt](figs/a.png)`
//!
//! Referenced images emit their label; a second pass swaps every label for
//! the URI of its definition, so definitions may appear before or after use.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::sections::split_lines;

struct FigurePatterns {
    definition: Regex,
    image_open: Regex,
    inline: Regex,
}

/// Tail of a referenced image, `][<label>]][<label>]`, matched at a `]`.
static REFERENCED_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\]\[(?P<label>[0-9]+)\]\]\[(?P<again>[0-9]+)\]").expect("valid regex")
});

impl FigurePatterns {
    fn new(anchored: bool) -> Self {
        let anchor = if anchored { "^" } else { "" };
        let compile =
            |pattern: &str| Regex::new(&format!("{anchor}{pattern}")).expect("valid regex");
        Self {
            definition: compile(r"\[(?P<label>[0-9]+)\]:(?P<uri>.*)"),
            image_open: compile(r"\[!\["),
            inline: compile(r"!\[.*\]\((?P<uri>.*)\)"),
        }
    }

    /// Label of a referenced image `[![alt][n]][n]` on `line`.
    ///
    /// The alt text may itself contain `][m]][k]`, so every tail after the
    /// opening `[![` is tried from the rightmost leftwards and the first one
    /// whose two labels agree wins.
    fn referenced_label<'t>(&self, line: &'t str) -> Option<&'t str> {
        let start = self.image_open.find(line)?.end();
        line.match_indices(']')
            .map(|(at, _)| at)
            .filter(|&at| at >= start)
            .rev()
            .find_map(|at| {
                let caps = REFERENCED_TAIL.captures(&line[at..])?;
                let label = caps.name("label")?.as_str();
                (caps.name("again")?.as_str() == label).then_some(label)
            })
    }
}

static ANCHORED: LazyLock<FigurePatterns> = LazyLock::new(|| FigurePatterns::new(true));
static UNANCHORED: LazyLock<FigurePatterns> = LazyLock::new(|| FigurePatterns::new(false));

/// Figures referenced by a document, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureList {
    /// Resolved figure URIs. Unresolved labels are kept verbatim.
    pub figures: Vec<String>,
    /// Labels used by referenced images that have no definition.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub unresolved: Vec<String>,
}

impl FigureList {
    /// Number of figure entries.
    pub fn len(&self) -> usize {
        self.figures.len()
    }

    /// Whether the document references no figures.
    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }
}

enum Entry {
    Uri(String),
    Label(String),
}

impl Entry {
    fn key(&self) -> &str {
        match self {
            Self::Uri(s) | Self::Label(s) => s,
        }
    }
}

/// Extract figure URIs from a document.
///
/// With `on_new_lines`, each form must start at the beginning of its line.
#[tracing::instrument(skip(text), fields(input_len = text.len()))]
pub fn find_figures(text: &str, on_new_lines: bool) -> FigureList {
    let patterns: &FigurePatterns = if on_new_lines { &ANCHORED } else { &UNANCHORED };

    let mut entries = Vec::new();
    let mut definitions: HashMap<String, String> = HashMap::new();
    for line in split_lines(text) {
        if let Some(label) = patterns.referenced_label(line) {
            entries.push(Entry::Label(label.to_string()));
        }
        if let Some(caps) = patterns.definition.captures(line) {
            definitions.insert(caps["label"].to_string(), caps["uri"].to_string());
        }
        if let Some(caps) = patterns.inline.captures(line) {
            entries.push(Entry::Uri(caps["uri"].to_string()));
        }
    }

    let mut list = FigureList::default();
    for entry in entries {
        if let Some(uri) = definitions.get(entry.key()) {
            list.figures.push(uri.trim().to_string());
            continue;
        }
        if let Entry::Label(ref label) = entry
            && !list.unresolved.contains(label)
        {
            tracing::warn!(label = %label, "figure reference has no definition");
            list.unresolved.push(label.clone());
        }
        list.figures.push(entry.key().to_string());
    }
    list
}
