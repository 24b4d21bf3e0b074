//! Section segmentation for Markdown abstracts.
//!
//! The splitter is a single forward scan over the document lines. It does not
//! parse Markdown: it recognizes ATX headings (`# `, `## `, ...), Setext
//! headings (a title line underlined by `==`/`--` of the same length) and
//! drops lines that start with a skip token (`#`, `!`, `[`), which covers
//! headings, images and reference definitions.
//!
//! Body lines that appear before the first heading are carried into the first
//! block, so they still count towards the word total.

use serde::{Deserialize, Serialize};

/// Line prefixes that open an ATX heading; the index is the heading level.
pub const HEADING_PREFIXES: &[&str] = &["# ", "## ", "### ", "#### ", "##### ", "###### "];

/// Underline tokens for Setext headings; the index is the heading level.
pub const UNDERLINE_TOKENS: &[&str] = &["==", "--"];

/// Lines starting with any of these never reach a block body.
pub const SKIP_TOKENS: &[&str] = &["#", "!", "["];

/// Characters that end a line: `\n`, `\r` (alone or before `\n`), vertical
/// tab, form feed, the file/group/record separators, NEL, and the Unicode
/// line and paragraph separators.
const fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Iterator returned by [`split_lines`].
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let Some((at, c)) = self.rest.char_indices().find(|&(_, c)| is_line_break(c)) else {
            return Some(std::mem::take(&mut self.rest));
        };
        let line = &self.rest[..at];
        let mut next = at + c.len_utf8();
        if c == '\r' && self.rest[next..].starts_with('\n') {
            next += 1;
        }
        self.rest = &self.rest[next..];
        Some(line)
    }
}

/// Split `text` into lines on every line break, not only `\n`.
///
/// A document saved with bare `\r` endings yields the same lines as its
/// `\n` twin. A trailing break does not produce an empty last line.
pub const fn split_lines(text: &str) -> Lines<'_> {
    Lines { rest: text }
}

/// A titled section of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Heading text, without the heading marker.
    pub title: String,
    /// Heading depth, 0 for top level.
    pub level: usize,
    /// Non-empty body lines between this heading and the next.
    pub text: Vec<String>,
    /// Number of whitespace-separated words in `text`.
    pub num_words: usize,
    /// Whether the block is excluded from the partial word count.
    pub skip: bool,
}

impl Block {
    fn open(title: impl Into<String>, level: usize) -> Self {
        Self {
            title: title.into(),
            level,
            ..Self::default()
        }
    }
}

/// Token tables used by the splitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionSyntax {
    /// Prefixes that open an ATX heading, shallowest first.
    pub heading_prefixes: Vec<String>,
    /// Tokens that underline a Setext heading, shallowest first.
    pub underline_tokens: Vec<String>,
    /// Prefixes of lines excluded from block bodies.
    pub skip_tokens: Vec<String>,
}

impl Default for SectionSyntax {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect();
        Self {
            heading_prefixes: owned(HEADING_PREFIXES),
            underline_tokens: owned(UNDERLINE_TOKENS),
            skip_tokens: owned(SKIP_TOKENS),
        }
    }
}

impl SectionSyntax {
    fn heading(&self, line: &str) -> Option<(usize, String)> {
        self.heading_prefixes
            .iter()
            .enumerate()
            .find_map(|(level, prefix)| line.strip_prefix(prefix.as_str()).map(|t| (level, t.to_string())))
    }

    fn is_skipped(&self, line: &str) -> bool {
        self.skip_tokens.iter().any(|token| line.starts_with(token.as_str()))
    }

    fn underline_level(&self, line: &str) -> Option<usize> {
        self.underline_tokens
            .iter()
            .position(|token| line.starts_with(token.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// No heading seen yet; body lines are held for the first block.
    OutsideBlock,
    /// At least one block is open; body lines belong to the last one.
    InBlock,
}

struct Splitter<'a> {
    syntax: &'a SectionSyntax,
    state: ScanState,
    blocks: Vec<Block>,
    body: Vec<String>,
    last_len: usize,
}

impl<'a> Splitter<'a> {
    const fn new(syntax: &'a SectionSyntax) -> Self {
        Self {
            syntax,
            state: ScanState::OutsideBlock,
            blocks: Vec::new(),
            body: Vec::new(),
            last_len: 0,
        }
    }

    fn open_block(&mut self, title: String, level: usize) {
        match self.state {
            ScanState::InBlock => self.close_block(),
            ScanState::OutsideBlock => self.state = ScanState::InBlock,
        }
        self.blocks.push(Block::open(title, level));
    }

    fn close_block(&mut self) {
        if let Some(block) = self.blocks.last_mut() {
            block.text = std::mem::take(&mut self.body);
        }
    }

    fn feed(&mut self, line: &str) {
        if let Some((level, title)) = self.syntax.heading(line) {
            self.open_block(title, level);
        }
        if self.syntax.is_skipped(line) {
            return;
        }

        let len = line.chars().count();
        let underline = if len == self.last_len {
            self.syntax.underline_level(line)
        } else {
            None
        };
        match underline.and_then(|level| self.body.pop().map(|title| (level, title))) {
            Some((level, title)) => self.open_block(title, level),
            None if !line.is_empty() => self.body.push(line.to_string()),
            None => {}
        }
        self.last_len = len;
    }

    fn finish(mut self) -> Vec<Block> {
        self.close_block();
        self.blocks
    }
}

/// Partition a document into blocks, one per heading, in document order.
///
/// A document without headings yields no blocks.
#[tracing::instrument(skip_all, fields(input_len = text.len()))]
pub fn split_sections(text: &str, syntax: &SectionSyntax) -> Vec<Block> {
    let mut splitter = Splitter::new(syntax);
    for line in split_lines(text) {
        splitter.feed(line);
    }
    let blocks = splitter.finish();
    tracing::debug!(blocks = blocks.len(), "split document into sections");
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<Block> {
        split_sections(text, &SectionSyntax::default())
    }

    fn titles(blocks: &[Block]) -> Vec<(&str, usize)> {
        blocks.iter().map(|b| (b.title.as_str(), b.level)).collect()
    }

    #[test]
    fn no_headings_yields_no_blocks() {
        assert!(split("Just some text.\nAnd more text.").is_empty());
        assert!(split("").is_empty());
    }

    #[test]
    fn atx_levels_are_zero_based() {
        let blocks = split("# One\n## Two\n###### Six\n");
        assert_eq!(titles(&blocks), vec![("One", 0), ("Two", 1), ("Six", 5)]);
    }

    #[test]
    fn body_lines_go_to_preceding_heading() {
        let blocks = split("# Intro\nfirst line\n\nsecond line\n## Methods\nthird line\n");
        assert_eq!(blocks[0].text, vec!["first line", "second line"]);
        assert_eq!(blocks[1].text, vec!["third line"]);
    }

    #[test]
    fn skip_token_lines_are_dropped() {
        let text = "# Results\n![fig](a.png)\n[1]: b.png\n#hashtag\nkept\n";
        let blocks = split(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, vec!["kept"]);
    }

    #[test]
    fn seven_hashes_is_not_a_heading() {
        let blocks = split("# Real\n####### not a heading\nbody\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, vec!["body"]);
    }

    #[test]
    fn setext_headings_use_underline_level() {
        let blocks = split("Title\n=====\nbody one\nMethods\n-------\nbody two\n");
        assert_eq!(titles(&blocks), vec![("Title", 0), ("Methods", 1)]);
        assert_eq!(blocks[0].text, vec!["body one"]);
        assert_eq!(blocks[1].text, vec!["body two"]);
    }

    #[test]
    fn mismatched_underline_is_body_text() {
        let blocks = split("# Intro\nTitle\n===\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, vec!["Title", "==="]);
    }

    #[test]
    fn underline_length_counts_characters() {
        let blocks = split("# Intro\nÜber\n====\n");
        assert_eq!(titles(&blocks), vec![("Intro", 0), ("Über", 0)]);
        assert!(blocks[0].text.is_empty());
    }

    #[test]
    fn underline_without_title_line_is_body_text() {
        // The ATX heading flushed the accumulator but kept the previous length.
        let blocks = split("# First\nabc\n# Heading\n===\n");
        assert_eq!(titles(&blocks), vec![("First", 0), ("Heading", 0)]);
        assert_eq!(blocks[0].text, vec!["abc"]);
        assert_eq!(blocks[1].text, vec!["==="]);
    }

    #[test]
    fn preamble_is_carried_into_first_block() {
        let blocks = split("preamble words\n# Intro\nbody\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, vec!["preamble words", "body"]);
    }

    #[test]
    fn lines_are_reproduced_in_order() {
        let text = "Title\n=====\nalpha beta\n\n# Intro\none\ntwo\n## Methods\nthree\n";
        let blocks = split(text);
        let mut rebuilt = Vec::new();
        for block in &blocks {
            rebuilt.push(block.title.clone());
            rebuilt.extend(block.text.iter().cloned());
        }
        assert_eq!(
            rebuilt,
            vec!["Title", "alpha beta", "Intro", "one", "two", "Methods", "three"]
        );
    }

    #[test]
    fn word_fields_start_unset() {
        let blocks = split("# Intro\nsome words here\n");
        assert_eq!(blocks[0].num_words, 0);
        assert!(!blocks[0].skip);
    }

    #[test]
    fn split_lines_handles_every_ending() {
        let lines: Vec<&str> = split_lines("a\nb\r\nc\rd\u{2028}e\x0cf\n").collect();
        assert_eq!(lines, vec!["a", "b", "c", "d", "e", "f"]);
        assert_eq!(split_lines("a\n\nb").collect::<Vec<_>>(), vec!["a", "", "b"]);
        assert_eq!(split_lines("").count(), 0);
        assert_eq!(split_lines("\r\n").collect::<Vec<_>>(), vec![""]);
    }

    #[test]
    fn carriage_return_document_is_split() {
        let blocks = split("# Intro\rsome words\r![a](a.png)\r## Next\rmore\r");
        assert_eq!(titles(&blocks), vec![("Intro", 0), ("Next", 1)]);
        assert_eq!(blocks[0].text, vec!["some words"]);
        assert_eq!(blocks[1].text, vec!["more"]);
    }

    #[test]
    fn crlf_setext_heading() {
        let blocks = split("Title\r\n=====\r\nbody\r\n");
        assert_eq!(titles(&blocks), vec![("Title", 0)]);
        assert_eq!(blocks[0].text, vec!["body"]);
    }
}
