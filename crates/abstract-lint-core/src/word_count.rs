//! Per-section word counting.

use serde::{Deserialize, Serialize};

use crate::sections::Block;

/// Sections whose words are excluded from the partial total by default.
pub const SKIP_SECTIONS: &[&str] = &[
    "Authors",
    "Synopsis",
    "References",
    "Acknowledgements",
    "Figure",
    "Table",
];

/// Blocks annotated with word counts, plus the two aggregate totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    /// Blocks with `num_words` and `skip` filled in.
    pub blocks: Vec<Block>,
    /// Words in blocks that are not skip-sections.
    pub partial: usize,
    /// Words in all blocks.
    pub full: usize,
}

/// Count whitespace-separated words in a block body. The title is not counted.
pub fn count_block_words(text: &[String]) -> usize {
    text.iter().map(|line| line.split_whitespace().count()).sum()
}

/// Annotate `blocks` with word counts and skip flags, and total them up.
///
/// A block is a skip-section when its title contains any of `skip_sections`
/// as a substring.
pub fn count_words<S: AsRef<str>>(mut blocks: Vec<Block>, skip_sections: &[S]) -> WordCount {
    let mut partial = 0;
    let mut full = 0;
    for block in &mut blocks {
        block.num_words = count_block_words(&block.text);
        block.skip = skip_sections
            .iter()
            .any(|name| block.title.contains(name.as_ref()));
        if !block.skip {
            partial += block.num_words;
        }
        full += block.num_words;
    }
    WordCount {
        blocks,
        partial,
        full,
    }
}
