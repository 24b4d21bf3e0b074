//! Command implementations.

use abstract_lint_core::input::{TextCodec, resolve_input};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};

pub mod check;
pub mod count;
pub mod figures;
pub mod info;

/// Resolve an abstract path (file or `<dir>/<dir>.md`) and decode it.
///
/// Shared by the read-only commands; `check` goes through the pipeline instead.
pub fn read_abstract(path: &Utf8Path, encoding: &str) -> anyhow::Result<(Utf8PathBuf, String)> {
    let codec = TextCodec::for_label(encoding)?;
    let input = resolve_input(path)?;
    let text = codec
        .read(&input)
        .with_context(|| format!("failed to read {input}"))?;
    Ok((input, text))
}

/// Default input: the current directory, resolved as `<dir>/<dir>.md`.
pub fn input_or_cwd(input: Option<Utf8PathBuf>) -> Utf8PathBuf {
    input.unwrap_or_else(|| Utf8PathBuf::from("."))
}
