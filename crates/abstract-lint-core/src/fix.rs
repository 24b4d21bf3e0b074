//! The "fixed" copy of an abstract: normalized spacing, submission math
//! delimiters, and optionally the test report appended.

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::LintResult;
use crate::freshness::needs_redo;
use crate::input::TextCodec;

/// Substitutions applied in order to the source text.
///
/// Sentence-ending line breaks get trailing spaces so they survive as hard
/// breaks, and `\\(`, `\\)`, `\\[`, `\\]` become the submission system's
/// math delimiters.
pub const REPLACEMENTS: &[(&str, &str)] = &[
    (".\n\n", ".   \n\n"),
    (".\n", ". \n"),
    (r"\\(", "$$$"),
    (r"\\)", "$$$"),
    (r"\\[", "$$"),
    (r"\\]", "$$"),
];

/// Default output file name template; `{name}` is the input file name.
pub const OUTPUT_TEMPLATE: &str = "fix_{name}";

/// Apply [`REPLACEMENTS`] in sequence.
pub fn normalize(text: &str) -> String {
    REPLACEMENTS
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Where the fixed copy goes.
///
/// Without an explicit output the name is derived from [`OUTPUT_TEMPLATE`].
/// A bare file name is placed next to the input.
pub fn output_path(input: &Utf8Path, output: Option<&Utf8Path>) -> Utf8PathBuf {
    let name = input.file_name().unwrap_or_default();
    let path = output.map_or_else(
        || Utf8PathBuf::from(OUTPUT_TEMPLATE.replace("{name}", name)),
        Utf8Path::to_path_buf,
    );
    match (path.parent(), input.parent()) {
        (Some(parent), Some(input_dir)) if parent.as_str().is_empty() => input_dir.join(path),
        _ => path,
    }
}

/// Write the fixed copy of `input` to `output`, appending `attachment`.
///
/// Returns `false` when the output was already up to date.
#[tracing::instrument(skip(attachment, codec), fields(attach = attachment.is_some()))]
pub fn write_fixed(
    input: &Utf8Path,
    output: &Utf8Path,
    attachment: Option<&str>,
    codec: &TextCodec,
    force: bool,
) -> LintResult<bool> {
    if !needs_redo(&[input], &[output], force)? {
        tracing::debug!("fixed copy is up to date");
        return Ok(false);
    }
    let mut text = normalize(&codec.read(input)?);
    if let Some(attachment) = attachment {
        text.push('\n');
        text.push_str(attachment);
        text.push('\n');
    }
    codec.write(output, &text)?;
    tracing::info!(output = %output, "wrote fixed copy");
    Ok(true)
}
