//! Locating and decoding the abstract source.

use camino::{Utf8Path, Utf8PathBuf};
use encoding_rs::Encoding;

use crate::error::{LintError, LintResult};

/// Default text encoding label.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Resolve the abstract to check.
///
/// A file path is used directly. A directory is expected to hold a Markdown
/// file named after it, e.g. `abstract/abstract.md`.
///
/// # Errors
///
/// Returns [`LintError::InputNotFound`] when no such file exists.
pub fn resolve_input(path: &Utf8Path) -> LintResult<Utf8PathBuf> {
    let not_found = || LintError::InputNotFound(path.to_path_buf());
    let candidate = if path.is_dir() {
        let dir = path.canonicalize_utf8().map_err(|_| not_found())?;
        let name = dir.file_name().ok_or_else(not_found)?;
        dir.join(format!("{name}.md"))
    } else {
        path.to_path_buf()
    };
    if !candidate.is_file() {
        return Err(LintError::InputNotFound(candidate));
    }
    candidate.canonicalize_utf8().map_err(|_| not_found())
}

/// Reads and writes text files in a configured encoding.
#[derive(Debug, Clone, Copy)]
pub struct TextCodec {
    encoding: &'static Encoding,
}

impl Default for TextCodec {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl TextCodec {
    /// Look up an encoding by its WHATWG label (`utf-8`, `latin1`, ...).
    ///
    /// # Errors
    ///
    /// Returns [`LintError::UnknownEncoding`] for unrecognized labels.
    pub fn for_label(label: &str) -> LintResult<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .map(|encoding| Self { encoding })
            .ok_or_else(|| LintError::UnknownEncoding(label.to_string()))
    }

    /// Canonical name of the encoding.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decode raw bytes read from `path`.
    pub fn decode(&self, bytes: &[u8], path: &Utf8Path) -> LintResult<String> {
        let (text, _, had_errors) = self.encoding.decode(bytes);
        if had_errors {
            return Err(LintError::Decode {
                path: path.to_path_buf(),
                encoding: self.name(),
            });
        }
        Ok(text.into_owned())
    }

    /// Decode bytes that are not under our control, such as tool output.
    pub fn decode_lossy(&self, bytes: &[u8]) -> String {
        self.encoding.decode(bytes).0.into_owned()
    }

    /// Encode text for writing.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let (bytes, _, had_errors) = self.encoding.encode(text);
        if had_errors {
            tracing::warn!(
                encoding = self.name(),
                "some characters are not representable and were replaced"
            );
        }
        bytes.into_owned()
    }

    /// Read and decode a whole file.
    pub fn read(&self, path: &Utf8Path) -> LintResult<String> {
        let bytes = std::fs::read(path.as_std_path()).map_err(|e| LintError::io(path, e))?;
        self.decode(&bytes, path)
    }

    /// Encode and write a whole file, replacing it.
    pub fn write(&self, path: &Utf8Path, text: &str) -> LintResult<()> {
        std::fs::write(path.as_std_path(), self.encode(text)).map_err(|e| LintError::io(path, e))
    }
}
