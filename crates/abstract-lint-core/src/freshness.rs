//! Modification-time based re-computation avoidance.

use std::time::SystemTime;

use camino::Utf8Path;

use crate::error::{LintError, LintResult};

fn modified(path: &Utf8Path) -> LintResult<SystemTime> {
    std::fs::metadata(path.as_std_path())
        .and_then(|meta| meta.modified())
        .map_err(|e| LintError::io(path, e))
}

/// Decide whether outputs must be regenerated from inputs.
///
/// Returns `true` when `force` is set, when any output is missing, or when any
/// input is newer than any output.
///
/// # Errors
///
/// Fails when `inputs` is empty or an input does not exist.
pub fn needs_redo<I, O>(inputs: &[I], outputs: &[O], force: bool) -> LintResult<bool>
where
    I: AsRef<Utf8Path>,
    O: AsRef<Utf8Path>,
{
    if inputs.is_empty() {
        return Err(LintError::NoFreshnessInputs);
    }
    for input in inputs {
        let input = input.as_ref();
        if !input.exists() {
            return Err(LintError::FreshnessInputMissing(input.to_path_buf()));
        }
    }
    if force {
        return Ok(true);
    }
    if outputs.iter().any(|p| !p.as_ref().exists()) {
        return Ok(true);
    }

    for input in inputs {
        let input_time = modified(input.as_ref())?;
        for output in outputs {
            if input_time > modified(output.as_ref())? {
                tracing::debug!(input = %input.as_ref(), output = %output.as_ref(), "input is newer");
                return Ok(true);
            }
        }
    }
    Ok(false)
}
