//! Running external programs.
//!
//! [`ToolRunner`] is the seam between the pipeline and the outside world:
//! the pipeline only asks whether a program is available and runs it to
//! completion. [`SystemRunner`] is the real implementation; tests substitute
//! their own.

use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{LintError, LintResult};
use crate::input::TextCodec;

/// Log file name template; `{name}` is the program name, `{source}` is `out` or `err`.
pub const LOG_TEMPLATE: &str = ".{name}.{source}.log";

/// A single external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path.
    pub program: String,
    /// Arguments, not including the program.
    pub args: Vec<String>,
    /// Text piped to the program's standard input.
    pub stdin: Option<String>,
    /// Directory to run in; inherits the current one when unset.
    pub current_dir: Option<Utf8PathBuf>,
}

impl Invocation {
    /// Start an invocation of `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Pipe `text` to standard input.
    #[must_use]
    pub fn stdin(mut self, text: impl Into<String>) -> Self {
        self.stdin = Some(text.into());
        self
    }

    /// Run in `dir`.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Program name without its directory, used for log file names.
    pub fn name(&self) -> &str {
        Utf8Path::new(&self.program)
            .file_name()
            .unwrap_or(&self.program)
    }

    /// Shell-like rendering for messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` when killed by a signal.
    pub code: Option<i32>,
    /// Decoded standard output.
    pub stdout: String,
    /// Decoded standard error.
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the program exited with status 0.
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Capability to find and run external programs.
pub trait ToolRunner {
    /// Full path of `program` if it can be executed.
    fn locate(&self, program: &str) -> Option<Utf8PathBuf>;

    /// Run `invocation` to completion and capture its output.
    fn run(&self, invocation: &Invocation) -> LintResult<ToolOutput>;
}

/// Runs programs as blocking child processes.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
    log: bool,
    codec: TextCodec,
}

impl SystemRunner {
    /// A runner without timeout or log files, using UTF-8.
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill programs that run longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Write non-empty stdout/stderr to [`LOG_TEMPLATE`] files in the
    /// invocation's working directory.
    #[must_use]
    pub const fn with_logs(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    /// Encoding used for piped input and captured output.
    #[must_use]
    pub const fn with_codec(mut self, codec: TextCodec) -> Self {
        self.codec = codec;
        self
    }

    fn wait(&self, child: &mut Child, program: &str) -> LintResult<ExitStatus> {
        let spawn_err = |source| LintError::ToolSpawn {
            program: program.to_string(),
            source,
        };
        let Some(timeout) = self.timeout else {
            return child.wait().map_err(spawn_err);
        };
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait().map_err(spawn_err)? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                // Already-exited races are fine; the child is reaped below either way.
                let _ = child.kill();
                let _ = child.wait();
                return Err(LintError::ToolTimeout {
                    program: program.to_string(),
                    seconds: timeout.as_secs(),
                });
            }
            thread::sleep(Duration::from_millis(50));
        }
    }

    fn write_logs(&self, invocation: &Invocation, output: &ToolOutput) {
        if !self.log {
            return;
        }
        let dir = invocation
            .current_dir
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from("."));
        for (stream, source) in [(&output.stdout, "out"), (&output.stderr, "err")] {
            if stream.is_empty() {
                continue;
            }
            let file_name = LOG_TEMPLATE
                .replace("{name}", invocation.name())
                .replace("{source}", source);
            let path = dir.join(file_name);
            if let Err(e) = self.codec.write(&path, stream) {
                tracing::warn!(error = %e, path = %path, "failed to write tool log");
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(reader: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut reader) = reader {
            let _ = reader.read_to_end(&mut buf);
        }
        buf
    })
}

impl ToolRunner for SystemRunner {
    fn locate(&self, program: &str) -> Option<Utf8PathBuf> {
        let path = which::which(program).ok()?;
        Utf8PathBuf::from_path_buf(path).ok()
    }

    #[tracing::instrument(skip_all, fields(program = %invocation.program))]
    fn run(&self, invocation: &Invocation) -> LintResult<ToolOutput> {
        tracing::debug!(command = %invocation.command_line(), "running external tool");
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(ref dir) = invocation.current_dir {
            command.current_dir(dir.as_std_path());
        }

        let mut child = command.spawn().map_err(|source| LintError::ToolSpawn {
            program: invocation.program.clone(),
            source,
        })?;

        let feeder = match (child.stdin.take(), &invocation.stdin) {
            (Some(mut pipe), Some(text)) => {
                let bytes = self.codec.encode(text);
                Some(thread::spawn(move || pipe.write_all(&bytes)))
            }
            _ => None,
        };
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait(&mut child, &invocation.program)?;
        if let Some(feeder) = feeder
            && let Ok(Err(e)) = feeder.join()
        {
            tracing::debug!(error = %e, "tool closed stdin early");
        }
        let output = ToolOutput {
            code: status.code(),
            stdout: self.codec.decode_lossy(&stdout.join().unwrap_or_default()),
            stderr: self.codec.decode_lossy(&stderr.join().unwrap_or_default()),
        };
        tracing::trace!(stdout = %output.stdout, stderr = %output.stderr, "tool output");
        tracing::debug!(code = ?output.code, "external tool finished");
        self.write_logs(invocation, &output);
        Ok(output)
    }
}
