//! Core library for abstract-lint.
//!
//! This crate checks a Markdown conference abstract against submission
//! limits (word counts per section, figure count and size, captions matching
//! figures) and drives the optional backup and export steps used by the
//! `abstract-lint` CLI.
//!
//! # Modules
//!
//! - [`sections`] - Splitting a document into titled blocks
//! - [`word_count`] - Per-block and aggregate word counts
//! - [`figures`] - Figure reference extraction
//! - [`checks`] - Constraint checks and verdicts
//! - [`report`] - Markdown/HTML report rendering
//! - [`fix`] - The normalized "fixed" copy
//! - [`pipeline`] - End-to-end run with external tools
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```no_run
//! use abstract_lint_core::{Analysis, Profile, run_checks};
//! use camino::Utf8Path;
//!
//! let text = std::fs::read_to_string("abstract.md").unwrap();
//! let profile = Profile::default();
//! let analysis = Analysis::of(&text, &profile);
//! let report = run_checks(&analysis, &profile.limits, Utf8Path::new("."));
//!
//! for result in &report.results {
//!     println!("{}", result.description);
//! }
//! ```
#![deny(unsafe_code)]

pub mod checks;
pub mod config;
pub mod css;
pub mod error;
pub mod figures;
pub mod fix;
pub mod freshness;
pub mod input;
pub mod pipeline;
pub mod profile;
pub mod report;
pub mod runner;
pub mod sections;
pub mod tools;
pub mod word_count;

pub use checks::{Analysis, CheckReport, Outcome, TestResult, Verdict, run_checks};
pub use config::{Config, ConfigLoader, ConfigSources, LogLevel, Verbosity};
pub use error::{ConfigError, ConfigResult, LintError, LintResult};
pub use figures::{FigureList, find_figures};
pub use pipeline::{ExportFormat, RunOptions, RunSummary, StepStatus, run};
pub use profile::{Limits, Profile};
pub use report::{ReportStyle, render_report};
pub use runner::{Invocation, SystemRunner, ToolOutput, ToolRunner};
pub use sections::{Block, SectionSyntax, split_sections};
pub use word_count::{WordCount, count_words};
