//! Configuration loading and discovery.
//!
//! This module provides configuration file discovery by:
//! 1. Walking up from the current directory to find project config
//! 2. Loading user config from XDG config directory
//! 3. Merging with the built-in submission profile
//!
//! # Supported formats
//!
//! - TOML (`.toml`)
//! - YAML (`.yaml`, `.yml`)
//! - JSON (`.json`)
//!
//! # Config file locations (in order of precedence, highest first):
//! - `abstract-lint.<ext>` in current directory or any parent
//! - `.abstract-lint.<ext>` in current directory or any parent
//! - `abstract.<ext>` in current directory or any parent
//! - `.abstract.<ext>` in current directory or any parent
//! - `~/.config/abstract-lint/config.<ext>` (user config)
//!
//! Environment variables prefixed with `ABSTRACT_LINT_` override files;
//! nested keys use a double underscore, e.g. `ABSTRACT_LINT_LIMITS__WC_TOT=500`.
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use abstract_lint_core::config::ConfigLoader;
//!
//! let cwd = std::env::current_dir().unwrap();
//! let cwd = Utf8PathBuf::try_from(cwd).expect("current directory is not valid UTF-8");
//! let (config, _sources) = ConfigLoader::new()
//!     .with_project_search(&cwd)
//!     .load()
//!     .unwrap();
//! println!("total word limit: {}", config.limits.wc_tot);
//! ```

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::input::DEFAULT_ENCODING;
use crate::pipeline::{ExportFormat, RunOptions};
use crate::profile::{Limits, Profile};
use crate::sections::SectionSyntax;
use crate::tools::{DEFAULT_FIGS_DPI, ToolPrograms};
use crate::word_count::SKIP_SECTIONS;

/// How much the `check` command prints, from silent to debugging detail.
///
/// Tiers are ordered; each prints everything the tiers below it print.
/// `low`, `higher`, `highest` and `warning` add nothing of their own and
/// exist so numeric levels 0-9 keep their names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Nothing but fatal errors.
    None,
    /// Input, results, warnings and produced files.
    #[default]
    Lowest,
    /// Also the tool description banner.
    Lower,
    /// Level 3.
    Low,
    /// Also the CSS sources used for export.
    Medium,
    /// Also the resolved figure list.
    High,
    /// Level 6.
    Higher,
    /// Level 7.
    Highest,
    /// Level 8.
    Warning,
    /// Also the effective options and elapsed time.
    Debug,
}

impl Verbosity {
    const ALL: [Self; 10] = [
        Self::None,
        Self::Lowest,
        Self::Lower,
        Self::Low,
        Self::Medium,
        Self::High,
        Self::Higher,
        Self::Highest,
        Self::Warning,
        Self::Debug,
    ];

    /// Tier for a numeric level; values above 9 saturate at [`Verbosity::Debug`].
    pub fn from_level(level: u8) -> Self {
        Self::ALL[usize::from(level).min(Self::ALL.len() - 1)]
    }

    /// Numeric level, 0 to 9.
    pub const fn level(self) -> u8 {
        self as u8
    }

    /// Raise by `steps` tiers.
    #[must_use]
    pub fn raised(self, steps: u8) -> Self {
        Self::from_level(self.level().saturating_add(steps))
    }

    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Lowest => "lowest",
            Self::Lower => "lower",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Higher => "higher",
            Self::Highest => "highest",
            Self::Warning => "warning",
            Self::Debug => "debug",
        }
    }
}

impl std::fmt::Display for Verbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The configuration for abstract-lint.
///
/// Deserialized from config files found during discovery (TOML, YAML, or
/// JSON). Command-line flags override individual fields.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application (e.g., "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// Directory for log files; file logging is off when unset.
    pub log_dir: Option<Utf8PathBuf>,
    /// Terminal output tier for `check`.
    pub verbosity: Verbosity,
    /// Submission limits.
    pub limits: Limits,
    /// Title substrings excluded from the partial word count.
    pub skip_sections: Vec<String>,
    /// Only recognize figures that start their own line.
    pub figures_on_new_lines: bool,
    /// Heading, underline and skip token tables.
    pub syntax: SectionSyntax,
    /// Export formats produced by `check`.
    pub export: Vec<ExportFormat>,
    /// Attach the report to the fixed copy and the HTML export.
    pub attach: bool,
    /// Commit tracked changes before checking.
    pub backup: bool,
    /// Write external tool output to `.{name}.{source}.log` files.
    pub log_tools: bool,
    /// CSS sources for export; the generated default stylesheet when unset.
    pub css: Option<Vec<String>>,
    /// Inline all resources in the HTML export.
    pub self_contained: bool,
    /// Text encoding label for input and output files.
    pub encoding: String,
    /// Image DPI for PDF export.
    pub figs_dpi: u32,
    /// Regenerate outputs even when up to date.
    pub force: bool,
    /// External program names.
    pub tools: ToolPrograms,
    /// Kill external tools after this many seconds.
    pub tool_timeout_secs: Option<u64>,
    /// Exit non-zero when a check fails.
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            log_dir: None,
            verbosity: Verbosity::default(),
            limits: Limits::default(),
            skip_sections: SKIP_SECTIONS.iter().map(|s| (*s).to_string()).collect(),
            figures_on_new_lines: true,
            syntax: SectionSyntax::default(),
            export: vec![ExportFormat::Html, ExportFormat::Pdf],
            attach: true,
            backup: true,
            log_tools: true,
            css: None,
            self_contained: false,
            encoding: DEFAULT_ENCODING.to_string(),
            figs_dpi: DEFAULT_FIGS_DPI,
            force: false,
            tools: ToolPrograms::default(),
            tool_timeout_secs: None,
            strict: false,
        }
    }
}

impl Config {
    /// The parsing and limits part of the configuration.
    pub fn profile(&self) -> Profile {
        Profile {
            limits: self.limits,
            syntax: self.syntax.clone(),
            skip_sections: self.skip_sections.clone(),
            figures_on_new_lines: self.figures_on_new_lines,
        }
    }

    /// Configured tool timeout.
    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout_secs.map(Duration::from_secs)
    }

    /// Pipeline options for `input` taken from this configuration.
    pub fn run_options(&self, input: impl Into<Utf8PathBuf>) -> RunOptions {
        RunOptions {
            input: input.into(),
            output: None,
            export: self.export.clone(),
            attach: self.attach,
            backup: self.backup,
            css: self.css.clone(),
            self_contained: self.self_contained,
            encoding: self.encoding.clone(),
            figs_dpi: self.figs_dpi,
            force: self.force,
            profile: self.profile(),
            programs: self.tools.clone(),
            tool_stamp: None,
        }
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information.
    Info,
    /// Warnings about potential issues (default).
    #[default]
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Metadata about which configuration sources were loaded.
///
/// Returned alongside [`Config`] from [`ConfigLoader::load()`] so commands
/// can report the actual config files without re-discovering them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigSources {
    /// Project config files found by walking up, ordered low→high precedence.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub project_files: Vec<Utf8PathBuf>,
    /// User config file from XDG config directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_file: Option<Utf8PathBuf>,
    /// Explicit config files loaded (e.g., from `--config` flag).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigSources {
    /// Returns the highest-precedence config file that was loaded.
    ///
    /// Precedence: explicit files > project files > user file.
    pub fn primary_file(&self) -> Option<&Utf8Path> {
        self.explicit_files
            .last()
            .map(Utf8PathBuf::as_path)
            .or_else(|| self.project_files.last().map(Utf8PathBuf::as_path))
            .or(self.user_file.as_deref())
    }
}

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
const APP_NAME: &str = "abstract-lint";

/// Application names to search for config files (in precedence order, lowest first).
const APP_NAMES: &[&str] = &["abstract", "abstract-lint"];

/// Project discovery stops at the directory containing this entry.
const BOUNDARY_MARKER: &str = ".git";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "ABSTRACT_LINT_";

/// Builder for loading configuration from multiple sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Starting directory for project config search.
    project_search_root: Option<Utf8PathBuf>,
    /// Whether to include user config from XDG directory.
    include_user_config: bool,
    /// Explicit config files to load (for testing or programmatic use).
    explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default settings.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            explicit_files: Vec::new(),
        }
    }

    /// Set the starting directory for project config search.
    ///
    /// The loader will walk up from this directory looking for config files.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set whether to include user config from `~/.config/abstract-lint/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Add an explicit config file to load.
    ///
    /// Files are loaded in order, with later files taking precedence.
    /// Explicit files are loaded after discovered files.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration, merging all discovered sources.
    ///
    /// Precedence (highest to lowest):
    /// 1. `ABSTRACT_LINT_*` environment variables
    /// 2. Explicit files (in order added via `with_file`)
    /// 3. Project config (closest to search root)
    /// 4. User config (`~/.config/abstract-lint/config.<ext>`)
    /// 5. Default values
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<(Config, ConfigSources)> {
        tracing::debug!("loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let mut sources = ConfigSources::default();

        if self.include_user_config
            && let Some(user_config) = self.find_user_config()
        {
            figment = Self::merge_file(figment, &user_config);
            sources.user_file = Some(user_config);
        }

        if let Some(ref root) = self.project_search_root {
            let project_configs = self.find_project_configs(root);
            for pc in &project_configs {
                figment = Self::merge_file(figment, pc);
            }
            sources.project_files = project_configs;
        }

        for file in &self.explicit_files {
            figment = Self::merge_file(figment, file);
        }
        sources.explicit_files = self.explicit_files;

        // ABSTRACT_LINT_LOG_LEVEL=debug, ABSTRACT_LINT_LIMITS__WC_TOT=500, ...
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::info!(
            log_level = config.log_level.as_str(),
            wc_tot = config.limits.wc_tot,
            "configuration loaded"
        );
        Ok((config, sources))
    }

    /// Find project config files by walking up from the given directory.
    ///
    /// Returns all matching config files from the closest directory that has
    /// any match, ordered low-to-high precedence: `abstract` names before
    /// `abstract-lint` names, dotfiles before regular files within each.
    fn find_project_configs(&self, start: &Utf8Path) -> Vec<Utf8PathBuf> {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            let mut found = Vec::new();

            for app_name in APP_NAMES {
                for ext in CONFIG_EXTENSIONS {
                    let dotfile = dir.join(format!(".{app_name}.{ext}"));
                    if dotfile.is_file() {
                        found.push(dotfile);
                    }
                }
                for ext in CONFIG_EXTENSIONS {
                    let regular = dir.join(format!("{app_name}.{ext}"));
                    if regular.is_file() {
                        found.push(regular);
                    }
                }
            }

            if !found.is_empty() {
                return found;
            }

            // Checked after the config files so a config next to the marker is found.
            if dir.join(BOUNDARY_MARKER).exists() && dir != start {
                break;
            }

            current = dir.parent().map(Utf8Path::to_path_buf);
        }

        Vec::new()
    }

    /// Find user config in XDG config directory.
    fn find_user_config(&self) -> Option<Utf8PathBuf> {
        let config_dir = user_config_dir()?;
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| config_dir.join(format!("config.{ext}")))
            .find(|path| path.is_file())
    }

    /// Merge a config file into the figment, detecting format from extension.
    fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
        match path.extension() {
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
            Some("json") => figment.merge(Json::file_exact(path.as_str())),
            _ => figment.merge(Toml::file_exact(path.as_str())),
        }
    }
}

/// Get the user config directory path.
///
/// Returns `~/.config/abstract-lint/` on Linux,
/// `~/Library/Application Support/abstract-lint/` on macOS, and equivalent
/// on other platforms.
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf()).ok()
}
