//! Info command implementation

use abstract_lint_core::config::{Config, ConfigSources, user_config_dir};
use abstract_lint_core::pipeline::ExportFormat;
use abstract_lint_core::profile::Limits;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    repository: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    homepage: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
            homepage: env!("CARGO_PKG_HOMEPAGE"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_config_dir: Option<String>,
    log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
    verbosity: String,
    encoding: String,
    export: Vec<ExportFormat>,
    limits: Limits,
    tools: Vec<String>,
}

impl ConfigInfo {
    fn from_config(config: &Config, sources: &ConfigSources) -> Self {
        Self {
            config_file: sources.primary_file().map(|p| p.to_string()),
            user_config_dir: user_config_dir().map(|p| p.to_string()),
            log_level: config.log_level.as_str().to_string(),
            log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
            verbosity: config.verbosity.to_string(),
            encoding: config.encoding.clone(),
            export: config.export.clone(),
            limits: config.limits,
            tools: vec![
                config.tools.vcs.clone(),
                config.tools.md2html.clone(),
                config.tools.html2pdf.clone(),
            ],
        }
    }
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
}

/// Print package information and the effective configuration.
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
/// * `config` - Loaded configuration
/// * `sources` - Config source metadata from loading
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    sources: &ConfigSources,
) -> anyhow::Result<()> {
    let info = PackageInfo::new();

    debug!(json_output = global_json, "executing info command");

    let full_info = FullInfo {
        package: info,
        config: ConfigInfo::from_config(config, sources),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&full_info)?);
        return Ok(());
    }

    let package = &full_info.package;
    println!("{} {}", package.name.bold(), package.version.green());
    if !package.description.is_empty() {
        println!("{}", package.description);
    }
    if !package.license.is_empty() {
        println!("{}: {}", "License".dimmed(), package.license);
    }
    if !package.repository.is_empty() {
        println!("{}: {}", "Repository".dimmed(), package.repository.cyan());
    }

    let cfg = &full_info.config;
    println!();
    println!("{}", "Configuration".bold().underline());
    match cfg.config_file {
        Some(ref path) => println!("{}: {}", "Config file".dimmed(), path.cyan()),
        None => println!("{}: {}", "Config file".dimmed(), "none loaded".yellow()),
    }
    if let Some(ref dir) = cfg.user_config_dir {
        println!("{}: {}", "User config dir".dimmed(), dir);
    }
    println!("{}: {}", "Log level".dimmed(), cfg.log_level);
    if let Some(ref dir) = cfg.log_dir {
        println!("{}: {}", "Log directory".dimmed(), dir);
    }
    println!("{}: {}", "Verbosity".dimmed(), cfg.verbosity);
    println!("{}: {}", "Encoding".dimmed(), cfg.encoding);
    let export: Vec<&str> = cfg
        .export
        .iter()
        .map(|format| match format {
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
        })
        .collect();
    if export.is_empty() {
        println!("{}: {}", "Export".dimmed(), "(none)".dimmed());
    } else {
        println!("{}: {}", "Export".dimmed(), export.join(", "));
    }
    println!("{}: {}", "Tools".dimmed(), cfg.tools.join(", "));

    println!();
    println!("{}", "Limits".bold().underline());
    println!("{}: {}", "Total words".dimmed(), cfg.limits.wc_tot);
    println!("{}: {}", "Synopsis words".dimmed(), cfg.limits.wc_synopsis);
    println!("{}: {}", "Caption words".dimmed(), cfg.limits.wc_fig);
    println!("{}: {}", "Figures".dimmed(), cfg.limits.n_figs);
    println!(
        "{}: {:.1} MB",
        "Figure size".dimmed(),
        cfg.limits.fig_size as f64 / 1e6
    );

    Ok(())
}
