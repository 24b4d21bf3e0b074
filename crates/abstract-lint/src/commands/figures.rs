//! Figures command: list referenced figures with their file sizes.

use abstract_lint_core::checks::{figure_path, figure_size};
use abstract_lint_core::config::Config;
use abstract_lint_core::figures::find_figures;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use super::{input_or_cwd, read_abstract};

/// Arguments for the `figures` subcommand.
#[derive(Args, Debug, Default)]
pub struct FiguresArgs {
    /// Abstract file, or a directory holding `<dir>.md` [default: .]
    #[arg(value_name = "PATH")]
    pub input: Option<Utf8PathBuf>,

    /// Text encoding of the input (e.g. utf-8, latin1)
    #[arg(short, long, value_name = "LABEL")]
    pub encoding: Option<String>,

    /// Also match figures that do not start their line
    #[arg(long)]
    pub anywhere: bool,
}

#[derive(Serialize)]
struct FigureEntry {
    uri: String,
    path: Utf8PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    within_limit: bool,
}

#[derive(Serialize)]
struct FiguresReport<'a> {
    input: &'a Utf8Path,
    limit: usize,
    figures: Vec<FigureEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unresolved: Vec<String>,
}

/// Print each figure URI, where it resolves to, and its size.
#[instrument(name = "cmd_figures", skip_all, fields(input = ?args.input))]
pub fn cmd_figures(args: FiguresArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    let encoding = args.encoding.as_deref().unwrap_or(&config.encoding);
    let on_new_lines = config.figures_on_new_lines && !args.anywhere;
    debug!(encoding, on_new_lines, "executing figures command");

    let (input, text) = read_abstract(&input_or_cwd(args.input), encoding)?;
    let base_dir = input.parent().unwrap_or(Utf8Path::new("."));
    let list = find_figures(&text, on_new_lines);
    let max_size = config.limits.fig_size;

    let figures: Vec<FigureEntry> = list
        .figures
        .iter()
        .map(|uri| {
            let path = figure_path(uri, base_dir);
            let size = figure_size(&path);
            FigureEntry {
                uri: uri.clone(),
                path,
                size,
                within_limit: size.is_some_and(|s| s <= max_size),
            }
        })
        .collect();

    if global_json {
        let report = FiguresReport {
            input: &input,
            limit: config.limits.n_figs,
            figures,
            unresolved: list.unresolved,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for entry in &figures {
        let size = match entry.size {
            Some(bytes) => format!("{:.1} MB", bytes as f64 / 1e6),
            None => "NOT FOUND!".to_string(),
        };
        if entry.within_limit {
            println!("{:<60} {}", entry.uri, size.green());
        } else {
            println!("{:<60} {}", entry.uri, size.red());
        }
    }
    for label in &list.unresolved {
        println!("{} no definition for reference [{label}]", "W:".yellow());
    }
    let count = format!("{} / {}", figures.len(), config.limits.n_figs);
    if figures.len() <= config.limits.n_figs {
        println!("{} {}", "Figures:".bold(), count.green());
    } else {
        println!("{} {}", "Figures:".bold(), count.red());
    }
    Ok(())
}
