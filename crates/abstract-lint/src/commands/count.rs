//! Count command: per-section word counts without running the checks.

use abstract_lint_core::config::Config;
use abstract_lint_core::sections::{Block, split_sections};
use abstract_lint_core::word_count::count_words;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use super::{input_or_cwd, read_abstract};

/// Arguments for the `count` subcommand.
#[derive(Args, Debug, Default)]
pub struct CountArgs {
    /// Abstract file, or a directory holding `<dir>.md` [default: .]
    #[arg(value_name = "PATH")]
    pub input: Option<Utf8PathBuf>,

    /// Text encoding of the input (e.g. utf-8, latin1)
    #[arg(short, long, value_name = "LABEL")]
    pub encoding: Option<String>,
}

#[derive(Serialize)]
struct CountReport<'a> {
    input: &'a Utf8Path,
    partial: usize,
    full: usize,
    limit: usize,
    blocks: &'a [Block],
}

/// Print word counts per section and the two totals.
#[instrument(name = "cmd_count", skip_all, fields(input = ?args.input))]
pub fn cmd_count(args: CountArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    let encoding = args.encoding.as_deref().unwrap_or(&config.encoding);
    debug!(encoding, "executing count command");

    let (input, text) = read_abstract(&input_or_cwd(args.input), encoding)?;
    let profile = config.profile();
    let wc = count_words(split_sections(&text, &profile.syntax), &profile.skip_sections);

    if global_json {
        let report = CountReport {
            input: &input,
            partial: wc.partial,
            full: wc.full,
            limit: profile.limits.wc_tot,
            blocks: &wc.blocks,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", input.bold());
    for block in &wc.blocks {
        let title = format!("{}{}", "  ".repeat(block.level), block.title);
        if block.skip {
            println!("{title:<50} {:>6} {}", block.num_words, "(skipped)".dimmed());
        } else {
            println!("{title:<50} {:>6}", block.num_words);
        }
    }
    println!();
    let counted = format!("{} / {}", wc.partial, profile.limits.wc_tot);
    if wc.partial <= profile.limits.wc_tot {
        println!("{:<50} {}", "Counted words", counted.green());
    } else {
        println!("{:<50} {}", "Counted words", counted.red());
    }
    println!("{:<50} {}", "All words", wc.full);
    Ok(())
}
