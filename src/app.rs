//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments into a `RunConfig`
//! - builds the provider clients the chosen pipeline needs
//! - runs the pipeline against a directory sink
//! - prints what was written

use clap::Parser;

use crate::cli::{Command, InspectArgs};
use crate::data::{FredClient, SourceRouter, YahooClient};
use crate::domain::{RunConfig, Source};
use crate::error::AppError;
use crate::io::DirSink;

pub mod pipeline;

use pipeline::Pipeline;

/// Entry point for the `benchdb` binary.
pub fn run() -> Result<(), AppError> {
    // A bare `benchdb` (or `benchdb -o dir ...`) means `benchdb all ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Treasury(args) => {
            let config = RunConfig {
                maturities: args.series,
                ..args.range.to_config()?
            };
            handle_download(Pipeline::Treasury, &config)
        }
        Command::Equity(args) => {
            let config = RunConfig {
                equity_index: args.index,
                ..args.range.to_config()?
            };
            handle_download(Pipeline::Equity, &config)
        }
        Command::Etf(args) => {
            let config = RunConfig {
                etf_tickers: args.tickers,
                ..args.range.to_config()?
            };
            handle_download(Pipeline::Etf, &config)
        }
        Command::Actions(args) => {
            let config = RunConfig {
                action_tickers: args.tickers,
                ..args.range.to_config()?
            };
            handle_download(Pipeline::Actions, &config)
        }
        Command::All(range) => handle_download(Pipeline::All, &range.to_config()?),
        Command::Inspect(args) => handle_inspect(&args),
    }
}

fn handle_download(pipeline: Pipeline, config: &RunConfig) -> Result<(), AppError> {
    let router = build_router(pipeline)?;
    let mut sink = DirSink::new(&config.out_dir);

    tracing::info!(?pipeline, range = %config.range, out_dir = %config.out_dir.display(), "starting run");
    let output = pipeline::run_pipeline(pipeline, &router, config, &mut sink)?;

    for artifact in &output.artifacts {
        println!("{:>8} rows  {}", artifact.rows, config.out_dir.join(&artifact.name).display());
    }
    Ok(())
}

/// Build only the clients the pipeline will use, so e.g. `benchdb etf` works
/// without a FRED API key.
fn build_router(pipeline: Pipeline) -> Result<SourceRouter, AppError> {
    let mut router = SourceRouter::new();
    for &source in pipeline.sources() {
        router = match source {
            Source::Treasury => router.with(source, Box::new(FredClient::from_env()?)),
            Source::Equity | Source::EquityActions => router.with(source, Box::new(YahooClient::new()?)),
        };
    }
    Ok(router)
}

fn handle_inspect(args: &InspectArgs) -> Result<(), AppError> {
    let table = crate::io::read_csv(&args.path)?;
    let summary = crate::io::summarize(&table);

    println!("{}", args.path.display());
    println!("rows: {}", summary.rows);
    match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => println!("dates: {first} .. {last}"),
        _ => println!("dates: (none)"),
    }
    for (column, present) in summary.columns.iter().zip(&summary.present) {
        println!("  {column:<16} {present:>8} present");
    }
    Ok(())
}

/// Rewrite argv so `benchdb` defaults to `benchdb all`.
///
/// Rules:
/// - `benchdb`                      -> `benchdb all`
/// - `benchdb -o out ...`           -> `benchdb all -o out ...`
/// - `benchdb --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("all".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    // Flags without a subcommand are `all` flags.
    if arg1.starts_with('-') {
        argv.insert(1, "all".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_all() {
        assert_eq!(rewrite_args(argv(&["benchdb"])), argv(&["benchdb", "all"]));
    }

    #[test]
    fn leading_flags_go_to_all() {
        assert_eq!(
            rewrite_args(argv(&["benchdb", "-o", "data"])),
            argv(&["benchdb", "all", "-o", "data"])
        );
    }

    #[test]
    fn subcommands_and_help_untouched() {
        assert_eq!(rewrite_args(argv(&["benchdb", "etf"])), argv(&["benchdb", "etf"]));
        assert_eq!(rewrite_args(argv(&["benchdb", "--help"])), argv(&["benchdb", "--help"]));
    }

    #[test]
    fn equity_pipeline_needs_no_fred_key() {
        let router = build_router(Pipeline::Etf).unwrap();
        assert!(router.supports(Source::Equity));
        assert!(!router.supports(Source::Treasury));
    }
}
