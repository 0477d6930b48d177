//! Command-line parsing for the benchmark builder.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fetch/align/write code: every subcommand resolves into a `RunConfig`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{DateRange, EQUITY_INDEX, RunConfig, SECTOR_ETFS, TREASURY_MATURITIES};
use crate::error::AppError;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "benchdb", version, about = "Download treasury, equity and ETF benchmark datasets to CSV")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Treasury yield curve from FRED -> treasury_benchmark.csv.
    Treasury(TreasuryArgs),
    /// Daily percent return of an equity index -> equity_benchmark.csv.
    Equity(EquityArgs),
    /// Per-ticker price history -> <TICKER>.csv plus AdjClose.csv.
    Etf(TickerArgs),
    /// Per-ticker dividends and splits -> <TICKER>_actions.csv.
    Actions(TickerArgs),
    /// Run every pipeline with default parameters.
    All(RangeArgs),
    /// Read a written CSV back and print its shape.
    Inspect(InspectArgs),
}

/// Options shared by every download subcommand.
#[derive(Debug, Args, Clone)]
pub struct RangeArgs {
    /// Directory the CSV files are written to.
    #[arg(short = 'o', long, default_value = ".")]
    pub out_dir: PathBuf,

    /// First date to fetch (YYYY-MM-DD). Omit for all available history.
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last date to fetch (YYYY-MM-DD). Omit for today.
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Args, Clone)]
pub struct TreasuryArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// FRED series codes, one column each.
    #[arg(long, num_args = 1.., default_values_t = TREASURY_MATURITIES.map(String::from))]
    pub series: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct EquityArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Index ticker whose close is turned into daily returns.
    #[arg(long, default_value = EQUITY_INDEX)]
    pub index: String,
}

#[derive(Debug, Args, Clone)]
pub struct TickerArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Tickers to download, fetched one after another.
    #[arg(long, num_args = 1.., default_values_t = SECTOR_ETFS.map(String::from))]
    pub tickers: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct InspectArgs {
    /// CSV file produced by one of the download subcommands.
    #[arg(value_name = "CSV")]
    pub path: PathBuf,
}

impl RangeArgs {
    /// Base config with this range and output directory, other fields default.
    pub fn to_config(&self) -> Result<RunConfig, AppError> {
        Ok(RunConfig {
            out_dir: self.out_dir.clone(),
            range: DateRange::new(self.start, self.end)?,
            ..RunConfig::default()
        })
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}
