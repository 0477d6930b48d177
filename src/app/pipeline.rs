//! The benchmark pipelines.
//!
//! Each pipeline is a linear pass: fetch -> align/clean -> (optional derive) -> write.
//! They only see a `DataProvider` and a `TableSink`, so the binary runs them
//! against FRED/Yahoo and the filesystem while tests run them against canned
//! tables and memory.

use crate::bench::{compute_return, fetch_series, outer_join, select_column};
use crate::data::DataProvider;
use crate::domain::{
    ACTION_COLUMNS, ADJ_CLOSE_COLUMN, ADJ_CLOSE_FILE, CLOSE_COLUMN, EQUITY_FILE, RunConfig, Source, TREASURY_FILE,
    Table, actions_file, ticker_file,
};
use crate::error::{AppError, ErrorKind};
use crate::io::TableSink;

/// Which pipeline(s) to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    Treasury,
    Equity,
    Etf,
    Actions,
    All,
}

impl Pipeline {
    /// Sources the pipeline will request, used to decide which clients to build.
    pub fn sources(self) -> &'static [Source] {
        match self {
            Pipeline::Treasury => &[Source::Treasury],
            Pipeline::Equity | Pipeline::Etf => &[Source::Equity],
            Pipeline::Actions => &[Source::EquityActions],
            Pipeline::All => &[Source::Treasury, Source::Equity, Source::EquityActions],
        }
    }
}

/// One file handed to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub rows: usize,
}

/// Everything written by a run, in write order.
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub artifacts: Vec<Artifact>,
}

impl RunOutput {
    fn emit(&mut self, sink: &mut dyn TableSink, name: String, table: &Table) -> Result<(), AppError> {
        sink.write(&name, table)?;
        self.artifacts.push(Artifact {
            name,
            rows: table.len(),
        });
        Ok(())
    }
}

/// Run `pipeline`, stopping at the first failure. Files already written stay.
pub fn run_pipeline(
    pipeline: Pipeline,
    provider: &dyn DataProvider,
    config: &RunConfig,
    sink: &mut dyn TableSink,
) -> Result<RunOutput, AppError> {
    let mut out = RunOutput::default();
    match pipeline {
        Pipeline::Treasury => treasury(provider, config, sink, &mut out)?,
        Pipeline::Equity => equity(provider, config, sink, &mut out)?,
        Pipeline::Etf => etf_history(provider, config, sink, &mut out)?,
        Pipeline::Actions => corporate_actions(provider, config, sink, &mut out)?,
        Pipeline::All => {
            treasury(provider, config, sink, &mut out)?;
            equity(provider, config, sink, &mut out)?;
            etf_history(provider, config, sink, &mut out)?;
            corporate_actions(provider, config, sink, &mut out)?;
        }
    }
    Ok(out)
}

/// Treasury yield curve: one column per maturity, all-absent days dropped.
pub fn treasury_benchmark(provider: &dyn DataProvider, config: &RunConfig) -> Result<Table, AppError> {
    fetch_series(provider, &config.maturities, Source::Treasury, config.range)
}

/// Daily percent return of the equity index close.
pub fn equity_benchmark(provider: &dyn DataProvider, config: &RunConfig) -> Result<Table, AppError> {
    let prices = fetch_series(provider, &[config.equity_index.as_str()], Source::Equity, config.range)?;
    let returns = compute_return(&prices, CLOSE_COLUMN)?;
    if returns.is_empty() {
        return Err(AppError::empty_result(format!(
            "Not enough closes for {} to compute a return over {}.",
            config.equity_index, config.range
        )));
    }
    Ok(returns)
}

fn treasury(
    provider: &dyn DataProvider,
    config: &RunConfig,
    sink: &mut dyn TableSink,
    out: &mut RunOutput,
) -> Result<(), AppError> {
    let table = treasury_benchmark(provider, config)?;
    out.emit(sink, TREASURY_FILE.to_string(), &table)
}

fn equity(
    provider: &dyn DataProvider,
    config: &RunConfig,
    sink: &mut dyn TableSink,
    out: &mut RunOutput,
) -> Result<(), AppError> {
    let table = equity_benchmark(provider, config)?;
    out.emit(sink, EQUITY_FILE.to_string(), &table)
}

/// Full price history per ticker, then adjusted closes joined across tickers.
fn etf_history(
    provider: &dyn DataProvider,
    config: &RunConfig,
    sink: &mut dyn TableSink,
    out: &mut RunOutput,
) -> Result<(), AppError> {
    let mut adj = Vec::with_capacity(config.etf_tickers.len());

    for ticker in &config.etf_tickers {
        let history = fetch_series(provider, &[ticker.as_str()], Source::Equity, config.range)?;
        out.emit(sink, ticker_file(ticker), &history)?;
        adj.push(select_column(&history, ADJ_CLOSE_COLUMN, ticker)?);
    }

    let mut joined = outer_join(&adj)?;
    joined.drop_empty_rows();
    if joined.is_empty() {
        return Err(AppError::empty_result(format!(
            "No adjusted closes for {} over {}.",
            config.etf_tickers.join(", "),
            config.range
        )));
    }
    out.emit(sink, ADJ_CLOSE_FILE.to_string(), &joined)
}

/// Dividends and splits per ticker.
///
/// A ticker with no actions in range (an index, a young fund) is not a
/// failure: its file is written with the header only.
fn corporate_actions(
    provider: &dyn DataProvider,
    config: &RunConfig,
    sink: &mut dyn TableSink,
    out: &mut RunOutput,
) -> Result<(), AppError> {
    for ticker in &config.action_tickers {
        let table = match fetch_series(provider, &[ticker.as_str()], Source::EquityActions, config.range) {
            Ok(table) => table,
            Err(e) if e.kind() == ErrorKind::EmptyResult => {
                tracing::info!(ticker = %ticker, "no corporate actions in range");
                Table::new(ACTION_COLUMNS)
            }
            Err(e) => return Err(e),
        };
        out.emit(sink, actions_file(ticker), &table)?;
    }
    Ok(())
}
