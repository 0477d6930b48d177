//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - request/configuration types (`Source`, `DateRange`, `SeriesRequest`, `RunConfig`)
//! - the date-indexed `Table` every stage produces and consumes
//! - typed rows read back from written artifacts (`PriceBar`)

pub mod table;
pub mod types;

pub use table::*;
pub use types::*;
