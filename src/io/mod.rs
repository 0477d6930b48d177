//! Input/output helpers.
//!
//! - canonical CSV writer (`export`)
//! - output destinations (`sink`)
//! - CSV read-back (`ingest`)

pub mod export;
pub mod ingest;
pub mod sink;

pub use export::*;
pub use ingest::*;
pub use sink::*;
