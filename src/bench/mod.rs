//! Benchmark builder core: fetch + align, derived returns.

pub mod align;
pub mod returns;

pub use align::{fetch_series, outer_join, select_column};
pub use returns::compute_return;
