//! Upstream data providers (FRED, Yahoo Finance) behind one trait.

pub mod fred;
pub mod provider;
pub mod yahoo;

pub use fred::FredClient;
pub use provider::{DataProvider, SourceRouter};
pub use yahoo::YahooClient;
