//! `benchmark-db` library crate.
//!
//! The binary (`benchdb`) is a thin wrapper around this library so that:
//!
//! - pipelines are testable without network or filesystem
//! - providers and sinks can be swapped (mock provider, in-memory sink)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod bench;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
