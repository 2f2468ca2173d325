//! `energy-desk` library crate.
//!
//! The binary (`desk`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - both pipelines (forward allocation, LDS margins) share loaders and exports
//! - code stays easy to navigate as the project grows

pub mod alloc;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod margin;
pub mod math;
pub mod plot;
pub mod report;
