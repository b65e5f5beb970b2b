//! Output module for end-of-run reporting
//!
//! This module renders the `CrawlReport` of a finished or interrupted run
//! for the terminal.

pub mod stats;

pub use stats::{format_report, print_report};
