//! Output module for reporting crawl results
//!
//! The vocabulary artifacts themselves are written by the storage layer;
//! this module only covers run reporting.

pub mod stats;

pub use stats::{print_ledger_summary, print_statistics, RunStatistics, SeedStatistics};
