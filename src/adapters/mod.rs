//! Host-facing adapters for convtest-core.
//!
//! - **CLI**: directory scan and batch fix surface for a thin binary wrapper

pub mod cli;

pub use cli::{scan, FileReport, ScanOptions, ScanReport, SkippedFile};
