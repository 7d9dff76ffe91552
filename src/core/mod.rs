//! Core types for typecheck-bench.
//!
//! This module holds the data model shared by discovery, matrix building and execution,
//! plus the version ordering used when presenting toolchains.

pub mod schema;
pub mod version;

// Re-export key types for convenience
pub use schema::{BenchmarkCase, BenchmarkGroup, CommandDescriptor, MatrixGroup, ToolchainVersion};
pub use version::{order_versions, parse_version_label};
