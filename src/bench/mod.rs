//! Benchmark matrix: configuration loading and command construction.

pub mod config;
pub mod matrix;

pub use config::{HarnessConfig, load_config, parse_config};
pub use matrix::{build_matrix, case_command};
