//! Executors for the external benchmarking tool.
//!
//! `BenchmarkExecutor` is the seam between matrix construction and process spawning:
//! `HyperfineExecutor` drives the real tool, `RecordingExecutor` stands in for it in tests.

pub mod hyperfine;
pub mod mock;
pub mod traits;

// Re-export key types
pub use hyperfine::{HyperfineConfig, HyperfineExecutor, hyperfine_args};
pub use mock::{RecordedRun, RecordingExecutor};
pub use traits::BenchmarkExecutor;
