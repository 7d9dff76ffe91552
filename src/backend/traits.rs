//! Executor trait for the external statistical benchmarking tool.

use crate::HarnessResult;
use crate::core::BenchmarkGroup;

/// Runs one benchmark group through an external benchmarking tool.
///
/// Implementations block until the tool exits. Every case in the group is measured in
/// the same invocation so results within a group are comparable.
pub trait BenchmarkExecutor {
    /// Returns the executor name (e.g., "hyperfine").
    fn name(&self) -> &str;

    /// Benchmark every command of `group` after `warmup` unmeasured runs.
    ///
    /// # Errors
    /// `HarnessError::Execution` with the group name when the tool fails to spawn or
    /// exits unsuccessfully.
    fn run(&self, group: &BenchmarkGroup, warmup: u32) -> HarnessResult<()>;
}
