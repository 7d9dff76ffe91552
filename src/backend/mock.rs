//! Recording executor for testing.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::core::BenchmarkGroup;
use crate::{HarnessError, HarnessResult};

use super::traits::BenchmarkExecutor;

/// One recorded executor invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRun {
    pub group: String,
    pub labels: Vec<String>,
    pub warmup: u32,
}

/// Executor that records every group it is asked to run without spawning anything.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    runs: RefCell<Vec<RecordedRun>>,
    failing_groups: HashSet<String>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make runs of the named group fail with a non-zero status.
    pub fn failing_group(mut self, group: impl Into<String>) -> Self {
        self.failing_groups.insert(group.into());
        self
    }

    /// All recorded runs, in invocation order.
    pub fn runs(&self) -> Vec<RecordedRun> {
        self.runs.borrow().clone()
    }

    /// Names of the groups run, in invocation order.
    pub fn group_names(&self) -> Vec<String> {
        self.runs.borrow().iter().map(|r| r.group.clone()).collect()
    }
}

impl BenchmarkExecutor for RecordingExecutor {
    fn name(&self) -> &str {
        "recording"
    }

    fn run(&self, group: &BenchmarkGroup, warmup: u32) -> HarnessResult<()> {
        self.runs.borrow_mut().push(RecordedRun {
            group: group.name.clone(),
            labels: group.commands.iter().map(|c| c.label.clone()).collect(),
            warmup,
        });
        if self.failing_groups.contains(&group.name) {
            return Err(HarnessError::Execution {
                group: group.name.clone(),
                status: "exit status: 1".into(),
            });
        }
        Ok(())
    }
}
