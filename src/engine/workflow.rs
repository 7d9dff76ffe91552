//! Orchestration of a benchmark run.
//!
//! A run discovers the installed toolchains, asks which one to use, then benchmarks the
//! whole matrix against the current toolchain, one selected toolchain, or every toolchain in
//! ascending version order. Every failure is reported into a `RunReport`; nothing escapes
//! past the orchestrator, and the original toolchain is restored whenever one was switched.

use std::io::{BufRead, Write};

use tracing::{error, info, warn};

use crate::backend::BenchmarkExecutor;
use crate::core::{BenchmarkGroup, ToolchainVersion, order_versions};
use crate::{HarnessError, HarnessResult};

use super::catalog::VersionCatalog;
use super::toolchain::{RestoreTarget, ToolchainGuard, ToolchainSwitch, with_toolchain};

/// What the user asked to benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Keep the active toolchain; nothing is switched.
    Current,
    /// Every installed toolchain, ascending.
    All,
    /// One toolchain by its 1-based position in the ordered listing.
    Index(usize),
}

/// Parse a prompt answer against a listing of `count` toolchains.
///
/// Empty input selects the current toolchain, `a`/`all` every toolchain, and `1..=count` a
/// single one. Anything else is an `InvalidSelection`.
pub fn parse_selection(input: &str, count: usize) -> HarnessResult<Selection> {
    let choice = input.trim().to_lowercase();
    let invalid = || HarnessError::InvalidSelection {
        input: input.trim().to_string(),
        count,
    };
    match choice.as_str() {
        "" => Ok(Selection::Current),
        "a" | "all" => Ok(Selection::All),
        s => match s.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => Ok(Selection::Index(n)),
            _ => Err(invalid()),
        },
    }
}

/// Outcome of one orchestrated run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Every reported failure, in the order it occurred
    pub issues: Vec<HarnessError>,
    /// Executor invocations, failed ones included
    pub groups_run: usize,
    pub groups_failed: usize,
    /// Toolchain versions benchmarked after a switch
    pub versions_run: Vec<String>,
    /// `Some` when the active toolchain was switched: whether it was restored
    pub restored: Option<bool>,
}

impl RunReport {
    fn record(&mut self, err: HarnessError) {
        match &err {
            HarnessError::RestoreFailure { .. } => error!("{err}"),
            _ => warn!("{err}"),
        }
        self.issues.push(err);
    }

    fn record_restore(&mut self, restored: HarnessResult<()>) {
        self.restored = Some(restored.is_ok());
        if let Err(e) = restored {
            self.record(e);
        }
    }

    /// Whether the selection was rejected (and so nothing ran).
    pub fn invalid_selection(&self) -> bool {
        self.issues
            .iter()
            .any(|e| matches!(e, HarnessError::InvalidSelection { .. }))
    }

    pub fn restore_failed(&self) -> bool {
        self.restored == Some(false)
    }
}

/// Toolchain state captured at the start of a run.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub current: Option<String>,
    pub all: Vec<ToolchainVersion>,
}

impl Discovery {
    /// Resolve the install path of the toolchain that was active at startup.
    pub fn restore_target(&self) -> RestoreTarget {
        let Some(label) = &self.current else {
            return RestoreTarget::Unknown("original toolchain version is unknown".into());
        };
        let path = self
            .all
            .iter()
            .find(|t| &t.version == label)
            .map(|t| t.path.clone());
        RestoreTarget::from_option(
            path,
            format!("no installed toolchain matches original version {label}"),
        )
    }
}

/// Drives discovery, selection, switching and execution for one run.
pub struct Orchestrator<'a> {
    catalog: &'a dyn VersionCatalog,
    switch: &'a dyn ToolchainSwitch,
    executor: &'a dyn BenchmarkExecutor,
    groups: Vec<BenchmarkGroup>,
    warmup: u32,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        catalog: &'a dyn VersionCatalog,
        switch: &'a dyn ToolchainSwitch,
        executor: &'a dyn BenchmarkExecutor,
        groups: Vec<BenchmarkGroup>,
        warmup: u32,
    ) -> Self {
        Orchestrator {
            catalog,
            switch,
            executor,
            groups,
            warmup,
        }
    }

    /// Query the catalog. Failures degrade to an unknown current version or an empty list.
    pub fn discover(&self, report: &mut RunReport) -> Discovery {
        let current = self.catalog.current_version().unwrap_or_else(|e| {
            report.record(e);
            None
        });
        let all = self.catalog.all_versions().unwrap_or_else(|e| {
            report.record(e);
            Vec::new()
        });
        info!(current = ?current, installed = all.len(), "discovered toolchains");
        Discovery { current, all }
    }

    /// Interactive run: list toolchains on `out`, read one answer from `input`, dispatch.
    ///
    /// End of input counts as an empty answer.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut out: W) -> RunReport {
        let mut report = RunReport::default();
        let Some((discovery, ordered)) = self.prepare(&mut report, &mut out) else {
            finish(&mut out, &report);
            return report;
        };

        let _ = write!(out, "Enter your choice (1-{}, 'a' or Enter): ", ordered.len());
        let _ = out.flush();
        let mut answer = String::new();
        if let Err(e) = input.read_line(&mut answer) {
            report.record(HarnessError::Message(format!("failed to read selection: {e}")));
            finish(&mut out, &report);
            return report;
        }
        let _ = writeln!(out);

        self.select(&answer, &ordered, &discovery, &mut report, &mut out);
        finish(&mut out, &report);
        report
    }

    /// Non-interactive run with a pre-supplied answer, using the same grammar as the prompt.
    pub fn run_with_answer<W: Write>(&self, answer: &str, mut out: W) -> RunReport {
        let mut report = RunReport::default();
        if let Some((discovery, ordered)) = self.prepare(&mut report, &mut out) {
            let _ = writeln!(out, "Selection: {}", answer.trim());
            self.select(answer, &ordered, &discovery, &mut report, &mut out);
        }
        finish(&mut out, &report);
        report
    }

    /// Discover and list toolchains. Returns `None` when the listing cannot be produced.
    fn prepare<W: Write>(
        &self,
        report: &mut RunReport,
        out: &mut W,
    ) -> Option<(Discovery, Vec<ToolchainVersion>)> {
        let discovery = self.discover(report);
        announce_current(out, &discovery);
        let ordered = self.present(&discovery, report, out)?;
        Some((discovery, ordered))
    }

    /// Parse the answer and dispatch it. An invalid answer runs nothing and switches nothing.
    fn select<W: Write>(
        &self,
        answer: &str,
        ordered: &[ToolchainVersion],
        discovery: &Discovery,
        report: &mut RunReport,
        out: &mut W,
    ) {
        match parse_selection(answer, ordered.len()) {
            Ok(selection) => self.dispatch(selection, ordered, discovery, report, out),
            Err(e) => {
                let _ = writeln!(out, "Invalid selection. No benchmarks run.");
                report.record(e);
            }
        }
    }

    /// Print the ordered listing. Returns `None` if the versions cannot be ordered.
    fn present<W: Write>(
        &self,
        discovery: &Discovery,
        report: &mut RunReport,
        out: &mut W,
    ) -> Option<Vec<ToolchainVersion>> {
        let ordered = match order_versions(&discovery.all) {
            Ok(ordered) => ordered,
            Err(e) => {
                let _ = writeln!(out, "Cannot order installed toolchains. No benchmarks run.");
                report.record(e);
                return None;
            }
        };
        let current = discovery.current.as_deref().unwrap_or("unknown");
        let _ = writeln!(
            out,
            "\nEnter the number of the toolchain version you want to use, 'a' to test all versions, \
             or press Enter to continue with the current version {current}:"
        );
        for (i, tc) in ordered.iter().enumerate() {
            let _ = writeln!(out, "{}: {}", i + 1, tc.display_label());
        }
        Some(ordered)
    }

    fn dispatch<W: Write>(
        &self,
        selection: Selection,
        ordered: &[ToolchainVersion],
        discovery: &Discovery,
        report: &mut RunReport,
        out: &mut W,
    ) {
        match selection {
            Selection::Current => self.run_matrix(report),
            Selection::Index(n) => {
                let target = &ordered[n - 1];
                let _ = writeln!(out, "\nRunning benchmarks on toolchain version: {}", target.version);
                let ((), restored) = with_toolchain(
                    self.switch,
                    &target.path,
                    discovery.restore_target(),
                    |activation| {
                        if let Err(e) = activation {
                            report.record(e);
                        }
                        self.run_matrix(report);
                    },
                );
                report.versions_run.push(target.version.clone());
                self.report_restore(restored, discovery, report, out);
            }
            Selection::All => self.run_all(ordered, discovery, report, out),
        }
    }

    /// Benchmark every toolchain in order, restoring the original one once at the end.
    fn run_all<W: Write>(
        &self,
        ordered: &[ToolchainVersion],
        discovery: &Discovery,
        report: &mut RunReport,
        out: &mut W,
    ) {
        let mut guard = ToolchainGuard::new(self.switch, discovery.restore_target());
        for tc in ordered {
            let _ = writeln!(out, "\nRunning benchmarks on toolchain version: {}", tc.version);
            if let Err(e) = guard.activate(&tc.path) {
                report.record(e);
            }
            self.run_matrix(report);
            report.versions_run.push(tc.version.clone());
            let _ = writeln!(out, "Finished benchmarks on {}", tc.version);
        }
        if guard.touched() {
            let restored = guard.release();
            self.report_restore(restored, discovery, report, out);
        }
    }

    /// Run every group once against whatever toolchain is active. A failing group does not
    /// stop the remaining ones.
    fn run_matrix(&self, report: &mut RunReport) {
        for group in &self.groups {
            info!(group = %group.name, executor = self.executor.name(), "benchmarking group");
            report.groups_run += 1;
            if let Err(e) = self.executor.run(group, self.warmup) {
                report.groups_failed += 1;
                report.record(e);
            }
        }
    }

    fn report_restore<W: Write>(
        &self,
        restored: HarnessResult<()>,
        discovery: &Discovery,
        report: &mut RunReport,
        out: &mut W,
    ) {
        match &restored {
            Ok(()) => {
                let version = discovery.current.as_deref().unwrap_or_default();
                let _ = writeln!(out, "\nRestored toolchain version to: {version}");
            }
            Err(_) => {
                let _ = writeln!(out, "\nFailed to restore the original toolchain version.");
            }
        }
        report.record_restore(restored);
    }
}

fn announce_current<W: Write>(out: &mut W, discovery: &Discovery) {
    match &discovery.current {
        Some(v) => {
            let _ = writeln!(out, "Current toolchain version: {v}");
        }
        None => {
            let _ = writeln!(out, "Unable to determine the current toolchain version.");
        }
    }
}

fn finish<W: Write>(out: &mut W, report: &RunReport) {
    let _ = writeln!(
        out,
        "\nFinished: {} group run(s), {} failed, {} issue(s) reported.",
        report.groups_run,
        report.groups_failed,
        report.issues.len()
    );
    for issue in &report.issues {
        let _ = writeln!(out, "  - {issue}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_selection_tokens() {
        assert_eq!(parse_selection("", 3).unwrap(), Selection::Current);
        assert_eq!(parse_selection("  \n", 3).unwrap(), Selection::Current);
        assert_eq!(parse_selection("a", 3).unwrap(), Selection::All);
        assert_eq!(parse_selection("A\n", 3).unwrap(), Selection::All);
        assert_eq!(parse_selection("all", 3).unwrap(), Selection::All);
        assert_eq!(parse_selection("1", 3).unwrap(), Selection::Index(1));
        assert_eq!(parse_selection(" 3 ", 3).unwrap(), Selection::Index(3));
    }

    #[test]
    fn test_parse_selection_rejects() {
        for input in ["0", "4", "99", "x", "-1", "1.5", "al"] {
            match parse_selection(input, 3) {
                Err(HarnessError::InvalidSelection { input: got, count }) => {
                    assert_eq!(got, input);
                    assert_eq!(count, 3);
                }
                other => panic!("{input:?} should be rejected, got {other:?}"),
            }
        }
        assert!(parse_selection("1", 0).is_err());
    }

    #[test]
    fn test_restore_target_by_label() {
        let discovery = Discovery {
            current: Some("15.2".into()),
            all: vec![
                ToolchainVersion::new("/Applications/Xcode-14.3.app", "14.3", false),
                ToolchainVersion::new("/Applications/Xcode.app", "15.2", false),
            ],
        };
        assert_eq!(
            discovery.restore_target(),
            RestoreTarget::Path(PathBuf::from("/Applications/Xcode.app"))
        );
    }

    #[test]
    fn test_restore_target_unresolved() {
        let unknown = Discovery {
            current: None,
            all: vec![ToolchainVersion::new("/Applications/Xcode.app", "15.2", false)],
        };
        assert!(matches!(unknown.restore_target(), RestoreTarget::Unknown(_)));

        let unmatched = Discovery {
            current: Some("13.0".into()),
            all: unknown.all.clone(),
        };
        match unmatched.restore_target() {
            RestoreTarget::Unknown(reason) => assert!(reason.contains("13.0")),
            other => panic!("unexpected target: {other:?}"),
        }
    }
}
