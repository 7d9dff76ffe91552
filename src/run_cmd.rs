use std::io::{stdin, stdout};
use std::path::PathBuf;

use tracing::info;

use crate::HarnessResult;
use crate::backend::{HyperfineConfig, HyperfineExecutor};
use crate::bench::{build_matrix, load_config};
use crate::engine::{CommandSwitch, Orchestrator, catalog_for};

/// Run the benchmark matrix, prompting for a toolchain unless `select` is given.
pub fn run(
    config: Option<PathBuf>,
    select: Option<String>,
    warmup: Option<u32>,
) -> HarnessResult<()> {
    let cfg = load_config(config.as_deref())?;
    let groups = build_matrix(&cfg.matrix, &cfg.compiler.command);
    let warmup = warmup.unwrap_or(cfg.warmup);

    let catalog = catalog_for(&cfg);
    let switch = CommandSwitch::from_config(&cfg.switch);
    let executor = HyperfineExecutor::new(
        HyperfineConfig::from_executor_config(&cfg.executor)
            .with_runs(cfg.runs)
            .with_working_dir(cfg.source_dir.clone()),
    );
    let orchestrator = Orchestrator::new(catalog.as_ref(), &switch, &executor, groups, warmup);

    let report = match select {
        Some(answer) => orchestrator.run_with_answer(&answer, stdout().lock()),
        None => orchestrator.run(stdin().lock(), stdout().lock()),
    };
    info!(
        groups_run = report.groups_run,
        groups_failed = report.groups_failed,
        issues = report.issues.len(),
        restored = ?report.restored,
        "run finished"
    );
    Ok(())
}
