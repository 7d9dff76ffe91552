use std::path::PathBuf;

use anyhow::Context;
use serde_json::json;

use crate::HarnessResult;
use crate::backend::{HyperfineConfig, hyperfine_args};
use crate::bench::{HarnessConfig, build_matrix, load_config};

/// Describe the benchmark plan (groups, commands and hyperfine arguments) as JSON.
pub fn plan_json(cfg: &HarnessConfig, warmup: u32) -> HarnessResult<serde_json::Value> {
    let groups = build_matrix(&cfg.matrix, &cfg.compiler.command);
    let hyperfine = HyperfineConfig::from_executor_config(&cfg.executor).with_runs(cfg.runs);
    let mut out = Vec::with_capacity(groups.len());
    for group in &groups {
        let args = hyperfine_args(&hyperfine, group, warmup)?;
        out.push(json!({
            "name": group.name,
            "commands": group.commands,
            "hyperfine_args": args,
        }));
    }
    Ok(json!({
        "warmup": warmup,
        "runs": cfg.runs,
        "source_dir": cfg.source_dir,
        "executor": hyperfine.program,
        "groups": out,
    }))
}

/// Print the plan without spawning anything, or write it to `json`.
pub fn run(config: Option<PathBuf>, warmup: Option<u32>, json: Option<PathBuf>) -> HarnessResult<()> {
    let cfg = load_config(config.as_deref())?;
    let plan = plan_json(&cfg, warmup.unwrap_or(cfg.warmup))?;
    let rendered = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;
    match json {
        Some(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir).ok();
            }
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
