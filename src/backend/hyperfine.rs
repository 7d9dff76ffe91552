//! hyperfine executor implementation.

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, info, warn};

use crate::bench::config::ExecutorConfig;
use crate::core::{BenchmarkGroup, CommandDescriptor};
use crate::{HarnessError, HarnessResult};

use super::traits::BenchmarkExecutor;

/// Configuration for the hyperfine executor.
#[derive(Debug, Clone)]
pub struct HyperfineConfig {
    /// Path to the hyperfine binary
    pub program: PathBuf,
    /// Cache-invalidation command run before each timed command
    pub setup: Vec<String>,
    /// Pass --show-output so compiler output streams through
    pub show_output: bool,
    /// Exact number of measured runs (hyperfine picks when unset)
    pub runs: Option<u32>,
    /// Working directory for the benchmark, so relative inputs resolve
    pub working_dir: Option<PathBuf>,
}

impl Default for HyperfineConfig {
    fn default() -> Self {
        Self::from_executor_config(&ExecutorConfig::default())
    }
}

impl HyperfineConfig {
    pub fn from_executor_config(cfg: &ExecutorConfig) -> Self {
        HyperfineConfig {
            program: cfg.program.clone(),
            setup: cfg.setup.clone(),
            show_output: cfg.show_output,
            runs: None,
            working_dir: None,
        }
    }

    /// Set the number of measured runs.
    pub fn with_runs(mut self, runs: Option<u32>) -> Self {
        self.runs = runs;
        self
    }

    /// Set the working directory.
    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }
}

/// Render an argv as one shell-quoted command line.
///
/// hyperfine takes each benchmarked command as a single string, so arguments are quoted
/// rather than concatenated.
pub fn command_line(argv: &[String]) -> HarnessResult<String> {
    shlex::try_join(argv.iter().map(String::as_str))
        .map_err(|e| HarnessError::Message(format!("cannot quote command {argv:?}: {e}")))
}

/// Build the hyperfine argument list for one group.
pub fn hyperfine_args(
    config: &HyperfineConfig,
    group: &BenchmarkGroup,
    warmup: u32,
) -> HarnessResult<Vec<String>> {
    let mut args = vec!["--setup".to_string(), command_line(&config.setup)?];
    if config.show_output {
        args.push("--show-output".to_string());
    }
    args.push("--warmup".to_string());
    args.push(warmup.to_string());
    if let Some(runs) = config.runs {
        args.push("--runs".to_string());
        args.push(runs.to_string());
    }
    for CommandDescriptor { label, argv } in &group.commands {
        args.push("--command-name".to_string());
        args.push(label.clone());
        args.push(command_line(argv)?);
    }
    Ok(args)
}

/// Benchmarks groups by spawning hyperfine.
pub struct HyperfineExecutor {
    config: HyperfineConfig,
}

impl HyperfineExecutor {
    pub fn new(config: HyperfineConfig) -> Self {
        HyperfineExecutor { config }
    }
}

impl BenchmarkExecutor for HyperfineExecutor {
    fn name(&self) -> &str {
        "hyperfine"
    }

    fn run(&self, group: &BenchmarkGroup, warmup: u32) -> HarnessResult<()> {
        let args = hyperfine_args(&self.config, group, warmup)?;
        debug!(group = %group.name, ?args, "spawning {}", self.config.program.display());

        let mut cmd = Command::new(&self.config.program);
        cmd.args(&args);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        let status = cmd.status().map_err(|e| HarnessError::Execution {
            group: group.name.clone(),
            status: format!("failed to spawn {}: {e}", self.config.program.display()),
        })?;

        if !status.success() {
            warn!(group = %group.name, %status, "benchmark group failed");
            return Err(HarnessError::Execution {
                group: group.name.clone(),
                status: status.to_string(),
            });
        }
        info!(group = %group.name, commands = group.commands.len(), "benchmark group finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> BenchmarkGroup {
        BenchmarkGroup {
            name: "String".into(),
            commands: vec![
                CommandDescriptor {
                    label: "A".into(),
                    argv: vec!["xcrun".into(), "swiftc".into(), "-typecheck".into(), "a.swift".into()],
                },
                CommandDescriptor {
                    label: "B".into(),
                    argv: vec!["xcrun".into(), "swiftc".into(), "-typecheck".into(), "my file.swift".into()],
                },
            ],
        }
    }

    #[test]
    fn test_command_line_quotes_spaces() {
        let line = command_line(&["swiftc".into(), "my file.swift".into()]).unwrap();
        assert_ne!(line, "swiftc my file.swift");
        assert_eq!(shlex::split(&line).unwrap(), vec!["swiftc", "my file.swift"]);
    }

    #[test]
    fn test_hyperfine_args_layout() {
        let args = hyperfine_args(&HyperfineConfig::default(), &group(), 1).unwrap();
        assert_eq!(
            args[..10],
            [
                "--setup",
                "xcrun --kill-cache",
                "--show-output",
                "--warmup",
                "1",
                "--command-name",
                "A",
                "xcrun swiftc -typecheck a.swift",
                "--command-name",
                "B",
            ]
        );
        assert_eq!(args.len(), 11);
        assert_eq!(
            shlex::split(&args[10]).unwrap(),
            vec!["xcrun", "swiftc", "-typecheck", "my file.swift"]
        );
    }

    #[test]
    fn test_hyperfine_args_runs_and_quiet() {
        let mut cfg = HyperfineConfig::default().with_runs(Some(5));
        cfg.show_output = false;
        let args = hyperfine_args(&cfg, &group(), 3).unwrap();
        assert!(!args.contains(&"--show-output".to_string()));
        let warmup_at = args.iter().position(|a| a == "--warmup").unwrap();
        assert_eq!(args[warmup_at + 1], "3");
        let runs_at = args.iter().position(|a| a == "--runs").unwrap();
        assert_eq!(args[runs_at + 1], "5");
    }

    #[test]
    fn test_hyperfine_args_deterministic() {
        let cfg = HyperfineConfig::default();
        assert_eq!(
            hyperfine_args(&cfg, &group(), 1).unwrap(),
            hyperfine_args(&cfg, &group(), 1).unwrap()
        );
    }

    #[test]
    fn test_missing_program_is_execution_error() {
        let cfg = HyperfineConfig {
            program: PathBuf::from("/nonexistent/hyperfine-bin"),
            ..Default::default()
        };
        let err = HyperfineExecutor::new(cfg).run(&group(), 0).unwrap_err();
        match err {
            HarnessError::Execution { group, .. } => assert_eq!(group, "String"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
