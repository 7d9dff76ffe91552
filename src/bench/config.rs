use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::core::{BenchmarkCase, MatrixGroup, ToolchainVersion};
use crate::{HarnessError, HarnessResult};

pub const DEFAULT_CONFIG: &str = "typecheck-bench.toml";

/// Built-in configuration used when no config file is present.
pub const BUILTIN_CONFIG: &str = include_str!("../../typecheck-bench.toml");

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Argv prefix that runs the compiler in type-check-only mode
    pub command: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            command: to_strings(&["xcrun", "-n", "swiftc", "-typecheck"]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Benchmarking tool binary
    pub program: PathBuf,
    /// Cache-invalidation command run before every measured command
    pub setup: Vec<String>,
    /// Stream the measured commands' output
    pub show_output: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig {
            program: PathBuf::from("hyperfine"),
            setup: to_strings(&["xcrun", "--kill-cache"]),
            show_output: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SwitchConfig {
    /// Argv prefix of the activation command; the toolchain path is appended
    pub command: Vec<String>,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        SwitchConfig {
            command: to_strings(&["sudo", "xcode-select", "-s"]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Directories scanned for Xcode*.app bundles
    pub search_dirs: Vec<PathBuf>,
    /// Command printing the active toolchain version (e.g. `xcodebuild -version`)
    pub version_command: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        DiscoveryConfig {
            search_dirs: vec![PathBuf::from("/Applications")],
            version_command: to_strings(&["xcodebuild", "-version"]),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "default_warmup")]
    warmup: u32,
    #[serde(default)]
    runs: Option<u32>,
    #[serde(default)]
    source_dir: Option<PathBuf>,
    #[serde(default)]
    compiler: CompilerConfig,
    #[serde(default)]
    executor: ExecutorConfig,
    #[serde(default)]
    switch: SwitchConfig,
    #[serde(default)]
    discovery: DiscoveryConfig,
    #[serde(default, rename = "toolchain")]
    toolchains: Vec<ToolchainVersion>,
    #[serde(default)]
    current_version: Option<String>,
    #[serde(default)]
    matrix: toml::Table,
}

fn default_warmup() -> u32 {
    1
}

/// Fully resolved harness configuration.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub warmup: u32,
    pub runs: Option<u32>,
    pub source_dir: Option<PathBuf>,
    pub compiler: CompilerConfig,
    pub executor: ExecutorConfig,
    pub switch: SwitchConfig,
    pub discovery: DiscoveryConfig,
    /// Static toolchain list; when non-empty it replaces live discovery
    pub toolchains: Vec<ToolchainVersion>,
    pub current_version: Option<String>,
    /// Groups and cases in file order
    pub matrix: Vec<MatrixGroup>,
}

/// Parse a TOML config string.
pub fn parse_config(s: &str) -> HarnessResult<HarnessConfig> {
    let raw: RawConfig = toml::from_str(s).map_err(|e| HarnessError::Config(e.to_string()))?;
    let matrix = matrix_from_table(raw.matrix)?;

    if raw.compiler.command.is_empty() {
        return Err(HarnessError::Config("compiler.command must not be empty".into()));
    }
    if raw.switch.command.is_empty() {
        return Err(HarnessError::Config("switch.command must not be empty".into()));
    }
    if raw.executor.setup.is_empty() {
        return Err(HarnessError::Config("executor.setup must not be empty".into()));
    }
    if raw.runs == Some(0) {
        return Err(HarnessError::Config("runs must be at least 1".into()));
    }

    Ok(HarnessConfig {
        warmup: raw.warmup,
        runs: raw.runs,
        source_dir: raw.source_dir,
        compiler: raw.compiler,
        executor: raw.executor,
        switch: raw.switch,
        discovery: raw.discovery,
        toolchains: raw.toolchains,
        current_version: raw.current_version,
        matrix,
    })
}

/// Load the harness config.
///
/// An explicit path must exist. Without one, `typecheck-bench.toml` in the working directory
/// is used if present, otherwise the built-in matrix.
pub fn load_config(path: Option<&Path>) -> HarnessResult<HarnessConfig> {
    let (s, origin) = match path {
        Some(p) => {
            let s = std::fs::read_to_string(p)
                .with_context(|| format!("failed to read config {}", p.display()))?;
            (s, p.display().to_string())
        }
        None if Path::new(DEFAULT_CONFIG).exists() => {
            let s = std::fs::read_to_string(DEFAULT_CONFIG)
                .with_context(|| format!("failed to read config {DEFAULT_CONFIG}"))?;
            (s, DEFAULT_CONFIG.to_string())
        }
        None => (BUILTIN_CONFIG.to_string(), "<built-in>".to_string()),
    };
    tracing::debug!(config = %origin, "loading config");
    parse_config(&s)
}

/// Convert the `[matrix]` table into ordered groups.
///
/// Relies on `toml`'s `preserve_order` so groups and cases keep their file order.
fn matrix_from_table(table: toml::Table) -> HarnessResult<Vec<MatrixGroup>> {
    if table.is_empty() {
        return Err(HarnessError::Config("matrix has no groups".into()));
    }
    let mut groups = Vec::with_capacity(table.len());
    for (group_name, value) in table {
        let toml::Value::Table(cases_table) = value else {
            return Err(HarnessError::Config(format!(
                "matrix.{group_name} must be a table of cases"
            )));
        };
        if cases_table.is_empty() {
            return Err(HarnessError::Config(format!("matrix.{group_name} has no cases")));
        }
        let mut cases = Vec::with_capacity(cases_table.len());
        for (case_name, inputs) in cases_table {
            let inputs = string_list(&inputs).ok_or_else(|| {
                HarnessError::Config(format!(
                    "matrix.{group_name}.{case_name} must be a list of file names"
                ))
            })?;
            if inputs.is_empty() {
                return Err(HarnessError::Config(format!(
                    "matrix.{group_name}.{case_name} has no inputs"
                )));
            }
            cases.push(BenchmarkCase { name: case_name, inputs });
        }
        groups.push(MatrixGroup { name: group_name, cases });
    }
    Ok(groups)
}

fn string_list(value: &toml::Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
