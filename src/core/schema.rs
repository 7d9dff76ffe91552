//! Data model for toolchains and benchmark matrices.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// An installed, selectable toolchain as reported by discovery.
///
/// Identity is `path`; `version` is the comparison key and need not be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainVersion {
    /// Install location passed to the activation command (e.g. /Applications/Xcode.app)
    pub path: PathBuf,
    /// Dot-separated numeric version label (e.g. "15.2")
    pub version: String,
    /// Whether this install is a beta release
    #[serde(default)]
    pub beta: bool,
}

impl ToolchainVersion {
    pub fn new(path: impl Into<PathBuf>, version: impl Into<String>, beta: bool) -> Self {
        ToolchainVersion {
            path: path.into(),
            version: version.into(),
            beta,
        }
    }

    /// Label shown in listings, with a beta annotation where applicable.
    pub fn display_label(&self) -> String {
        if self.beta {
            format!("{} (beta)", self.version)
        } else {
            self.version.clone()
        }
    }
}

/// One named source variant: the inputs handed to the compiler, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkCase {
    pub name: String,
    pub inputs: Vec<String>,
}

/// A configured group of cases that are measured together in one benchmarking-tool run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixGroup {
    pub name: String,
    pub cases: Vec<BenchmarkCase>,
}

/// A labelled command ready to hand to the benchmarking tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub label: String,
    pub argv: Vec<String>,
}

/// A built group: one descriptor per case, in configured order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkGroup {
    pub name: String,
    pub commands: Vec<CommandDescriptor>,
}

impl BenchmarkGroup {
    pub fn labels(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.label.as_str()).collect()
    }
}
