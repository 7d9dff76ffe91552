//! Toolchain discovery.
//!
//! A `VersionCatalog` reports the installed toolchains and the label of the active one.
//! `XcodeCatalog` discovers Xcode bundles on disk; `StaticCatalog` serves a fixed list from
//! config or tests.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::bench::config::{DiscoveryConfig, HarnessConfig};
use crate::core::ToolchainVersion;
use crate::{HarnessError, HarnessResult};

/// Read-only view of the installed toolchains.
pub trait VersionCatalog {
    /// Version label of the active toolchain, if it can be determined.
    fn current_version(&self) -> HarnessResult<Option<String>>;

    /// Every installed toolchain, in discovery order.
    fn all_versions(&self) -> HarnessResult<Vec<ToolchainVersion>>;
}

/// Parse the version label out of `xcodebuild -version` output.
///
/// Expected format:
/// ```text
/// Xcode 15.2
/// Build version 15C500b
/// ```
pub fn parse_xcode_version(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix("Xcode "))
        .and_then(|rest| rest.split_whitespace().next())
        .map(str::to_string)
}

/// Whether a bundle path names a beta install (e.g. `Xcode-beta.app`, `Xcode_16_Beta_3.app`).
pub fn is_beta_bundle(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase().contains("beta"))
        .unwrap_or(false)
}

fn is_xcode_bundle(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
        return false;
    };
    name.starts_with("Xcode") && name.ends_with(".app") && path.is_dir()
}

/// Discovers Xcode installs by scanning directories for `Xcode*.app` bundles.
#[derive(Debug, Clone)]
pub struct XcodeCatalog {
    search_dirs: Vec<PathBuf>,
    version_command: Vec<String>,
}

impl Default for XcodeCatalog {
    fn default() -> Self {
        Self::from_config(&DiscoveryConfig::default())
    }
}

impl XcodeCatalog {
    pub fn from_config(cfg: &DiscoveryConfig) -> Self {
        XcodeCatalog {
            search_dirs: cfg.search_dirs.clone(),
            version_command: cfg.version_command.clone(),
        }
    }

    /// Run the version command, optionally against a specific developer directory.
    fn query_version(&self, developer_dir: Option<&Path>) -> HarnessResult<String> {
        let Some((program, args)) = self.version_command.split_first() else {
            return Err(HarnessError::Config("discovery.version_command must not be empty".into()));
        };
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = developer_dir {
            cmd.env("DEVELOPER_DIR", dir);
        }
        let output = cmd.output().map_err(|e| {
            HarnessError::DiscoverySourceUnavailable(format!("failed to run {program}: {e}"))
        })?;
        if !output.status.success() {
            return Err(HarnessError::DiscoverySourceUnavailable(format!(
                "{program} failed with status: {}",
                output.status
            )));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_xcode_version(&stdout).ok_or_else(|| {
            HarnessError::DiscoverySourceUnavailable(format!(
                "unrecognised version output: {}",
                stdout.trim()
            ))
        })
    }

    fn bundles(&self) -> Vec<PathBuf> {
        let mut bundles = Vec::new();
        for dir in &self.search_dirs {
            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = %dir.display(), "cannot scan for toolchains: {e}");
                    continue;
                }
            };
            bundles.extend(
                entries
                    .flatten()
                    .map(|e| e.path())
                    .filter(|p| is_xcode_bundle(p)),
            );
        }
        bundles.sort();
        bundles
    }
}

impl VersionCatalog for XcodeCatalog {
    fn current_version(&self) -> HarnessResult<Option<String>> {
        self.query_version(None).map(Some)
    }

    fn all_versions(&self) -> HarnessResult<Vec<ToolchainVersion>> {
        let mut versions = Vec::new();
        for bundle in self.bundles() {
            let developer_dir = bundle.join("Contents").join("Developer");
            match self.query_version(Some(&developer_dir)) {
                Ok(version) => {
                    debug!(path = %bundle.display(), %version, "found toolchain");
                    let beta = is_beta_bundle(&bundle);
                    versions.push(ToolchainVersion::new(bundle, version, beta));
                }
                Err(e) => warn!(path = %bundle.display(), "skipping toolchain: {e}"),
            }
        }
        Ok(versions)
    }
}

/// Catalog backed by a fixed list of toolchains.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    versions: Vec<ToolchainVersion>,
    current: Option<String>,
    unavailable: bool,
}

impl StaticCatalog {
    pub fn new(versions: Vec<ToolchainVersion>, current: Option<String>) -> Self {
        StaticCatalog {
            versions,
            current,
            unavailable: false,
        }
    }

    /// Make the current-version query fail, as an unreachable discovery source would.
    pub fn current_unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}

impl VersionCatalog for StaticCatalog {
    fn current_version(&self) -> HarnessResult<Option<String>> {
        if self.unavailable {
            return Err(HarnessError::DiscoverySourceUnavailable(
                "current version query failed".into(),
            ));
        }
        Ok(self.current.clone())
    }

    fn all_versions(&self) -> HarnessResult<Vec<ToolchainVersion>> {
        Ok(self.versions.clone())
    }
}

/// Pick the catalog a config asks for: the static `[[toolchain]]` list when present,
/// live Xcode discovery otherwise.
pub fn catalog_for(cfg: &HarnessConfig) -> Box<dyn VersionCatalog> {
    if cfg.toolchains.is_empty() {
        Box::new(XcodeCatalog::from_config(&cfg.discovery))
    } else {
        Box::new(StaticCatalog::new(cfg.toolchains.clone(), cfg.current_version.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_xcode_version() {
        let output = "Xcode 15.2\nBuild version 15C500b\n";
        assert_eq!(parse_xcode_version(output), Some("15.2".to_string()));
        assert_eq!(parse_xcode_version("Xcode 14.3.1\n"), Some("14.3.1".to_string()));
    }

    #[test]
    fn test_parse_xcode_version_unrecognised() {
        assert_eq!(parse_xcode_version(""), None);
        assert_eq!(parse_xcode_version("Build version 15C500b"), None);
    }

    #[test]
    fn test_is_beta_bundle() {
        assert!(is_beta_bundle(Path::new("/Applications/Xcode-beta.app")));
        assert!(is_beta_bundle(Path::new("/Applications/Xcode_16_Beta_3.app")));
        assert!(!is_beta_bundle(Path::new("/Applications/Xcode.app")));
    }

    #[test]
    fn test_static_catalog() {
        let catalog = StaticCatalog::new(
            vec![ToolchainVersion::new("/Applications/Xcode.app", "15.2", false)],
            Some("15.2".into()),
        );
        assert_eq!(catalog.current_version().unwrap(), Some("15.2".to_string()));
        assert_eq!(catalog.all_versions().unwrap().len(), 1);

        let down = catalog.current_unavailable();
        assert!(matches!(
            down.current_version(),
            Err(HarnessError::DiscoverySourceUnavailable(_))
        ));
        assert_eq!(down.all_versions().unwrap().len(), 1);
    }

    #[test]
    fn test_catalog_for_static_config() {
        let cfg = crate::bench::parse_config(
            "current_version = \"15.2\"\n\n[[toolchain]]\npath = \"/Applications/Xcode.app\"\nversion = \"15.2\"\n\n[matrix.G]\nA = [\"a.swift\"]\n",
        )
        .unwrap();
        let catalog = catalog_for(&cfg);
        assert_eq!(catalog.current_version().unwrap(), Some("15.2".to_string()));
        assert_eq!(catalog.all_versions().unwrap()[0].version, "15.2");
    }

    #[test]
    fn test_xcode_catalog_missing_search_dir_is_empty() {
        let catalog = XcodeCatalog::from_config(&DiscoveryConfig {
            search_dirs: vec![PathBuf::from("/nonexistent/applications")],
            version_command: vec!["xcodebuild".into(), "-version".into()],
        });
        assert!(catalog.all_versions().unwrap().is_empty());
    }

    #[test]
    fn test_xcode_catalog_unrunnable_version_command() {
        let catalog = XcodeCatalog::from_config(&DiscoveryConfig {
            search_dirs: vec![],
            version_command: vec!["/nonexistent/xcodebuild".into()],
        });
        assert!(matches!(
            catalog.current_version(),
            Err(HarnessError::DiscoverySourceUnavailable(_))
        ));
    }
}
