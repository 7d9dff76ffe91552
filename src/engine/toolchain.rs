//! Switching the system-wide active toolchain.
//!
//! The active toolchain is global state owned by the OS. It is only changed through a
//! `ToolchainGuard`, which restores the original toolchain when released or dropped, so the
//! restore attempt happens on every exit path including panics.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{error, info, warn};

use crate::bench::config::SwitchConfig;
use crate::{HarnessError, HarnessResult};

/// Makes a toolchain the system-wide active one.
pub trait ToolchainSwitch {
    /// Activate the toolchain installed at `path`.
    ///
    /// # Errors
    /// `HarnessError::Switch` when the privileged operation fails.
    fn activate(&self, path: &Path) -> HarnessResult<()>;
}

/// Switches toolchains by running an external command (default `sudo xcode-select -s <path>`).
#[derive(Debug, Clone)]
pub struct CommandSwitch {
    command: Vec<String>,
}

impl Default for CommandSwitch {
    fn default() -> Self {
        Self::from_config(&SwitchConfig::default())
    }
}

impl CommandSwitch {
    pub fn from_config(cfg: &SwitchConfig) -> Self {
        CommandSwitch {
            command: cfg.command.clone(),
        }
    }
}

impl ToolchainSwitch for CommandSwitch {
    fn activate(&self, path: &Path) -> HarnessResult<()> {
        let switch_err = |cause: String| HarnessError::Switch {
            path: path.to_path_buf(),
            cause,
        };
        let Some((program, args)) = self.command.split_first() else {
            return Err(switch_err("switch command is empty".into()));
        };
        info!(path = %path.display(), "activating toolchain");
        let status = Command::new(program)
            .args(args)
            .arg(path)
            .status()
            .map_err(|e| switch_err(format!("failed to run {program}: {e}")))?;
        if !status.success() {
            return Err(switch_err(format!("{program} exited with {status}")));
        }
        Ok(())
    }
}

/// Where the guard should return the system when it is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreTarget {
    Path(PathBuf),
    /// The original toolchain could not be resolved; the reason is reported on release.
    Unknown(String),
}

impl RestoreTarget {
    pub fn from_option(path: Option<PathBuf>, reason: impl Into<String>) -> Self {
        match path {
            Some(p) => RestoreTarget::Path(p),
            None => RestoreTarget::Unknown(reason.into()),
        }
    }
}

/// Scoped ownership of the active toolchain.
///
/// Activations go through the guard; once anything was activated, `release` (or `Drop`)
/// reactivates the restore target. A guard that never activated anything restores nothing.
pub struct ToolchainGuard<'a> {
    switch: &'a dyn ToolchainSwitch,
    restore_to: RestoreTarget,
    touched: bool,
    released: bool,
}

impl<'a> ToolchainGuard<'a> {
    pub fn new(switch: &'a dyn ToolchainSwitch, restore_to: RestoreTarget) -> Self {
        ToolchainGuard {
            switch,
            restore_to,
            touched: false,
            released: false,
        }
    }

    /// Activate `path`. A failure is returned to the caller but still counts as a mutation
    /// attempt, so the original toolchain is restored afterwards.
    pub fn activate(&mut self, path: &Path) -> HarnessResult<()> {
        self.touched = true;
        self.switch.activate(path)
    }

    /// Whether an activation was attempted through this guard.
    pub fn touched(&self) -> bool {
        self.touched
    }

    /// Restore the original toolchain.
    ///
    /// # Errors
    /// `HarnessError::RestoreFailure` if the target is unknown or reactivation fails.
    pub fn release(mut self) -> HarnessResult<()> {
        self.released = true;
        self.restore()
    }

    fn restore(&self) -> HarnessResult<()> {
        if !self.touched {
            return Ok(());
        }
        match &self.restore_to {
            RestoreTarget::Path(path) => {
                self.switch
                    .activate(path)
                    .map_err(|e| HarnessError::RestoreFailure {
                        reason: e.to_string(),
                    })?;
                info!(path = %path.display(), "restored original toolchain");
                Ok(())
            }
            RestoreTarget::Unknown(reason) => Err(HarnessError::RestoreFailure {
                reason: reason.clone(),
            }),
        }
    }
}

impl Drop for ToolchainGuard<'_> {
    fn drop(&mut self) {
        if self.released || !self.touched {
            return;
        }
        warn!("toolchain guard dropped without release; restoring");
        if let Err(e) = self.restore() {
            error!("{e}");
        }
    }
}

/// Run `action` with `target` active, then restore `restore_to`.
///
/// `action` receives the activation outcome; a failed activation does not stop it, so the
/// work runs against whatever toolchain is actually active. Returns the action's value and
/// the restoration outcome.
pub fn with_toolchain<T>(
    switch: &dyn ToolchainSwitch,
    target: &Path,
    restore_to: RestoreTarget,
    action: impl FnOnce(HarnessResult<()>) -> T,
) -> (T, HarnessResult<()>) {
    let mut guard = ToolchainGuard::new(switch, restore_to);
    let activation = guard.activate(target);
    let value = action(activation);
    let restored = guard.release();
    (value, restored)
}

/// Switch that records activations instead of touching the system.
#[derive(Debug, Default)]
pub struct RecordingSwitch {
    active: RefCell<Option<PathBuf>>,
    activations: RefCell<Vec<PathBuf>>,
    failing: HashSet<PathBuf>,
}

impl RecordingSwitch {
    /// Start with `initial` as the active toolchain.
    pub fn new(initial: Option<PathBuf>) -> Self {
        RecordingSwitch {
            active: RefCell::new(initial),
            ..Default::default()
        }
    }

    /// Make activation of `path` fail.
    pub fn failing_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing.insert(path.into());
        self
    }

    /// The currently active toolchain.
    pub fn active(&self) -> Option<PathBuf> {
        self.active.borrow().clone()
    }

    /// Every activation attempted, in order, including failed ones.
    pub fn activations(&self) -> Vec<PathBuf> {
        self.activations.borrow().clone()
    }
}

impl ToolchainSwitch for RecordingSwitch {
    fn activate(&self, path: &Path) -> HarnessResult<()> {
        self.activations.borrow_mut().push(path.to_path_buf());
        if self.failing.contains(path) {
            return Err(HarnessError::Switch {
                path: path.to_path_buf(),
                cause: "permission denied".into(),
            });
        }
        *self.active.borrow_mut() = Some(path.to_path_buf());
        Ok(())
    }
}
