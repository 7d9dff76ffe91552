//! Engine module: discovers toolchains, owns the active-toolchain switch, and orchestrates runs.
//!
//! # Architecture
//!
//! - **Catalog** (`catalog`): read-only discovery of installed toolchains and the active one.
//! - **Switch** (`toolchain`): the only code that mutates the system-wide active toolchain,
//!   always through a `ToolchainGuard` that restores the original on release or drop.
//! - **Workflow** (`workflow`): the `Orchestrator` composing catalog, switch and a
//!   `crate::backend::BenchmarkExecutor` into one run.
//!
//! # Boundaries
//!
//! - The catalog never switches anything.
//! - Executors never know which toolchain is active; they benchmark whatever is selected.
//! - Every failure is reported into a `RunReport`; none escapes the orchestrator.

pub mod catalog;
pub mod toolchain;
pub mod workflow;

// Re-export key types for convenience
pub use catalog::{StaticCatalog, VersionCatalog, XcodeCatalog, catalog_for};
pub use toolchain::{
    CommandSwitch, RecordingSwitch, RestoreTarget, ToolchainGuard, ToolchainSwitch, with_toolchain,
};
pub use workflow::{Discovery, Orchestrator, RunReport, Selection, parse_selection};
