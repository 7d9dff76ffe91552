use std::path::PathBuf;

use crate::HarnessResult;
use crate::bench::load_config;
use crate::core::order_versions;
use crate::engine::catalog_for;

/// Print installed toolchains in ascending version order, marking the active one.
pub fn run(config: Option<PathBuf>) -> HarnessResult<()> {
    let cfg = load_config(config.as_deref())?;
    let catalog = catalog_for(&cfg);
    let current = catalog.current_version().unwrap_or_else(|e| {
        tracing::warn!("{e}");
        None
    });
    let ordered = order_versions(&catalog.all_versions()?)?;
    if ordered.is_empty() {
        println!("no toolchains found");
    }
    for (i, tc) in ordered.iter().enumerate() {
        let marker = if current.as_deref() == Some(tc.version.as_str()) { " *" } else { "" };
        println!("{}: {} => {}{}", i + 1, tc.display_label(), tc.path.display(), marker);
    }
    Ok(())
}
