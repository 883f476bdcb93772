//! Subcommand handlers. Output goes to the supplied writer so handlers stay testable.

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use tlib_loader::register_dir;
use tlib_registry::ConfigRegistry;

/// Registers every config file in `dir` with `registry`.
pub fn register_all(registry: &ConfigRegistry, dir: &Path) -> Result<Vec<String>> {
    register_dir::<Value>(registry, dir)
        .with_context(|| format!("Failed to register configs from {}", dir.display()))
}

/// Writes one module id per line.
pub fn list(registry: &ConfigRegistry, out: &mut impl Write) -> Result<()> {
    for module_id in registry.module_ids() {
        writeln!(out, "{module_id}")?;
    }
    Ok(())
}

/// Materializes each module and writes it as pretty JSON under a `# <module>` header.
pub fn show(registry: &ConfigRegistry, modules: &[String], out: &mut impl Write) -> Result<()> {
    for module_id in modules {
        let config = registry
            .get::<Value>(module_id)
            .with_context(|| format!("Failed to load module '{module_id}'"))?;

        writeln!(out, "# {module_id}")?;
        writeln!(out, "{}", serde_json::to_string_pretty(config.as_ref())?)?;
    }
    Ok(())
}
