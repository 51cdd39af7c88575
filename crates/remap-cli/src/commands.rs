//! Command implementations

use crate::OutputFormat;
use crate::output::OutputFormatter;
use anyhow::{Context, Result};
use remap_core::{ConfigLoader, ManualEntries, MappingEngine, Snapshot};
use std::fs;
use std::path::Path;

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot '{}'", path.display()))?;
    let snapshot = if is_yaml(path) {
        Snapshot::from_yaml(&content)
    } else {
        Snapshot::from_json(&content)
    };
    snapshot.with_context(|| format!("Invalid snapshot '{}'", path.display()))
}

fn load_manual_entries(path: &Path) -> Result<ManualEntries> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manual entries '{}'", path.display()))?;
    let entries = if is_yaml(path) {
        ManualEntries::from_yaml(&content)
    } else {
        ManualEntries::from_json(&content)
    };
    entries.with_context(|| format!("Invalid manual entries '{}'", path.display()))
}

/// Recompute one mapping and print the result. Returns the exit code.
pub fn evaluate_command(
    snapshot_path: &Path,
    manual_path: Option<&Path>,
    config_path: Option<&Path>,
    format: OutputFormat,
    unresolved_only: bool,
    fail_on_incompatible: bool,
    use_colors: bool,
) -> Result<i32> {
    let config = ConfigLoader::load(config_path, None)?;
    let tree = load_snapshot(snapshot_path)?.into_tree()?;
    let manual = match manual_path {
        Some(path) => load_manual_entries(path)?,
        None => ManualEntries::new(),
    };
    tracing::info!(
        "Evaluating {} fields with {} manual entries",
        tree.len(),
        manual.len()
    );

    let result = MappingEngine::new(&config).recompute(&tree, &manual);

    OutputFormatter::new(format, use_colors).print_result(&result, unresolved_only)?;

    if fail_on_incompatible && result.summary.incompatible > 0 {
        return Ok(1);
    }
    Ok(0)
}

/// Print the effective configuration
pub fn config_show_command(config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(config_path, None)?;
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}
