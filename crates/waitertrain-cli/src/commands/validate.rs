//! The `waitertrain validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use waitertrain_core::catalog::ScenarioCatalog;
use waitertrain_core::parser::{parse_catalog_spec, validate_catalog};

pub fn execute(catalog_path: PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(&catalog_path)
        .with_context(|| format!("failed to read catalog: {}", catalog_path.display()))?;
    let spec = parse_catalog_spec(&content, &catalog_path)?;
    let warnings = validate_catalog(&spec);
    let catalog = ScenarioCatalog::from_spec(spec)
        .with_context(|| format!("invalid catalog: {}", catalog_path.display()))?;

    println!(
        "Catalog: {} ({} categories, {} difficulty levels)",
        catalog_path.display(),
        catalog.categories().len(),
        catalog.difficulty_levels().len()
    );

    for w in &warnings {
        let prefix = w
            .category
            .as_ref()
            .map(|c| format!("  [{c}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Catalog valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
