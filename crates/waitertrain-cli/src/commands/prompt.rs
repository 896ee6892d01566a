//! The `waitertrain prompt` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(category: String, difficulty: Option<String>, catalog_path: Option<PathBuf>) -> Result<()> {
    let catalog = super::resolve_catalog(catalog_path.as_deref())?;
    anyhow::ensure!(
        catalog.contains(&category),
        "unknown category '{category}'. Available: {}",
        catalog.categories().join(", ")
    );

    let requested = difficulty.unwrap_or_else(|| catalog.default_difficulty().to_string());
    let level = catalog.resolve_difficulty(&requested);
    if level != requested {
        eprintln!("Difficulty '{requested}' is not configured, using '{level}'.");
    }

    println!("{} ({level})", catalog.describe(&category));
    println!();
    println!("{}", catalog.prompt_for(&category, level));
    Ok(())
}
