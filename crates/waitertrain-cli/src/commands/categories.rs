//! The `waitertrain categories` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn execute(catalog_path: Option<PathBuf>, json: bool) -> Result<()> {
    let catalog = super::resolve_catalog(catalog_path.as_deref())?;
    let summaries = catalog.summaries();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Category", "Description"]);
    for summary in &summaries {
        table.add_row(vec![Cell::new(&summary.category), Cell::new(&summary.description)]);
    }

    println!("{table}");
    println!(
        "Difficulty levels: {} (default: {})",
        catalog.difficulty_levels().join(", "),
        catalog.default_difficulty()
    );
    Ok(())
}
