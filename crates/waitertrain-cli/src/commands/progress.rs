//! The `waitertrain progress` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use waitertrain_core::report::load_summary_directory;
use waitertrain_core::statistics::compute_progress;

pub fn execute(dir: PathBuf) -> Result<()> {
    let summaries = load_summary_directory(&dir)?;
    if summaries.is_empty() {
        println!("No session summaries found in {}", dir.display());
        return Ok(());
    }

    let progress = compute_progress(&summaries);

    let mut table = Table::new();
    table.set_header(vec![
        "Trainee",
        "Sessions",
        "Avg Score",
        "Best Score",
        "Best Completion",
        "Minutes",
        "Categories",
        "Latest Level",
    ]);

    for p in progress.values() {
        table.add_row(vec![
            Cell::new(&p.trainee_name),
            Cell::new(p.sessions),
            Cell::new(format!("{:.1}", p.avg_final_score)),
            Cell::new(format!("{:.1}", p.best_final_score)),
            Cell::new(format!("{:.1}%", p.best_completion_rate)),
            Cell::new(format!("{:.2}", p.total_minutes)),
            Cell::new(p.categories_covered.len()),
            Cell::new(&p.latest_difficulty),
        ]);
    }

    println!("{table}");
    println!("{} session(s) across {} trainee(s).", summaries.len(), progress.len());
    Ok(())
}
