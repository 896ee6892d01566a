//! The `waitertrain train` command: an interactive session over stdin.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Table};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use waitertrain_core::model::{NextStep, SessionId};
use waitertrain_core::report::SessionSummary;
use waitertrain_core::SessionManager;
use waitertrain_providers::{create_provider, load_catalog, load_config_from};

const DEFAULT_TRAINEE: &str = "Trainee";
const STOP_WORDS: [&str; 3] = ["quit", "exit", "end"];

pub struct TrainArgs {
    pub name: Option<String>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub catalog: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Line-oriented prompt/answer over stdin.
struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `question` and read one trimmed line. `None` at end of input.
    async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        print!("{question}");
        std::io::stdout().flush()?;
        let line = self.lines.next_line().await?;
        if line.is_none() {
            println!();
        }
        Ok(line.map(|l| l.trim().to_string()))
    }
}

pub async fn execute(args: TrainArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let catalog = load_catalog(&config, args.catalog.as_deref())?;
    let provider = create_provider(&config)?;
    tracing::debug!(provider = provider.name(), "feedback provider ready");

    if let Some(category) = &args.category {
        anyhow::ensure!(
            catalog.contains(category),
            "unknown category '{category}'. Available: {}",
            catalog.categories().join(", ")
        );
    }

    let manager = SessionManager::new(Arc::new(catalog), provider, config.manager_config());
    let mut console = Console::new();

    println!("Welcome to restaurant service training!");

    let name = match args.name {
        Some(name) => name,
        None => console.ask("Enter your name: ").await?.unwrap_or_default(),
    };
    let name = if name.trim().is_empty() {
        DEFAULT_TRAINEE.to_string()
    } else {
        name.trim().to_string()
    };

    let levels = manager.difficulty_levels().join(", ");
    let requested = match args.difficulty {
        Some(d) => d,
        None => console
            .ask(&format!("Choose a difficulty ({levels}): "))
            .await?
            .unwrap_or_default(),
    };
    let requested = requested.trim().to_lowercase();
    let fallback = manager.catalog().default_difficulty().to_string();
    let difficulty = if manager.difficulty_levels().contains(&requested) {
        requested
    } else {
        if !requested.is_empty() {
            println!("Unknown difficulty '{requested}', using '{fallback}'.");
        }
        fallback
    };

    let session_id = manager.start_session(&name, &difficulty).await;
    println!("\nHello {name}! Training at {difficulty} level.");

    run_loop(&manager, session_id, args.category, &mut console).await?;

    let summary = manager.end_session(session_id).await?;
    print_summary(&summary);

    if let Some(dir) = &args.output {
        let path = dir.join(summary.file_name());
        summary.save_json(&path)?;
        println!("Summary saved to: {}", path.display());
    }

    Ok(())
}

async fn run_loop(
    manager: &SessionManager,
    session_id: SessionId,
    first_category: Option<String>,
    console: &mut Console,
) -> Result<()> {
    let total = manager.categories().len();
    let mut next_category = first_category;

    loop {
        if let Some(status) = manager.get_status(session_id).await {
            println!(
                "\n--- Score: {:.0} | Completed: {}/{} ---",
                status.score,
                status.completed_categories.len(),
                total
            );
        }

        let scenario = manager
            .next_scenario(session_id, next_category.as_deref())
            .await?;
        println!(
            "\n[{}] {}",
            scenario.category,
            manager.describe(&scenario.category)
        );
        println!("{}", scenario.prompt);

        let response = loop {
            match console
                .ask("\nYour response (type 'quit' to end): ")
                .await?
            {
                None => return Ok(()),
                Some(text) if STOP_WORDS.contains(&text.to_lowercase().as_str()) => return Ok(()),
                Some(text) if text.is_empty() => println!("Please enter a response."),
                Some(text) => break text,
            }
        };

        let outcome = manager.respond_to_current(session_id, &response).await?;
        println!("\nFeedback: {}", outcome.feedback);
        println!("Score: {:.0}", outcome.score);

        match &outcome.suggested_next {
            NextStep::Category(category) => {
                println!("Suggested next: {category}");
                next_category = Some(category.clone());
            }
            NextStep::AllCompleted => {
                println!("{}", outcome.suggested_next);
                return Ok(());
            }
        }

        match console.ask("\nContinue training? (y/n): ").await? {
            Some(answer) if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") => {}
            _ => return Ok(()),
        }
    }
}

fn print_summary(summary: &SessionSummary) {
    let mut table = Table::new();
    table.set_header(vec!["Session Summary", ""]);
    table.add_row(vec![Cell::new("Trainee"), Cell::new(&summary.trainee_name)]);
    table.add_row(vec![Cell::new("Difficulty"), Cell::new(&summary.difficulty)]);
    table.add_row(vec![
        Cell::new("Duration"),
        Cell::new(format!("{:.2} min", summary.duration_minutes)),
    ]);
    table.add_row(vec![
        Cell::new("Final score"),
        Cell::new(format!("{:.0}", summary.final_score)),
    ]);
    table.add_row(vec![
        Cell::new("Completed"),
        Cell::new(if summary.completed_categories.is_empty() {
            "-".to_string()
        } else {
            summary.completed_categories.join(", ")
        }),
    ]);
    table.add_row(vec![
        Cell::new("Feedback received"),
        Cell::new(summary.feedback_count),
    ]);
    table.add_row(vec![
        Cell::new("Completion rate"),
        Cell::new(format!("{:.1}%", summary.completion_rate)),
    ]);

    println!("\n{table}");
}
