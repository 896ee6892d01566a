//! waitertrain CLI: interactive restaurant service training.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "waitertrain",
    version,
    about = "Scenario-based training for restaurant waitstaff"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive training session
    Train {
        /// Trainee name (asked interactively when omitted)
        #[arg(long)]
        name: Option<String>,

        /// Difficulty level (asked interactively when omitted)
        #[arg(long)]
        difficulty: Option<String>,

        /// Category for the first scenario
        #[arg(long)]
        category: Option<String>,

        /// Scenario catalog TOML, overriding the config
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Directory to save the session summary JSON into
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List scenario categories
    Categories {
        /// Scenario catalog TOML
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print a single scenario prompt
    Prompt {
        /// Scenario category
        #[arg(long)]
        category: String,

        /// Difficulty level (catalog default when omitted)
        #[arg(long)]
        difficulty: Option<String>,

        /// Scenario catalog TOML
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Validate a scenario catalog file
    Validate {
        /// Path to the catalog TOML
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Show per-trainee progress from saved session summaries
    Progress {
        /// Directory of summary JSON files
        #[arg(long, default_value = "./waitertrain-sessions")]
        dir: PathBuf,
    },

    /// Create starter config and scenario catalog
    Init,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "waitertrain=debug"
    } else {
        "waitertrain=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse().expect("static directive is valid")),
        )
        .init();

    let result = match cli.command {
        Commands::Train {
            name,
            difficulty,
            category,
            catalog,
            output,
            config,
        } => {
            commands::train::execute(commands::train::TrainArgs {
                name,
                difficulty,
                category,
                catalog,
                output,
                config,
            })
            .await
        }
        Commands::Categories { catalog, json } => commands::categories::execute(catalog, json),
        Commands::Prompt {
            category,
            difficulty,
            catalog,
        } => commands::prompt::execute(category, difficulty, catalog),
        Commands::Validate { catalog } => commands::validate::execute(catalog),
        Commands::Progress { dir } => commands::progress::execute(dir),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
