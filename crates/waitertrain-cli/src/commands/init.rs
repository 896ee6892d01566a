//! The `waitertrain init` command.

use std::path::Path;

use anyhow::Result;

use waitertrain_core::catalog::BUILTIN_CATALOG;
use waitertrain_providers::config::CONFIG_FILE_NAME;

const CATALOG_PATH: &str = "catalogs/restaurant.toml";

pub fn execute() -> Result<()> {
    if Path::new(CONFIG_FILE_NAME).exists() {
        println!("{CONFIG_FILE_NAME} already exists, skipping.");
    } else {
        std::fs::write(CONFIG_FILE_NAME, SAMPLE_CONFIG)?;
        println!("Created {CONFIG_FILE_NAME}");
    }

    std::fs::create_dir_all("catalogs")?;
    if Path::new(CATALOG_PATH).exists() {
        println!("{CATALOG_PATH} already exists, skipping.");
    } else {
        std::fs::write(CATALOG_PATH, BUILTIN_CATALOG)?;
        println!("Created {CATALOG_PATH}");
    }

    println!("\nNext steps:");
    println!("  1. Pick a feedback provider in {CONFIG_FILE_NAME} and set its API key");
    println!("  2. Run: waitertrain validate --catalog {CATALOG_PATH}");
    println!("  3. Run: waitertrain train --name <your name>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# waitertrain configuration

# Feedback backend: openai | anthropic | ollama | canned
[feedback]
type = "canned"

# [feedback]
# type = "openai"
# api_key = "${OPENAI_API_KEY}"
# model = "gpt-4"

# [feedback]
# type = "anthropic"
# api_key = "${ANTHROPIC_API_KEY}"
# model = "claude-3-5-haiku-latest"

# [feedback]
# type = "ollama"
# base_url = "http://localhost:11434"
# model = "llama3"

[training]
catalog = "catalogs/restaurant.toml"
score_increment = 10.0
max_score = 100.0
feedback_timeout_secs = 30
temperature = 0.7
max_tokens = 200
"#;
