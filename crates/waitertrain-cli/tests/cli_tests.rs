//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use waitertrain_core::catalog::BUILTIN_CATALOG;
use waitertrain_core::model::Session;
use waitertrain_core::report::{load_summary_directory, SessionSummary};

fn waitertrain(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("waitertrain").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("WAITERTRAIN_OPENAI_KEY")
        .env_remove("WAITERTRAIN_ANTHROPIC_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn workspace(config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("waitertrain.toml"), config).unwrap();
    dir
}

const CANNED: &str = r#"
[feedback]
type = "canned"
feedback = "Well done, keep eye contact."
"#;

const TWO_CATEGORY_CATALOG: &str = r#"
[training]
difficulty_levels = ["beginner"]
scenario_categories = ["cocktails", "wine"]

[scenarios.cocktails]
description = "Bar service"

[scenarios.cocktails.prompts]
beginner = "Scenario: A guest asks for something refreshing."

[scenarios.wine]
description = "Wine service"

[scenarios.wine.prompts]
beginner = "Scenario: A table asks for a wine pairing."
"#;

// ---------------------------------------------------------------------------
// train
// ---------------------------------------------------------------------------

#[test]
fn train_single_round_and_save_summary() {
    let dir = workspace(CANNED);

    waitertrain(dir.path())
        .args([
            "train",
            "--name",
            "Alice",
            "--difficulty",
            "beginner",
            "--category",
            "customer_greeting",
            "--output",
            "sessions",
        ])
        .write_stdin("I would smile and greet them right away.\nn\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello Alice!"))
        .stdout(predicate::str::contains("[customer_greeting]"))
        .stdout(predicate::str::contains("Scenario: Customer Greeting (Beginner)"))
        .stdout(predicate::str::contains("Feedback: Well done, keep eye contact."))
        .stdout(predicate::str::contains("Score: 10"))
        .stdout(predicate::str::contains("Suggested next:"))
        .stdout(predicate::str::contains("16.7%"))
        .stdout(predicate::str::contains("Summary saved to:"));

    let summaries = load_summary_directory(&dir.path().join("sessions")).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].trainee_name, "Alice");
    assert_eq!(summaries[0].final_score, 10.0);
    assert_eq!(summaries[0].completed_categories, vec!["customer_greeting"]);
    assert_eq!(summaries[0].feedback_count, 1);
}

#[test]
fn train_quit_before_answering() {
    let dir = workspace(CANNED);

    waitertrain(dir.path())
        .args(["train", "--name", "Bob", "--difficulty", "advanced"])
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Training at advanced level"))
        .stdout(predicate::str::contains("0.0%"))
        .stdout(predicate::str::contains("Feedback:").not());
}

#[test]
fn train_prompts_for_name_and_difficulty() {
    let dir = workspace(CANNED);

    waitertrain(dir.path())
        .arg("train")
        .write_stdin("\nIntermediate\n\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello Trainee!"))
        .stdout(predicate::str::contains("Training at intermediate level"))
        .stdout(predicate::str::contains("Please enter a response."));
}

#[test]
fn train_unknown_difficulty_falls_back() {
    let dir = workspace(CANNED);

    waitertrain(dir.path())
        .args(["train", "--name", "Cy", "--difficulty", "expert"])
        .write_stdin("end\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Unknown difficulty 'expert', using 'beginner'.",
        ))
        .stdout(predicate::str::contains("Training at beginner level"));
}

#[test]
fn train_until_every_category_is_done() {
    let dir = workspace(CANNED);
    std::fs::write(dir.path().join("bar.toml"), TWO_CATEGORY_CATALOG).unwrap();

    waitertrain(dir.path())
        .args([
            "train",
            "--name",
            "Dee",
            "--difficulty",
            "beginner",
            "--catalog",
            "bar.toml",
            "--category",
            "cocktails",
        ])
        .write_stdin("A mojito, perhaps?\ny\nA crisp white would suit the fish.\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Suggested next: wine"))
        .stdout(predicate::str::contains(
            "Congratulations! You've completed all training scenarios.",
        ))
        .stdout(predicate::str::contains("100.0%"));
}

#[test]
fn train_uses_fallback_feedback_when_provider_fails() {
    let dir = workspace("[feedback]\ntype = \"canned\"\nfail = true\n");

    waitertrain(dir.path())
        .args(["train", "--name", "Eve", "--difficulty", "beginner"])
        .write_stdin("Let me get the manager.\nno\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Feedback: Thank you for your response. I'm having trouble processing feedback right now",
        ))
        .stdout(predicate::str::contains("Score: 10"));
}

#[test]
fn train_rejects_unknown_category() {
    let dir = workspace(CANNED);

    waitertrain(dir.path())
        .args(["train", "--name", "Fi", "--category", "karaoke"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown category 'karaoke'"));
}

#[test]
fn train_requires_api_key_for_openai() {
    let dir = workspace("[feedback]\ntype = \"openai\"\napi_key = \"\"\n");

    waitertrain(dir.path())
        .args(["train", "--name", "Gus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("api_key is empty"));
}

// ---------------------------------------------------------------------------
// categories / prompt
// ---------------------------------------------------------------------------

#[test]
fn categories_lists_builtin_catalog() {
    let dir = TempDir::new().unwrap();

    waitertrain(dir.path())
        .arg("categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("customer_greeting"))
        .stdout(predicate::str::contains("service_recovery"))
        .stdout(predicate::str::contains(
            "Difficulty levels: beginner, intermediate, advanced (default: beginner)",
        ));
}

#[test]
fn categories_json_output() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bar.toml"), TWO_CATEGORY_CATALOG).unwrap();

    let output = waitertrain(dir.path())
        .args(["categories", "--json", "--catalog", "bar.toml"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = parsed.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["category"], "cocktails");
    assert_eq!(entries[1]["description"], "Wine service");
}

#[test]
fn prompt_prints_scenario_text() {
    let dir = TempDir::new().unwrap();

    waitertrain(dir.path())
        .args(["prompt", "--category", "upselling", "--difficulty", "advanced"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scenario:"))
        .stdout(predicate::str::contains("(advanced)"));
}

#[test]
fn prompt_with_unknown_difficulty_uses_default() {
    let dir = TempDir::new().unwrap();

    waitertrain(dir.path())
        .args(["prompt", "--category", "order_taking", "--difficulty", "expert"])
        .assert()
        .success()
        .stderr(predicate::str::contains("using 'beginner'"))
        .stdout(predicate::str::contains("(beginner)"));
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_builtin_catalog() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("restaurant.toml"), BUILTIN_CATALOG).unwrap();

    waitertrain(dir.path())
        .args(["validate", "--catalog", "restaurant.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6 categories, 3 difficulty levels"))
        .stdout(predicate::str::contains("Catalog valid."));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("thin.toml"),
        "[training]\ndifficulty_levels = [\"beginner\"]\nscenario_categories = [\"cocktails\", \"cocktails\"]\n",
    )
    .unwrap();

    waitertrain(dir.path())
        .args(["validate", "--catalog", "thin.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[cocktails] WARNING: duplicate category"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_rejects_empty_catalog() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("empty.toml"),
        "[training]\ndifficulty_levels = [\"beginner\"]\nscenario_categories = []\n",
    )
    .unwrap();

    waitertrain(dir.path())
        .args(["validate", "--catalog", "empty.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();

    waitertrain(dir.path())
        .args(["validate", "--catalog", "nonexistent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

// ---------------------------------------------------------------------------
// init / progress
// ---------------------------------------------------------------------------

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    waitertrain(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created waitertrain.toml"))
        .stdout(predicate::str::contains("Created catalogs/restaurant.toml"));

    assert!(dir.path().join("waitertrain.toml").exists());
    assert!(dir.path().join("catalogs/restaurant.toml").exists());

    waitertrain(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists, skipping"));

    waitertrain(dir.path())
        .args(["validate", "--catalog", "catalogs/restaurant.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Catalog valid."));
}

#[test]
fn progress_aggregates_saved_summaries() {
    let dir = TempDir::new().unwrap();
    let sessions = dir.path().join("sessions");

    for (name, categories) in [
        ("Alice", vec!["upselling"]),
        ("Alice", vec!["upselling", "order_taking"]),
        ("Bob", vec![]),
    ] {
        let mut session = Session::new(name, "beginner");
        for category in categories {
            session.record_completion(category);
            session.add_score(10.0, 100.0);
        }
        let summary = SessionSummary::from_session(&session, 6, session.started_at);
        summary.save_json(&sessions.join(summary.file_name())).unwrap();
    }

    waitertrain(dir.path())
        .args(["progress", "--dir", "sessions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice"))
        .stdout(predicate::str::contains("Bob"))
        .stdout(predicate::str::contains("3 session(s) across 2 trainee(s)."));
}

#[test]
fn progress_with_no_summaries() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("sessions")).unwrap();

    waitertrain(dir.path())
        .args(["progress", "--dir", "sessions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No session summaries found"));
}
