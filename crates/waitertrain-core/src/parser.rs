//! TOML scenario catalog parser.
//!
//! Loads catalogs from TOML files and validates them. Structural problems
//! (missing `[training]`, empty lists) are hard errors so the application
//! refuses to start; softer issues are reported as warnings.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::catalog::{CatalogSpec, ScenarioCatalog, ScenarioTemplate};

/// Intermediate TOML structure for parsing catalog files.
#[derive(Debug, Deserialize)]
struct TomlCatalogFile {
    training: TomlTrainingSection,
    #[serde(default)]
    scenarios: HashMap<String, TomlScenario>,
}

#[derive(Debug, Deserialize)]
struct TomlTrainingSection {
    difficulty_levels: Vec<String>,
    scenario_categories: Vec<String>,
    #[serde(default)]
    default_difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlScenario {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    prompts: HashMap<String, String>,
}

/// Parse a catalog file and build a validated `ScenarioCatalog`.
pub fn parse_catalog(path: &Path) -> Result<ScenarioCatalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

    parse_catalog_str(&content, path)
}

/// Parse a catalog from a TOML string (useful for testing).
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Result<ScenarioCatalog> {
    let spec = parse_catalog_spec(content, source_path)?;
    ScenarioCatalog::from_spec(spec)
        .with_context(|| format!("invalid catalog: {}", source_path.display()))
}

/// Parse a catalog into its raw, unvalidated contents.
pub fn parse_catalog_spec(content: &str, source_path: &Path) -> Result<CatalogSpec> {
    let parsed: TomlCatalogFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let templates = parsed
        .scenarios
        .into_iter()
        .map(|(category, s)| {
            let prompts = s
                .prompts
                .into_iter()
                .map(|(level, text)| (level, text.trim().to_string()))
                .collect();
            (
                category,
                ScenarioTemplate {
                    description: s.description.map(|d| d.trim().to_string()),
                    prompts,
                },
            )
        })
        .collect();

    Ok(CatalogSpec {
        difficulty_levels: parsed.training.difficulty_levels,
        categories: parsed.training.scenario_categories,
        default_difficulty: parsed.training.default_difficulty,
        templates,
    })
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The category (if applicable).
    pub category: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate raw catalog contents for common issues.
pub fn validate_catalog(spec: &CatalogSpec) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen = HashSet::new();
    for category in &spec.categories {
        if !seen.insert(category) {
            warnings.push(ValidationWarning {
                category: Some(category.clone()),
                message: format!("duplicate category: {category}"),
            });
        }
    }

    let mut seen = HashSet::new();
    for level in &spec.difficulty_levels {
        if !seen.insert(level) {
            warnings.push(ValidationWarning {
                category: None,
                message: format!("duplicate difficulty level: {level}"),
            });
        }
    }

    // Configured categories without text render the generic prompt
    let mut checked = HashSet::new();
    for category in &spec.categories {
        if !checked.insert(category) {
            continue;
        }
        let Some(template) = spec.templates.get(category) else {
            warnings.push(ValidationWarning {
                category: Some(category.clone()),
                message: "no scenario template; the generic prompt will be used".into(),
            });
            continue;
        };

        if template.description.is_none() {
            warnings.push(ValidationWarning {
                category: Some(category.clone()),
                message: "no description provided".into(),
            });
        }

        for level in &spec.difficulty_levels {
            match template.prompts.get(level) {
                None => warnings.push(ValidationWarning {
                    category: Some(category.clone()),
                    message: format!("no prompt for difficulty '{level}'"),
                }),
                Some(text) if text.trim().is_empty() => warnings.push(ValidationWarning {
                    category: Some(category.clone()),
                    message: format!("prompt for difficulty '{level}' is empty"),
                }),
                Some(_) => {}
            }
        }
    }

    let mut orphans: Vec<&String> = spec
        .templates
        .keys()
        .filter(|c| !spec.categories.contains(c))
        .collect();
    orphans.sort();
    for category in orphans {
        warnings.push(ValidationWarning {
            category: Some(category.clone()),
            message: "template is not listed in scenario_categories and will never be served"
                .into(),
        });
    }

    warnings
}
