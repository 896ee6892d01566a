//! The scenario catalog: an immutable category × difficulty prompt lookup.
//!
//! Lookups never fail. An unconfigured difficulty resolves to the catalog's
//! default level, and a category without template text renders a generic
//! prompt instead of an error.

use std::collections::HashMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::model::DEFAULT_DIFFICULTY;
use crate::parser;

/// Description used for categories the catalog has no text for.
pub const FALLBACK_DESCRIPTION: &str = "Training scenario for restaurant service";

/// The restaurant catalog shipped with waitertrain.
pub const BUILTIN_CATALOG: &str = include_str!("../catalogs/restaurant.toml");

/// Prompt text and description for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioTemplate {
    /// Short human-readable summary of what the category trains.
    #[serde(default)]
    pub description: Option<String>,
    /// Prompt text keyed by difficulty level.
    #[serde(default)]
    pub prompts: HashMap<String, String>,
}

impl ScenarioTemplate {
    pub fn new(description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            prompts: HashMap::new(),
        }
    }

    pub fn with_prompt(mut self, difficulty: &str, text: &str) -> Self {
        self.prompts.insert(difficulty.to_string(), text.to_string());
        self
    }
}

/// Introspection record for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub category: String,
    pub description: String,
    pub difficulty_levels: Vec<String>,
}

/// Raw catalog contents, before validation.
#[derive(Debug, Clone, Default)]
pub struct CatalogSpec {
    pub difficulty_levels: Vec<String>,
    pub categories: Vec<String>,
    /// Explicit default level; `None` picks "beginner" or the first level.
    pub default_difficulty: Option<String>,
    pub templates: HashMap<String, ScenarioTemplate>,
}

/// Immutable scenario catalog.
#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    difficulty_levels: Vec<String>,
    categories: Vec<String>,
    default_difficulty: String,
    templates: HashMap<String, ScenarioTemplate>,
}

impl ScenarioCatalog {
    /// Build a catalog from raw contents, rejecting structurally broken input.
    pub fn from_spec(spec: CatalogSpec) -> Result<Self> {
        anyhow::ensure!(
            !spec.difficulty_levels.is_empty(),
            "catalog must configure at least one difficulty level"
        );
        anyhow::ensure!(
            !spec.categories.is_empty(),
            "catalog must configure at least one scenario category"
        );

        let difficulty_levels = dedup(spec.difficulty_levels);
        let categories = dedup(spec.categories);

        let default_difficulty = match spec.default_difficulty {
            Some(level) => {
                anyhow::ensure!(
                    difficulty_levels.contains(&level),
                    "default difficulty '{level}' is not one of {difficulty_levels:?}"
                );
                level
            }
            None if difficulty_levels.iter().any(|l| l == DEFAULT_DIFFICULTY) => {
                DEFAULT_DIFFICULTY.to_string()
            }
            None => difficulty_levels[0].clone(),
        };

        Ok(Self {
            difficulty_levels,
            categories,
            default_difficulty,
            templates: spec.templates,
        })
    }

    /// Catalog with the given levels and categories and no template text.
    pub fn new(difficulty_levels: &[&str], categories: &[&str]) -> Result<Self> {
        Self::from_spec(CatalogSpec {
            difficulty_levels: difficulty_levels.iter().map(|s| s.to_string()).collect(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
            default_difficulty: None,
            templates: HashMap::new(),
        })
    }

    /// The built-in restaurant catalog.
    pub fn builtin() -> Result<Self> {
        parser::parse_catalog_str(BUILTIN_CATALOG, std::path::Path::new("<builtin>"))
    }

    pub fn with_template(mut self, category: &str, template: ScenarioTemplate) -> Self {
        self.templates.insert(category.to_string(), template);
        self
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn difficulty_levels(&self) -> &[String] {
        &self.difficulty_levels
    }

    pub fn default_difficulty(&self) -> &str {
        &self.default_difficulty
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    pub fn template(&self, category: &str) -> Option<&ScenarioTemplate> {
        self.templates.get(category)
    }

    /// The level prompts are rendered at for a requested difficulty.
    pub fn resolve_difficulty<'a>(&'a self, difficulty: &'a str) -> &'a str {
        if self.difficulty_levels.iter().any(|l| l == difficulty) {
            difficulty
        } else {
            &self.default_difficulty
        }
    }

    /// Render the scenario text for `(category, difficulty)`.
    pub fn prompt_for(&self, category: &str, difficulty: &str) -> String {
        let level = self.resolve_difficulty(difficulty);

        self.templates
            .get(category)
            .and_then(|t| t.prompts.get(level))
            .cloned()
            .unwrap_or_else(|| {
                format!("Please provide a response to a {category} scenario at {level} level.")
            })
    }

    pub fn describe(&self, category: &str) -> &str {
        self.templates
            .get(category)
            .and_then(|t| t.description.as_deref())
            .unwrap_or(FALLBACK_DESCRIPTION)
    }

    pub fn summary(&self, category: &str) -> ScenarioSummary {
        ScenarioSummary {
            category: category.to_string(),
            description: self.describe(category).to_string(),
            difficulty_levels: self.difficulty_levels.clone(),
        }
    }

    /// Summaries for every configured category, in configured order.
    pub fn summaries(&self) -> Vec<ScenarioSummary> {
        self.categories.iter().map(|c| self.summary(c)).collect()
    }
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
