//! Trainer configuration and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use waitertrain_core::catalog::ScenarioCatalog;
use waitertrain_core::parser::parse_catalog;
use waitertrain_core::traits::FeedbackProvider;
use waitertrain_core::SessionManagerConfig;

use crate::anthropic::AnthropicProvider;
use crate::canned::CannedProvider;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;
use crate::GenerationSettings;

pub const CONFIG_FILE_NAME: &str = "waitertrain.toml";

/// Which backend produces feedback.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default = "default_anthropic_model")]
        model: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_model")]
        model: String,
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
    Canned {
        #[serde(default)]
        feedback: Option<String>,
        #[serde(default)]
        by_category: HashMap<String, String>,
        /// Fail every call; exercises the fallback feedback path.
        #[serde(default)]
        fail: bool,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                model,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("model", model)
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Anthropic {
                api_key: _,
                model,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("model", model)
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Ollama { model, base_url } => f
                .debug_struct("Ollama")
                .field("model", model)
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Canned {
                feedback,
                by_category,
                fail,
            } => f
                .debug_struct("Canned")
                .field("feedback", feedback)
                .field("by_category", &by_category.len())
                .field("fail", fail)
                .finish(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Canned {
            feedback: None,
            by_category: HashMap::new(),
            fail: false,
        }
    }
}

impl ProviderConfig {
    /// Short name matching the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderConfig::OpenAI { .. } => "openai",
            ProviderConfig::Anthropic { .. } => "anthropic",
            ProviderConfig::Ollama { .. } => "ollama",
            ProviderConfig::Canned { .. } => "canned",
        }
    }
}

fn default_openai_model() -> String {
    "gpt-4".to_string()
}
fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}
fn default_ollama_model() -> String {
    "llama3".to_string()
}
fn default_ollama_url() -> String {
    crate::ollama::DEFAULT_BASE_URL.to_string()
}

/// Scoring, timeout and sampling knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    /// Scenario catalog file. The built-in restaurant catalog when unset.
    pub catalog: Option<PathBuf>,
    pub score_increment: f64,
    pub max_score: f64,
    pub feedback_timeout_secs: u64,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        let manager = SessionManagerConfig::default();
        Self {
            catalog: None,
            score_increment: manager.score_increment,
            max_score: manager.max_score,
            feedback_timeout_secs: manager.feedback_timeout.as_secs(),
            temperature: 0.7,
            max_tokens: 200,
        }
    }
}

/// Top-level waitertrain configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainerConfig {
    #[serde(default)]
    pub feedback: ProviderConfig,
    #[serde(default)]
    pub training: TrainingSettings,
}

impl TrainerConfig {
    /// Reject settings the session manager cannot run with.
    pub fn validate(&self) -> Result<()> {
        let t = &self.training;
        if !(t.max_score > 0.0) {
            anyhow::bail!("training.max_score must be positive, got {}", t.max_score);
        }
        if !(t.score_increment >= 0.0) {
            anyhow::bail!(
                "training.score_increment must not be negative, got {}",
                t.score_increment
            );
        }
        if t.feedback_timeout_secs == 0 {
            anyhow::bail!("training.feedback_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn manager_config(&self) -> SessionManagerConfig {
        SessionManagerConfig {
            score_increment: self.training.score_increment,
            max_score: self.training.max_score,
            feedback_timeout: Duration::from_secs(self.training.feedback_timeout_secs),
        }
    }

    fn generation_settings(&self, model: &str) -> GenerationSettings {
        GenerationSettings {
            model: model.to_string(),
            temperature: self.training.temperature,
            max_tokens: self.training.max_tokens,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            model,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            model: resolve_env_vars(model),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
        },
        ProviderConfig::Anthropic {
            api_key,
            model,
            base_url,
        } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            model: resolve_env_vars(model),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::Ollama { model, base_url } => ProviderConfig::Ollama {
            model: resolve_env_vars(model),
            base_url: resolve_env_vars(base_url),
        },
        canned @ ProviderConfig::Canned { .. } => canned.clone(),
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `waitertrain.toml` in the current directory
/// 2. `~/.config/waitertrain/config.toml`
///
/// Environment variable overrides: `WAITERTRAIN_OPENAI_KEY`, `WAITERTRAIN_ANTHROPIC_KEY`.
pub fn load_config() -> Result<TrainerConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<TrainerConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => TrainerConfig::default(),
    };

    apply_env_overrides(&mut config, config_path.is_none());
    config.feedback = resolve_provider_config(&config.feedback);
    config.validate()?;

    Ok(config)
}

/// Parse config TOML without consulting the environment.
pub fn parse_config_str(content: &str) -> Result<TrainerConfig> {
    Ok(toml::from_str::<TrainerConfig>(content)?)
}

/// Key overrides apply to a matching configured provider. With no config file
/// at all, a key in the environment selects that provider outright.
fn apply_env_overrides(config: &mut TrainerConfig, defaults_only: bool) {
    let replaceable = defaults_only && matches!(config.feedback, ProviderConfig::Canned { .. });

    if let Ok(key) = std::env::var("WAITERTRAIN_ANTHROPIC_KEY") {
        if let ProviderConfig::Anthropic { api_key, .. } = &mut config.feedback {
            *api_key = key;
        } else if replaceable {
            config.feedback = ProviderConfig::Anthropic {
                api_key: key,
                model: default_anthropic_model(),
                base_url: None,
            };
        }
    }

    if let Ok(key) = std::env::var("WAITERTRAIN_OPENAI_KEY") {
        if let ProviderConfig::OpenAI { api_key, .. } = &mut config.feedback {
            *api_key = key;
        } else if replaceable {
            config.feedback = ProviderConfig::OpenAI {
                api_key: key,
                model: default_openai_model(),
                base_url: None,
                org_id: None,
            };
        }
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("waitertrain"))
}

/// Create the configured feedback provider.
pub fn create_provider(config: &TrainerConfig) -> Result<Arc<dyn FeedbackProvider>> {
    let provider: Arc<dyn FeedbackProvider> = match &config.feedback {
        ProviderConfig::OpenAI {
            api_key,
            model,
            base_url,
            org_id,
        } => {
            if api_key.is_empty() {
                anyhow::bail!("feedback.api_key is empty for the openai provider");
            }
            Arc::new(OpenAiProvider::new(
                api_key,
                base_url.clone(),
                org_id.clone(),
                config.generation_settings(model),
            )?)
        }
        ProviderConfig::Anthropic {
            api_key,
            model,
            base_url,
        } => {
            if api_key.is_empty() {
                anyhow::bail!("feedback.api_key is empty for the anthropic provider");
            }
            Arc::new(AnthropicProvider::new(
                api_key,
                base_url.clone(),
                config.generation_settings(model),
            )?)
        }
        ProviderConfig::Ollama { model, base_url } => Arc::new(OllamaProvider::new(
            base_url,
            config.generation_settings(model),
        )?),
        ProviderConfig::Canned { fail: true, .. } => Arc::new(CannedProvider::failing()),
        ProviderConfig::Canned {
            feedback,
            by_category,
            ..
        } => {
            let mut provider = CannedProvider::new(by_category.clone());
            if let Some(text) = feedback {
                provider = provider.with_default_feedback(text);
            }
            Arc::new(provider)
        }
    };
    Ok(provider)
}

/// Load the scenario catalog: an explicit override, the configured file, or
/// the built-in restaurant catalog.
pub fn load_catalog(config: &TrainerConfig, override_path: Option<&Path>) -> Result<ScenarioCatalog> {
    match override_path.or(config.training.catalog.as_deref()) {
        Some(path) => parse_catalog(path),
        None => ScenarioCatalog::builtin(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waitertrain_core::traits::FeedbackRequest;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_WAITERTRAIN_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_WAITERTRAIN_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_WAITERTRAIN_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("unterminated ${X"), "unterminated ${X");
        std::env::remove_var("_WAITERTRAIN_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = TrainerConfig::default();
        assert_eq!(config.feedback.kind(), "canned");
        assert_eq!(config.training.score_increment, 10.0);
        assert_eq!(config.training.max_score, 100.0);
        assert_eq!(config.training.feedback_timeout_secs, 30);
        assert!(config.training.catalog.is_none());
    }

    #[test]
    fn parse_openai_config() {
        let toml_str = r#"
[feedback]
type = "openai"
api_key = "sk-test"

[training]
score_increment = 5.0
max_tokens = 150
"#;
        let config: TrainerConfig = toml::from_str(toml_str).unwrap();
        match &config.feedback {
            ProviderConfig::OpenAI { model, .. } => assert_eq!(model, "gpt-4"),
            other => panic!("unexpected provider {other:?}"),
        }
        assert_eq!(config.training.score_increment, 5.0);
        assert_eq!(config.training.max_tokens, 150);
        assert_eq!(config.training.max_score, 100.0);
    }

    #[test]
    fn debug_masks_api_keys() {
        let config = ProviderConfig::Anthropic {
            api_key: "sk-secret".into(),
            model: "m".into(),
            base_url: None,
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_from_file_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waitertrain.toml");
        std::fs::write(&path, "[training]\nmax_score = 0.0\n").unwrap();
        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("max_score"));

        std::fs::write(&path, "[feedback]\ntype = \"ollama\"\nmodel = \"mistral\"\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.feedback.kind(), "ollama");
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let config = TrainerConfig {
            feedback: ProviderConfig::OpenAI {
                api_key: String::new(),
                model: "gpt-4".into(),
                base_url: None,
                org_id: None,
            },
            training: TrainingSettings::default(),
        };
        assert!(create_provider(&config).is_err());
    }

    #[tokio::test]
    async fn canned_config_builds_provider() {
        let toml_str = r#"
[feedback]
type = "canned"
feedback = "Well handled."

[feedback.by_category]
upselling = "Name the dessert."
"#;
        let config: TrainerConfig = toml::from_str(toml_str).unwrap();
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "canned");

        let upsell = FeedbackRequest::new("upselling", "x", "beginner");
        assert_eq!(provider.evaluate(&upsell).await.unwrap(), "Name the dessert.");
        let other = FeedbackRequest::new("order_taking", "x", "beginner");
        assert_eq!(provider.evaluate(&other).await.unwrap(), "Well handled.");
    }

    #[test]
    fn catalog_defaults_to_builtin() {
        let catalog = load_catalog(&TrainerConfig::default(), None).unwrap();
        assert_eq!(catalog.categories().len(), 6);
    }

    #[test]
    fn catalog_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bar.toml");
        std::fs::write(
            &path,
            "[training]\ndifficulty_levels = [\"beginner\"]\nscenario_categories = [\"cocktails\"]\n",
        )
        .unwrap();

        let mut config = TrainerConfig::default();
        config.training.catalog = Some(dir.path().join("does-not-exist.toml"));
        let catalog = load_catalog(&config, Some(&path)).unwrap();
        assert_eq!(catalog.categories(), ["cocktails".to_string()]);
    }
}
