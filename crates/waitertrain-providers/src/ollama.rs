//! Ollama (local LLM) feedback provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use waitertrain_core::error::ProviderError;
use waitertrain_core::traits::{
    build_feedback_prompt, FeedbackProvider, FeedbackRequest, DEFAULT_SYSTEM_PROMPT,
};

use crate::{non_empty, parse_error, GenerationSettings};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECS: u64 = 120; // local models are slower

/// Ollama local LLM provider.
pub struct OllamaProvider {
    base_url: String,
    settings: GenerationSettings,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(base_url: &str, settings: GenerationSettings) -> anyhow::Result<Self> {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            base_url: base.trim_end_matches('/').to_string(),
            settings,
            client,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl FeedbackProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, request), fields(model = %self.settings.model, category = %request.category))]
    async fn evaluate(&self, request: &FeedbackRequest) -> anyhow::Result<String> {
        let body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: DEFAULT_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_feedback_prompt(request),
                },
            ],
            stream: false,
            options: ChatOptions {
                temperature: self.settings.temperature,
                num_predict: self.settings.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else if e.is_connect() {
                    ProviderError::NetworkError(format!(
                        "Ollama not reachable at {}. Is it running? Start with: ollama serve",
                        self.base_url
                    ))
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(ProviderError::ApiError {
                status,
                message: format!(
                    "model '{}' not found locally. Pull it with: ollama pull {}",
                    self.settings.model, self.settings.model
                ),
            }
            .into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let api_response: ChatResponse = response.json().await.map_err(parse_error)?;
        let feedback = non_empty(Some(api_response.message.content))?;

        debug!(chars = feedback.len(), "received feedback");
        Ok(feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> FeedbackRequest {
        FeedbackRequest::new("menu_knowledge", "The salmon is grilled with lemon.", "intermediate")
    }

    #[tokio::test]
    async fn successful_feedback() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3",
                "stream": false,
                "options": {"num_predict": 200}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": {"role": "assistant", "content": "Clear and accurate. Mention allergens."},
                "model": "llama3",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&server.uri(), GenerationSettings::new("llama3")).unwrap();
        let feedback = provider.evaluate(&request()).await.unwrap();
        assert_eq!(feedback, "Clear and accurate. Mention allergens.");
    }

    #[tokio::test]
    async fn missing_model_suggests_pull() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&server.uri(), GenerationSettings::new("mistral")).unwrap();
        let err = provider.evaluate(&request()).await.unwrap_err();
        assert!(err.to_string().contains("ollama pull mistral"));
    }

    #[test]
    fn empty_base_url_uses_default() {
        let provider = OllamaProvider::new("", GenerationSettings::new("llama3")).unwrap();
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }
}
