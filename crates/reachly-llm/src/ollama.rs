use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use reachly_core::errors::GenerationError;
use reachly_core::provider::{GenerationClient, GenerationRequest};
use reachly_settings::OllamaSettings;

use crate::truncate::{estimate_tokens, truncate_to_budget};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for a local Ollama endpoint.
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub health_timeout: Duration,
    /// Budget applied to the user instruction before sending.
    pub max_prompt_chars: usize,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::from(&OllamaSettings::default())
    }
}

impl From<&OllamaSettings> for OllamaConfig {
    fn from(s: &OllamaSettings) -> Self {
        Self {
            base_url: s.base_url.trim_end_matches('/').to_string(),
            model: s.model.clone(),
            timeout: Duration::from_secs(s.timeout_secs),
            health_timeout: Duration::from_secs(s.health_timeout_secs),
            max_prompt_chars: s.max_prompt_chars,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    options: ChatOptions,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

/// Single-shot, non-streaming chat client for Ollama.
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| GenerationError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn map_send_error(&self, err: reqwest::Error, timeout: Duration) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(timeout)
        } else if err.is_connect() {
            GenerationError::Unavailable(format!("cannot reach {}: {err}", self.config.base_url))
        } else {
            GenerationError::Network(err.to_string())
        }
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GenerationError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(GenerationError::from_status(status, body))
    }
}

#[async_trait]
impl GenerationClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip(self), fields(model = %self.config.model))]
    async fn health(&self) -> Result<(), GenerationError> {
        let resp = self
            .client
            .get(self.url("/api/tags"))
            .timeout(self.config.health_timeout)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, self.config.health_timeout))?;
        let resp = Self::check_status(resp).await?;

        let tags: TagsResponse = resp
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(format!("unreadable model list: {e}")))?;

        if tags.models.iter().any(|m| m.name == self.config.model) {
            debug!(available = tags.models.len(), "model present");
            Ok(())
        } else {
            warn!(available = tags.models.len(), "configured model not installed");
            Err(GenerationError::ModelNotFound {
                model: self.config.model.clone(),
            })
        }
    }

    #[instrument(skip(self, request), fields(model = %self.config.model, temperature = request.temperature))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let user = truncate_to_budget(request.user.trim(), self.config.max_prompt_chars);
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system.trim(),
                },
                ChatMessage {
                    role: "user",
                    content: user.trim(),
                },
            ],
            options: ChatOptions {
                temperature: request.temperature,
            },
            stream: false,
        };

        debug!(
            prompt_tokens = estimate_tokens(&request.system) + estimate_tokens(&user),
            truncated = user.as_str() != request.user.trim(),
            "sending chat request"
        );
        let started = Instant::now();
        let resp = self
            .client
            .post(self.url("/api/chat"))
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, self.config.timeout))?;
        let resp = Self::check_status(resp).await?;

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(format!("response is not valid JSON: {e}")))?;

        let content = parsed
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| GenerationError::InvalidResponse("missing message.content".into()))?;

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = content.len(),
            "generation complete"
        );
        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> OllamaClient {
        OllamaClient::new(OllamaConfig {
            base_url: server.uri(),
            model: "llama3:latest".into(),
            timeout: Duration::from_secs(5),
            health_timeout: Duration::from_secs(5),
            max_prompt_chars: 8000,
        })
        .unwrap()
    }

    #[test]
    fn config_from_settings_strips_trailing_slash() {
        let settings = OllamaSettings {
            base_url: "http://gpu:11434/".into(),
            ..Default::default()
        };
        let config = OllamaConfig::from(&settings);
        assert_eq!(config.base_url, "http://gpu:11434");
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[tokio::test]
    async fn generate_sends_chat_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({
                "model": "llama3:latest",
                "stream": false,
                "options": {"temperature": 0.4},
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "say hi"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3:latest",
                "message": {"role": "assistant", "content": "  hi there \n"},
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let out = client
            .generate(&GenerationRequest::new(" be brief ", "say hi\n", 0.4))
            .await
            .unwrap();
        assert_eq!(out, "hi there");
    }

    #[tokio::test]
    async fn long_user_prompt_truncated_with_marker() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"content": "ok"}
            })))
            .mount(&server)
            .await;

        let mut config = client_for(&server).config().clone();
        config.max_prompt_chars = 300;
        let client = OllamaClient::new(config).unwrap();
        client
            .generate(&GenerationRequest::new("sys", "word ".repeat(500), 0.2))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let user = sent["messages"][1]["content"].as_str().unwrap();
        assert!(user.ends_with("[TRUNCATED]"));
        assert!(user.len() < 320);
    }

    #[tokio::test]
    async fn missing_content_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&GenerationRequest::new("s", "u", 0.7))
            .await
            .unwrap_err();
        assert!(err.is_validation_failure(), "{err:?}");
    }

    #[tokio::test]
    async fn server_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&GenerationRequest::new("s", "u", 0.7))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::ServerError { status: 500, .. }));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": {"content": "late"}}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mut config = client_for(&server).config().clone();
        config.timeout = Duration::from_millis(200);
        let err = OllamaClient::new(config)
            .unwrap()
            .generate(&GenerationRequest::new("s", "u", 0.7))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Timeout(_)), "{err:?}");
    }

    #[tokio::test]
    async fn health_ok_when_model_listed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "mistral:7b"}, {"name": "llama3:latest"}]
            })))
            .mount(&server)
            .await;

        assert!(client_for(&server).health().await.is_ok());
    }

    #[tokio::test]
    async fn health_reports_missing_model() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "mistral:7b"}]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).health().await.unwrap_err();
        assert!(matches!(err, GenerationError::ModelNotFound { ref model } if model == "llama3:latest"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_unavailable() {
        let client = OllamaClient::new(OllamaConfig {
            base_url: "http://127.0.0.1:1".into(),
            ..Default::default()
        })
        .unwrap();
        let err = client.health().await.unwrap_err();
        assert!(
            matches!(err, GenerationError::Unavailable(_) | GenerationError::Network(_)),
            "{err:?}"
        );
    }
}
