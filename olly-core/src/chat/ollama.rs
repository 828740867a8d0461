//! Ollama `/api/generate` client.

use super::{ChatService, ServiceError};
use async_trait::async_trait;
use olly_common::OllamaConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Talks to a local Ollama instance.
pub struct OllamaChatService {
    base_url: String,
    model: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<i64>,
}

impl OllamaChatService {
    pub fn new(base_url: &str, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            client: Client::builder()
                .timeout(timeout)
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    pub fn from_config(config: &OllamaConfig) -> Self {
        Self::new(
            &config.base_url,
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatService for OllamaChatService {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, context: &str) -> Result<String, ServiceError> {
        let start = Instant::now();
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt: context,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| {
                ServiceError::Transport(format!("{e}. Is Ollama running at {}?", self.base_url))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            model = %self.model,
            eval_count = result.eval_count.unwrap_or(0),
            latency_ms = start.elapsed().as_millis() as u64,
            "Ollama generate complete"
        );

        Ok(result.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(url: &str) -> OllamaChatService {
        OllamaChatService::new(url, "llama3", Duration::from_secs(5))
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(service("http://myserver:11434/").base_url(), "http://myserver:11434");
    }

    #[test]
    fn from_config_uses_defaults() {
        let svc = OllamaChatService::from_config(&OllamaConfig::default());
        assert_eq!(svc.base_url(), "http://localhost:11434");
        assert_eq!(svc.model(), "llama3");
        assert_eq!(svc.name(), "ollama");
    }

    #[tokio::test]
    async fn generate_posts_prompt_and_reads_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_json(serde_json::json!({
                "model": "llama3",
                "prompt": "SYS\nhello",
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3",
                "response": "hi there",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = service(&server.uri()).generate("SYS\nhello").await.unwrap();
        assert_eq!(reply, "hi there");
    }

    #[tokio::test]
    async fn non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let err = service(&server.uri()).generate("x").await.unwrap_err();
        match err {
            ServiceError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "model not loaded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_response_field_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"done": true})))
            .mount(&server)
            .await;

        let err = service(&server.uri()).generate("x").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        let err = service("http://127.0.0.1:1").generate("x").await.unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)));
    }
}
