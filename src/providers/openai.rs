// OpenAI-compatible chat completion client
//
// Works against any endpoint that speaks the `/chat/completions` format
// (OpenAI, SiliconFlow, DeepSeek, Groq, local vLLM servers, ...). The base URL
// is expected to include the API version segment, e.g. `https://api.openai.com/v1`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::CompletionError;
use super::types::{ChatMessage, CompletionRequest};
use super::CompletionService;
use crate::config::ApiSettings;

/// OpenAI-compatible chat completion client
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    client: Client,
    api_key: String,
    base_url: String,
    provider_name: String,
}

impl OpenAiCompatibleClient {
    /// Create a client with an explicit request timeout
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            provider_name: "openai-compatible".to_string(),
        })
    }

    /// Create a client from the `[api]` config section
    pub fn from_settings(api: &ApiSettings) -> Result<Self, CompletionError> {
        Self::new(
            api.api_key.clone(),
            api.base_url.clone(),
            Duration::from_secs(api.request_timeout_secs),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn to_api_request<'a>(&self, request: &'a CompletionRequest) -> ApiRequest<'a> {
        ApiRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiCompatibleClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = self.to_api_request(request);

        tracing::debug!(
            "Sending {} messages to {} (model={}, temperature={})",
            request.messages.len(),
            self.endpoint(),
            request.model,
            request.temperature
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ApiResponse =
            serde_json::from_str(&text).map_err(|e| CompletionError::Decode(e.to_string()))?;

        tracing::debug!("Received response {:?} from model {:?}", parsed.id, parsed.model);

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }

    fn name(&self) -> &str {
        &self.provider_name
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::Transcript;

    fn client_for(server: &mockito::ServerGuard) -> OpenAiCompatibleClient {
        OpenAiCompatibleClient::new(
            "test-key",
            format!("{}/v1/", server.url()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn sample_request() -> CompletionRequest {
        let mut transcript = Transcript::new("system prompt");
        transcript.push_user("hello");
        CompletionRequest::new("test-model", &transcript, 0.7)
    }

    #[test]
    fn test_client_creation() {
        let client =
            OpenAiCompatibleClient::new("key", "https://api.openai.com/v1", Duration::from_secs(1));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().name(), "openai-compatible");
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client =
            OpenAiCompatibleClient::new("key", "https://example.com/v1/", Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.endpoint(), "https://example.com/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "test-model",
                "messages": [
                    {"role": "system", "content": "system prompt"},
                    {"role": "user", "content": "hello"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":"cmpl-1","model":"test-model","choices":[{"index":0,"message":{"role":"assistant","content":"[新的立场强度 L: 7]\n好的"},"finish_reason":"stop"}]}"#,
            )
            .create_async()
            .await;

        let text = client_for(&server).complete(&sample_request()).await.unwrap();
        assert_eq!(text, "[新的立场强度 L: 7]\n好的");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_maps_http_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = client_for(&server)
            .complete(&sample_request())
            .await
            .unwrap_err();
        match err {
            CompletionError::Status { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_rejects_empty_choices() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"id":"x","choices":[]}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .complete(&sample_request())
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_complete_reports_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client_for(&server)
            .complete(&sample_request())
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Decode(_)));
    }

    #[test]
    fn test_wire_request_omits_unset_max_tokens() {
        let client =
            OpenAiCompatibleClient::new("key", "https://example.com/v1", Duration::from_secs(1))
                .unwrap();
        let request = sample_request().with_max_tokens(None);

        let json = serde_json::to_value(client.to_api_request(&request)).unwrap();
        assert_eq!(json["model"], "test-model");
        assert_eq!(json["messages"][1]["role"], "user");
        assert!(json.get("max_tokens").is_none());
    }
}
