// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible chat-completions endpoints.
//!
//! Both the reply model and the overview model speak this dialect behind
//! different base URLs, so one client type covers both. Handles request
//! construction, bearer authentication, and transient error retry.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use banter_core::BanterError;

use crate::types::{
    ApiErrorResponse, CompletionRequest, CompletionResponse, RequestMessage, ResponseFormat,
};

/// Client for one chat-completions endpoint.
///
/// Retries once after a 1-second delay on transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    reasoning_effort: Option<String>,
    max_retries: u32,
}

impl ChatClient {
    /// Creates a client for the endpoint at `base_url` (excluding the
    /// `/chat/completions` suffix), authenticating with `api_key`.
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self, BanterError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
            BanterError::Config(format!("invalid API key header value: {e}"))
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| BanterError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            reasoning_effort: None,
            max_retries: 1,
        })
    }

    /// Sets the `reasoning_effort` request parameter sent with every call.
    pub fn with_reasoning_effort(mut self, effort: Option<String>) -> Self {
        self.reasoning_effort = effort;
        self
    }

    /// Returns the model identifier this client requests.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` as a single user message and returns the first
    /// choice's content. `json_object` constrains the response format.
    ///
    /// An empty choice list or empty content is a provider error: the
    /// caller always needs text to work with.
    pub async fn complete(&self, prompt: &str, json_object: bool) -> Result<String, BanterError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![RequestMessage::user(prompt)],
            reasoning_effort: self.reasoning_effort.clone(),
            response_format: json_object.then(ResponseFormat::json_object),
        };
        let url = format!("{}/chat/completions", self.base_url);

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| BanterError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, model = %self.model, "completion response received");

            if status.is_success() {
                let body: CompletionResponse =
                    response.json().await.map_err(|e| BanterError::Provider {
                        message: format!("failed to decode completion response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                let content = body
                    .choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message.content)
                    .unwrap_or_default();
                if content.is_empty() {
                    return Err(BanterError::Provider {
                        message: "model returned an empty response".into(),
                        source: None,
                    });
                }
                return Ok(content);
            }

            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!("API returned {status}: {}", api_err.error.message),
                Err(_) => format!("API returned {status}: {body}"),
            };

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, "transient error, will retry");
                last_error = Some(BanterError::Provider {
                    message,
                    source: None,
                });
                continue;
            }

            return Err(BanterError::Provider {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| BanterError::Provider {
            message: "retries exhausted".into(),
            source: None,
        }))
    }
}

fn is_transient_error(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::SERVICE_UNAVAILABLE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "id": "cmpl-1",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": content}}
            ],
        })
    }

    #[tokio::test]
    async fn complete_returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "grok-3-mini-beta",
                "reasoning_effort": "low",
                "response_format": {"type": "json_object"},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("hello!")))
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri(), "test-key", "grok-3-mini-beta")
            .unwrap()
            .with_reasoning_effort(Some("low".into()));
        let content = client.complete("hi", true).await.unwrap();
        assert_eq!(content, "hello!");
    }

    #[tokio::test]
    async fn plain_requests_omit_the_response_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(|req: &wiremock::Request| {
                let body: serde_json::Value = req.body_json().unwrap_or_default();
                body.get("response_format").is_none() && body.get("reasoning_effort").is_none()
            })
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri(), "test-key", "gemini-2.5-pro").unwrap();
        client.complete("hi", false).await.unwrap();
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/openai/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .mount(&server)
            .await;

        let url = format!("{}/v1beta/openai/", server.uri());
        let client = ChatClient::new(&url, "test-key", "gemini-2.5-pro").unwrap();
        assert_eq!(client.complete("hi", false).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn transient_error_is_retried_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("recovered")))
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri(), "test-key", "grok-3-mini-beta").unwrap();
        let content = client.complete("hi", false).await.unwrap();
        assert_eq!(content, "recovered");
    }

    #[tokio::test]
    async fn non_transient_error_fails_immediately() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "bad key", "type": "invalid_request_error"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri(), "wrong-key", "grok-3-mini-beta").unwrap();
        let err = client.complete("hi", false).await.unwrap_err();
        assert!(err.to_string().contains("bad key"));
    }

    #[tokio::test]
    async fn empty_choices_are_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri(), "test-key", "grok-3-mini-beta").unwrap();
        let err = client.complete("hi", false).await.unwrap_err();
        assert!(err.to_string().contains("empty response"));
    }
}
