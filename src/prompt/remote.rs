//! Remote prompt endpoint client.
//!
//! Interview scripts live in a conversation-configuration service, keyed by
//! room name. The fetch suspends cooperatively and retries transient
//! failures with exponential backoff; a missing field or client error is
//! surfaced as a typed [`PromptError`] without substituting a default.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::Client;
use tracing::warn;

use crate::errors::PromptError;
use crate::prompt::script::InterviewScript;

/// Backoff for prompt fetches: 500ms → 1s → 2s … capped at 5s, with jitter.
fn prompt_backoff(max_times: usize) -> ExponentialBuilder {
    ExponentialBuilder::new()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(5))
        .with_factor(2.0)
        .with_jitter()
        .with_max_times(max_times)
}

/// Client for the remote conversation-configuration endpoint.
pub struct RemotePromptClient {
    base_url: String,
    client: Client,
    retry_attempts: usize,
}

impl RemotePromptClient {
    /// Create a client for `{base_url}/api/product-conversations/{room}`.
    ///
    /// A trailing slash on `base_url` is tolerated.
    pub fn new(base_url: impl Into<String>, timeout: Duration, retry_attempts: usize) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            base_url,
            client,
            retry_attempts,
        }
    }

    /// Fetch the interview script for a room.
    ///
    /// Transport errors and 5xx responses are retried with backoff; anything
    /// else fails immediately.
    pub async fn fetch(&self, room_name: &str) -> Result<InterviewScript, PromptError> {
        let url = self.script_url(room_name);
        (|| async { self.fetch_once(&url).await })
            .retry(prompt_backoff(self.retry_attempts))
            .when(PromptError::is_transient)
            .notify(|err: &PromptError, dur: Duration| {
                warn!("Prompt fetch failed ({}), retrying in {:?}", err, dur);
            })
            .await
    }

    fn script_url(&self, room_name: &str) -> String {
        format!("{}/api/product-conversations/{}", self.base_url, room_name)
    }

    async fn fetch_once(&self, url: &str) -> Result<InterviewScript, PromptError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PromptError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PromptError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PromptError::JsonParse(e.to_string()))?;

        let data = body.get("data").ok_or(PromptError::MissingField {
            path: "data".to_string(),
        })?;

        let system_prompt = data
            .get("systemPrompt")
            .and_then(|v| v.as_str())
            .ok_or(PromptError::MissingField {
                path: "data.systemPrompt".to_string(),
            })?
            .to_string();

        // Questions are optional on the wire; older records omit them.
        let questions = data
            .get("questions")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|q| q.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        Ok(InterviewScript {
            system_prompt,
            questions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base: &str) -> RemotePromptClient {
        // Zero retries keeps failure tests fast.
        RemotePromptClient::new(base, Duration::from_secs(2), 0)
    }

    #[test]
    fn test_script_url_tolerates_trailing_slash() {
        let client = test_client("https://api.example.com/");
        assert_eq!(
            client.script_url("room-42"),
            "https://api.example.com/api/product-conversations/room-42"
        );
    }

    #[tokio::test]
    async fn test_fetch_returns_system_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/product-conversations/room-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"systemPrompt": "You are a tester."}
            })))
            .mount(&server)
            .await;

        let script = test_client(&server.uri()).fetch("room-42").await.unwrap();
        assert_eq!(script.system_prompt, "You are a tester.");
        assert!(script.questions.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_parses_questions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/product-conversations/room-7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"systemPrompt": "Interview.", "questions": ["A?", "B?"]}
            })))
            .mount(&server)
            .await;

        let script = test_client(&server.uri()).fetch("room-7").await.unwrap();
        assert_eq!(script.questions, vec!["A?".to_string(), "B?".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_500_is_bad_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).fetch("room-42").await.unwrap_err();
        assert!(matches!(err, PromptError::BadStatus { status: 500 }));
    }

    #[tokio::test]
    async fn test_fetch_missing_field_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"somethingElse": 1}
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).fetch("room-42").await.unwrap_err();
        match err {
            PromptError::MissingField { path } => assert_eq!(path, "data.systemPrompt"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_retries_transient_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"systemPrompt": "Recovered."}
            })))
            .mount(&server)
            .await;

        let client = RemotePromptClient::new(server.uri(), Duration::from_secs(2), 2);
        let script = client.fetch("room-42").await.unwrap();
        assert_eq!(script.system_prompt, "Recovered.");
    }

    #[tokio::test]
    async fn test_fetch_does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = RemotePromptClient::new(server.uri(), Duration::from_secs(2), 3);
        let err = client.fetch("room-42").await.unwrap_err();
        assert!(matches!(err, PromptError::BadStatus { status: 404 }));
    }
}
