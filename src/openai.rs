//! OpenAI API integration
//!
//! Two endpoints are used: `GET /models` to check that an API key is
//! accepted, and `POST /chat/completions` to generate the commit message.
//! Requests are sent once; failures are returned to the caller as is.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::Model;
use crate::prompt::{ChatMessage, build_messages};

/// Default API base URL
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Environment variable overriding [`OPENAI_API_BASE`]
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Error code returned when the prompt does not fit in the model's context
const CONTEXT_LENGTH_EXCEEDED: &str = "context_length_exceeded";

/// Everything needed for one completion attempt
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub diff: String,
    pub model: Model,
    pub temperature: f32,
    pub api_key: String,
}

impl GenerationRequest {
    pub fn new(config: &Config, diff: &str) -> Self {
        Self {
            diff: diff.to_string(),
            model: config.model,
            temperature: config.temperature,
            api_key: config.api_key.clone(),
        }
    }

    /// Same request against another model
    pub fn with_model(&self, model: Model) -> Self {
        Self {
            model,
            ..self.clone()
        }
    }
}

/// Result of one completion attempt
#[derive(Debug)]
pub enum GenerationOutcome {
    Success(String),
    /// The only failure eligible for a retry with a larger model
    ContextLengthExceeded,
    OtherError(Error),
}

/// The language model backend used by autocommit
#[async_trait]
pub trait CommitMessageBackend: Send + Sync {
    /// Check that `api_key` is accepted by the backend
    async fn verify_api_key(&self, api_key: &str) -> Result<()>;

    /// Generate a commit message for `request.diff`
    async fn complete(&self, request: &GenerationRequest) -> GenerationOutcome;
}

/// `{"error": {...}}` body returned by the API on failure
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// HTTP client for the OpenAI API
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
}

impl OpenAiClient {
    pub fn new() -> Self {
        Self::with_base_url(OPENAI_API_BASE)
    }

    /// Client for an OpenAI compatible API at `base_url`
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client for `$OPENAI_BASE_URL`, falling back to the public API
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.is_empty() => Self::with_base_url(url),
            _ => Self::new(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn send_completion(&self, request: &GenerationRequest) -> Result<Response> {
        let body = ChatCompletionRequest {
            model: request.model.as_str(),
            temperature: request.temperature,
            messages: build_messages(&request.diff),
        };

        tracing::debug!(
            model = %request.model,
            temperature = request.temperature,
            diff_bytes = request.diff.len(),
            "sending completion request"
        );

        let response = self
            .http
            .post(self.url("chat/completions"))
            .bearer_auth(&request.api_key)
            .json(&body)
            .send()
            .await?;
        Ok(response)
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Read an error body; `None` if it is not the documented error shape
async fn read_error(response: Response) -> Result<std::result::Result<ErrorDetail, String>> {
    let body = response.text().await?;
    Ok(serde_json::from_str::<ErrorResponse>(&body)
        .map(|parsed| parsed.error)
        .map_err(|_| body))
}

#[async_trait]
impl CommitMessageBackend for OpenAiClient {
    async fn verify_api_key(&self, api_key: &str) -> Result<()> {
        let response = self
            .http
            .get(self.url("models"))
            .bearer_auth(api_key)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() < 400 {
            return Ok(());
        }

        match read_error(response).await? {
            Ok(detail) => Err(Error::RemoteAuth(detail.message)),
            Err(body) => Err(Error::UnexpectedResponse {
                status: status.as_u16(),
                body,
            }),
        }
    }

    async fn complete(&self, request: &GenerationRequest) -> GenerationOutcome {
        let response = match self.send_completion(request).await {
            Ok(response) => response,
            Err(err) => return GenerationOutcome::OtherError(err),
        };

        let status = response.status();
        if !status.is_success() {
            return match read_error(response).await {
                Ok(Ok(detail)) if detail.code.as_deref() == Some(CONTEXT_LENGTH_EXCEEDED) => {
                    tracing::debug!(model = %request.model, "context length exceeded");
                    GenerationOutcome::ContextLengthExceeded
                }
                Ok(Ok(detail)) => GenerationOutcome::OtherError(Error::Generation(detail.message)),
                Ok(Err(body)) => GenerationOutcome::OtherError(Error::UnexpectedResponse {
                    status: status.as_u16(),
                    body,
                }),
                Err(err) => GenerationOutcome::OtherError(err),
            };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return GenerationOutcome::OtherError(Error::Transport(err)),
        };
        let parsed: ChatCompletionResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::debug!(error = %err, "completion body is not a chat completion");
                return GenerationOutcome::OtherError(Error::UnexpectedResponse {
                    status: status.as_u16(),
                    body,
                });
            }
        };

        match parsed.choices.into_iter().next() {
            Some(choice) => GenerationOutcome::Success(choice.message.content.trim().to_string()),
            None => GenerationOutcome::OtherError(Error::Generation(
                "the API returned no choices".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(model: Model) -> GenerationRequest {
        GenerationRequest {
            diff: "+foo".to_string(),
            model,
            temperature: 0.3,
            api_key: "sk-x".to_string(),
        }
    }

    #[tokio::test]
    async fn test_verify_api_key_success() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .and(bearer_token("sk-x"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;
        let client = OpenAiClient::with_base_url(server.uri());

        // Act
        let result = client.verify_api_key("sk-x").await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_verify_api_key_surfaces_api_message_verbatim() {
        // Arrange - minimal error body
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "m"}
            })))
            .mount(&server)
            .await;
        let client = OpenAiClient::with_base_url(server.uri());

        // Act
        let err = client.verify_api_key("sk-bad").await.unwrap_err();

        // Assert
        assert!(matches!(&err, Error::RemoteAuth(message) if message == "m"));
        assert_eq!(err.to_string(), "m");
    }

    #[tokio::test]
    async fn test_verify_api_key_full_error_body() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "code": "invalid_api_key",
                    "message": "Incorrect API key provided: sk-bad.",
                    "param": null,
                    "type": "invalid_request_error"
                }
            })))
            .mount(&server)
            .await;
        let client = OpenAiClient::with_base_url(server.uri());

        // Act
        let err = client.verify_api_key("sk-bad").await.unwrap_err();

        // Assert
        assert_eq!(err.to_string(), "Incorrect API key provided: sk-bad.");
    }

    #[tokio::test]
    async fn test_verify_api_key_unparseable_body() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;
        let client = OpenAiClient::with_base_url(server.uri());

        // Act
        let err = client.verify_api_key("sk-x").await.unwrap_err();

        // Assert
        assert!(matches!(
            err,
            Error::UnexpectedResponse { status: 502, ref body } if body == "bad gateway"
        ));
    }

    #[tokio::test]
    async fn test_verify_api_key_transport_error() {
        // Arrange - nothing listens on the discard port
        let client = OpenAiClient::with_base_url("http://127.0.0.1:9");

        // Act
        let err = client.verify_api_key("sk-x").await.unwrap_err();

        // Assert - the cause is kept as the source, not repeated in the message
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(err.to_string(), "request to the OpenAI API failed");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_complete_success() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(bearer_token("sk-x"))
            .and(body_partial_json(json!({"model": "gpt-3.5-turbo-16k"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "fix: add foo\n"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let client = OpenAiClient::with_base_url(server.uri());

        // Act
        let outcome = client.complete(&request(Model::Gpt35Turbo16k)).await;

        // Assert - trailing whitespace is trimmed
        match outcome {
            GenerationOutcome::Success(message) => assert_eq!(message, "fix: add foo"),
            other => panic!("expected Success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_context_length_exceeded() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": "context_length_exceeded",
                    "message": "This model's maximum context length is 4097 tokens.",
                    "param": "messages",
                    "type": "invalid_request_error"
                }
            })))
            .mount(&server)
            .await;
        let client = OpenAiClient::with_base_url(server.uri());

        // Act
        let outcome = client.complete(&request(Model::Gpt35Turbo)).await;

        // Assert
        assert!(matches!(outcome, GenerationOutcome::ContextLengthExceeded));
    }

    #[tokio::test]
    async fn test_complete_other_api_error() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {
                    "code": "rate_limit_exceeded",
                    "message": "Rate limit reached",
                    "type": "requests"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
        let client = OpenAiClient::with_base_url(server.uri());

        // Act
        let outcome = client.complete(&request(Model::Gpt4)).await;

        // Assert - surfaced once, never retried
        match outcome {
            GenerationOutcome::OtherError(Error::Generation(message)) => {
                assert_eq!(message, "Rate limit reached")
            }
            other => panic!("expected Generation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_no_choices() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;
        let client = OpenAiClient::with_base_url(server.uri());

        // Act
        let outcome = client.complete(&request(Model::Gpt4)).await;

        // Assert
        assert!(matches!(
            outcome,
            GenerationOutcome::OtherError(Error::Generation(_))
        ));
    }

    #[tokio::test]
    async fn test_complete_success_status_with_unreadable_body() {
        // Arrange - a proxy answering 200 with an HTML page
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;
        let client = OpenAiClient::with_base_url(server.uri());

        // Act
        let outcome = client.complete(&request(Model::Gpt4)).await;

        // Assert
        match outcome {
            GenerationOutcome::OtherError(Error::UnexpectedResponse { status, body }) => {
                assert_eq!(status, 200);
                assert_eq!(body, "<html>maintenance</html>");
            }
            other => panic!("expected UnexpectedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_request_with_model_keeps_other_fields() {
        // Arrange
        let original = request(Model::Gpt35Turbo);

        // Act
        let escalated = original.with_model(Model::Gpt35Turbo16k);

        // Assert
        assert_eq!(escalated.model, Model::Gpt35Turbo16k);
        assert_eq!(escalated.diff, original.diff);
        assert_eq!(escalated.api_key, original.api_key);
        assert_eq!(original.model, Model::Gpt35Turbo);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OpenAiClient::with_base_url("http://localhost:8080/v1/");
        assert_eq!(client.url("models"), "http://localhost:8080/v1/models");
    }
}
