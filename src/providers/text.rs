//! Text (chat) provider contract and its concrete HTTP-backed implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use super::ProviderError;

/// One message in a chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// A chat-completion backed text provider.
///
/// Implementors must be safe for concurrent use: the registry hands out a
/// shared `Arc<dyn TextProvider>` to every run.
#[async_trait]
pub trait TextProvider: Send + Sync {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, ProviderError>;
}

/// An OpenAI-chat-compatible HTTP client: Mistral, GLM, OpenRouter, and
/// Hugging Face's inference endpoint all speak this same request/response
/// shape, differing only in base URL and API key env var.
pub struct OpenAiCompatProvider {
    name: &'static str,
    base_url: String,
    client: reqwest::Client,
    api_key: Option<String>,
}

impl OpenAiCompatProvider {
    #[must_use]
    pub fn new(name: &'static str, base_url: impl Into<String>, api_key_env: &'static str) -> Self {
        Self {
            name,
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            api_key: std::env::var(api_key_env).ok(),
        }
    }

    /// Construct with an explicit key instead of reading the environment,
    /// for tests that point `base_url` at a local mock server.
    #[cfg(test)]
    #[must_use]
    fn with_key(name: &'static str, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            name,
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            api_key: Some(api_key.into()),
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Deserialize)]
struct ChatCompletionMessage {
    content: String,
}

#[async_trait]
impl TextProvider for OpenAiCompatProvider {
    #[instrument(skip(self, messages), fields(provider = self.name, model), err)]
    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Request(format!("{}: no API key configured", self.name)))?;

        let body = ChatCompletionRequest { model, messages, temperature, max_tokens };
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(format!("{}: {e}", self.name)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Request(format!("{}: HTTP {status}: {text}", self.name)));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("{}: {e}", self.name)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse(format!("{}: empty choices", self.name)))
    }
}

/// Anthropic's native Messages API shape: the system prompt is lifted out of
/// the message list into its own top-level field.
pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl ClaudeProvider {
    #[must_use]
    pub fn new(api_key_env: &'static str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: std::env::var(api_key_env).ok(),
        }
    }
}

const CLAUDE_DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";
const CLAUDE_API_VERSION: &str = "2023-06-01";

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContentBlock>,
}

#[derive(Deserialize)]
struct ClaudeContentBlock {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl TextProvider for ClaudeProvider {
    #[instrument(skip(self, messages), err)]
    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Request("claude: no API key configured".to_string()))?;

        let system: String = messages
            .iter()
            .filter(|m| m.role == "system")
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let conversation: Vec<&ChatMessage> = messages.iter().filter(|m| m.role != "system").collect();
        let model = if model.is_empty() { CLAUDE_DEFAULT_MODEL } else { model };

        let body = json!({
            "model": model,
            "system": system,
            "messages": conversation,
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(CLAUDE_API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", CLAUDE_API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(format!("claude: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Request(format!("claude: HTTP {status}: {text}")));
        }

        let parsed: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("claude: {e}")))?;

        Ok(parsed.content.into_iter().map(|b| b.text).collect::<Vec<_>>().join(""))
    }
}

#[cfg(test)]
mod http_tests {
    use super::*;

    #[tokio::test]
    async fn openai_compat_chat_parses_first_choice() {
        let server = httpmock::MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST).path("/chat/completions").header("authorization", "Bearer test-key");
                then.status(200).json_body(serde_json::json!({
                    "choices": [{"message": {"content": "bonjour"}}]
                }));
            })
            .await;

        let provider = OpenAiCompatProvider::with_key("mistral", format!("{}/chat/completions", server.base_url()), "test-key");
        let messages = vec![ChatMessage::user("hello")];
        let result = provider.chat(&messages, "ministral-14b-2512", 0.7, 256).await.unwrap();

        assert_eq!(result, "bonjour");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn openai_compat_chat_surfaces_non_2xx_as_request_error() {
        let server = httpmock::MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST).path("/chat/completions");
                then.status(429).body("rate limited");
            })
            .await;

        let provider = OpenAiCompatProvider::with_key("mistral", format!("{}/chat/completions", server.base_url()), "test-key");
        let messages = vec![ChatMessage::user("hello")];
        let err = provider.chat(&messages, "m", 0.7, 256).await.unwrap_err();
        assert!(matches!(err, ProviderError::Request(_)));
    }
}
