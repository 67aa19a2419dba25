//! Image generation provider contract and the Flux/BlackForestLabs client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{instrument, warn};

use super::ProviderError;

/// Maximum number of poll attempts before a submitted image job times out.
pub const MAX_POLL_ATTEMPTS: usize = 60;
/// Interval between poll attempts.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The result of a successful image generation call.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub image_base64: String,
    pub content_type: String,
    pub prompt_used: String,
}

/// An asynchronous image-generation provider: submit, then poll until the
/// remote job reaches a terminal status.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        aspect_ratio: &str,
        output_format: &str,
        width: Option<u64>,
        height: Option<u64>,
    ) -> Result<GeneratedImage, ProviderError>;
}

/// Flux (Black Forest Labs) image generation via an async submit/poll workflow API.
pub struct BlackForestLabsProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    submit_url: String,
    poll_url: String,
    poll_interval: Duration,
}

impl BlackForestLabsProvider {
    #[must_use]
    pub fn new(api_key_env: &'static str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: std::env::var(api_key_env).ok(),
            submit_url: DEFAULT_SUBMIT_URL.to_string(),
            poll_url: DEFAULT_POLL_URL.to_string(),
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Construct against a local mock server with an explicit key and a
    /// near-zero poll interval, for tests.
    #[cfg(test)]
    #[must_use]
    fn with_urls(api_key: &str, submit_url: impl Into<String>, poll_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: Some(api_key.to_string()),
            submit_url: submit_url.into(),
            poll_url: poll_url.into(),
            poll_interval: Duration::from_millis(1),
        }
    }
}

const DEFAULT_SUBMIT_URL: &str = "https://api.bfl.ml/v1/flux-pro-1.1";
const DEFAULT_POLL_URL: &str = "https://api.bfl.ml/v1/get_result";

#[derive(Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Deserialize)]
struct PollResponse {
    status: String,
    #[serde(default)]
    result: Option<PollResult>,
}

#[derive(Deserialize)]
struct PollResult {
    sample: String,
}

fn is_terminal_failure(status: &str) -> bool {
    matches!(status, "Error" | "Content Moderated" | "Request Moderated")
}

#[async_trait]
impl ImageProvider for BlackForestLabsProvider {
    #[instrument(skip(self, prompt), fields(aspect_ratio), err)]
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        aspect_ratio: &str,
        output_format: &str,
        width: Option<u64>,
        height: Option<u64>,
    ) -> Result<GeneratedImage, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Request("blackforestlabs: no API key configured".to_string()))?;

        let mut body = serde_json::json!({
            "prompt": prompt,
            "aspect_ratio": aspect_ratio,
            "output_format": output_format,
        });
        if !model.is_empty() {
            body["model"] = serde_json::json!(model);
        }
        if let (Some(w), Some(h)) = (width, height) {
            body["width"] = serde_json::json!(w);
            body["height"] = serde_json::json!(h);
        }

        let submitted: SubmitResponse = self
            .client
            .post(&self.submit_url)
            .header("x-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(format!("blackforestlabs: {e}")))?
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("blackforestlabs: {e}")))?;

        for attempt in 0..MAX_POLL_ATTEMPTS {
            tokio::time::sleep(self.poll_interval).await;

            let poll: PollResponse = self
                .client
                .get(&self.poll_url)
                .header("x-key", api_key)
                .query(&[("id", submitted.id.as_str())])
                .send()
                .await
                .map_err(|e| ProviderError::Request(format!("blackforestlabs: {e}")))?
                .json()
                .await
                .map_err(|e| ProviderError::MalformedResponse(format!("blackforestlabs: {e}")))?;

            if poll.status == "Ready" {
                let sample_url = poll
                    .result
                    .ok_or_else(|| ProviderError::MalformedResponse("blackforestlabs: ready with no result".to_string()))?
                    .sample;
                let bytes = self
                    .client
                    .get(&sample_url)
                    .send()
                    .await
                    .map_err(|e| ProviderError::Request(format!("blackforestlabs: download: {e}")))?
                    .bytes()
                    .await
                    .map_err(|e| ProviderError::Request(format!("blackforestlabs: download: {e}")))?;
                use base64::Engine;
                return Ok(GeneratedImage {
                    image_base64: base64::engine::general_purpose::STANDARD.encode(bytes),
                    content_type: format!("image/{output_format}"),
                    prompt_used: prompt.to_string(),
                });
            }

            if is_terminal_failure(&poll.status) {
                warn!(status = %poll.status, "image generation failed");
                return Err(ProviderError::Moderated(poll.status));
            }

            tracing::debug!(attempt, status = %poll.status, "polling image generation");
        }

        Err(ProviderError::Timeout(MAX_POLL_ATTEMPTS))
    }
}
