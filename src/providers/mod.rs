//! Text and image provider contracts and the registries that look them up by id.
//!
//! Executors never talk to a provider SDK directly; they go through the
//! narrow [`TextProvider`]/[`ImageProvider`] traits here, which is the only
//! thing the engine depends on from the remote-service world.

pub mod image;
pub mod text;

use std::sync::Arc;

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;

pub use image::{GeneratedImage, ImageProvider};
pub use text::{ChatMessage, TextProvider};

/// Errors a provider call can surface to an executor.
#[derive(Debug, Error, Diagnostic)]
pub enum ProviderError {
    /// `provider_id` has no registered client in the requested registry.
    #[error("unknown provider: {0}")]
    #[diagnostic(
        code(loomgraph::provider::unknown),
        help("Check the flow's provider_id and the node's providerId override against the registry.")
    )]
    Unknown(String),

    /// The remote HTTP call itself failed (network error, non-2xx status).
    #[error("provider request failed: {0}")]
    #[diagnostic(code(loomgraph::provider::request_failed))]
    Request(String),

    /// The remote service rejected or moderated the request.
    #[error("provider request moderated or rejected: {0}")]
    #[diagnostic(code(loomgraph::provider::moderated))]
    Moderated(String),

    /// Image generation did not complete within the poll budget.
    #[error("image generation timed out after {0} polls")]
    #[diagnostic(
        code(loomgraph::provider::timeout),
        help("The remote service may be degraded; this is not automatically retried.")
    )]
    Timeout(usize),

    /// The remote response body couldn't be decoded into the expected shape.
    #[error("malformed provider response: {0}")]
    #[diagnostic(code(loomgraph::provider::malformed_response))]
    MalformedResponse(String),
}

/// Lazily-populated, process-wide registry of text and image providers.
///
/// Clients are constructed eagerly at registry build time (construction is
/// cheap: it only reads an environment variable and builds a `reqwest::Client`)
/// rather than on first lookup, which keeps the lookup path infallible aside
/// from the "unknown id" case.
pub struct ProviderRegistry {
    text: FxHashMap<String, Arc<dyn TextProvider>>,
    image: FxHashMap<String, Arc<dyn ImageProvider>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: FxHashMap::default(),
            image: FxHashMap::default(),
        }
    }

    /// Register a text provider under `id`, overwriting any prior registration.
    pub fn register_text(&mut self, id: impl Into<String>, provider: Arc<dyn TextProvider>) -> &mut Self {
        self.text.insert(id.into(), provider);
        self
    }

    /// Register an image provider under `id`, overwriting any prior registration.
    pub fn register_image(&mut self, id: impl Into<String>, provider: Arc<dyn ImageProvider>) -> &mut Self {
        self.image.insert(id.into(), provider);
        self
    }

    pub fn text(&self, id: &str) -> Result<Arc<dyn TextProvider>, ProviderError> {
        self.text.get(id).cloned().ok_or_else(|| ProviderError::Unknown(id.to_string()))
    }

    pub fn image(&self, id: &str) -> Result<Arc<dyn ImageProvider>, ProviderError> {
        self.image.get(id).cloned().ok_or_else(|| ProviderError::Unknown(id.to_string()))
    }

    /// Build the default registry from environment-configured credentials,
    /// wiring up every provider id the component design names. A provider
    /// whose API key env var is absent is still registered — construction
    /// doesn't validate reachability, only the first call does.
    #[must_use]
    pub fn from_env() -> Self {
        let mut registry = Self::new();
        registry
            .register_text("mistral", Arc::new(text::OpenAiCompatProvider::new(
                "mistral",
                "https://api.mistral.ai/v1/chat/completions",
                "MISTRAL_API_KEY",
            )))
            .register_text("glm", Arc::new(text::OpenAiCompatProvider::new(
                "glm",
                "https://open.bigmodel.cn/api/paas/v4/chat/completions",
                "GLM_API_KEY",
            )))
            .register_text("openrouter", Arc::new(text::OpenAiCompatProvider::new(
                "openrouter",
                "https://openrouter.ai/api/v1/chat/completions",
                "OPENROUTER_API_KEY",
            )))
            .register_text("huggingface", Arc::new(text::OpenAiCompatProvider::new(
                "huggingface",
                "https://api-inference.huggingface.co/v1/chat/completions",
                "HF_API_KEY",
            )))
            .register_text("claude", Arc::new(text::ClaudeProvider::new("ANTHROPIC_API_KEY")))
            .register_image("blackforestlabs", Arc::new(image::BlackForestLabsProvider::new("FIREWORKS_API_KEY")));
        registry
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Exact pixel-dimension aspect ratio lookups, falling back to a GCD reduction.
#[must_use]
pub fn aspect_ratio_for_dimensions(width: u64, height: u64) -> String {
    match (width, height) {
        (1024, 1024) => "1:1".to_string(),
        (1024, 768) => "4:3".to_string(),
        (768, 1024) => "3:4".to_string(),
        (1280, 720) => "16:9".to_string(),
        (720, 1280) => "9:16".to_string(),
        _ => {
            let divisor = gcd(width, height).max(1);
            format!("{}:{}", width / divisor, height / divisor)
        }
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}
