use async_trait::async_trait;

use crate::graph::{NodeExecutionContext, NodeOutput};
use crate::providers::{ChatMessage, ProviderRegistry};

use super::prompts;
use super::{Executor, ExecutorError};

const FALLBACK_MEDIA_TYPE: &str = "image/png";

struct ParsedImage {
    media_type: String,
    payload: String,
}

/// Parse `data:<media>;base64,<payload>`, falling back to
/// [`FALLBACK_MEDIA_TYPE`] when the `data:...;base64,` header is absent (the
/// input is then treated as a bare base64 payload).
fn parse_data_uri(image: &str) -> ParsedImage {
    if let Some(rest) = image.strip_prefix("data:") {
        if let Some((header, payload)) = rest.split_once(";base64,") {
            return ParsedImage { media_type: header.to_string(), payload: payload.to_string() };
        }
    }
    ParsedImage { media_type: FALLBACK_MEDIA_TYPE.to_string(), payload: image.to_string() }
}

/// Describes an uploaded image via the resolved vision-capable text provider.
pub struct ImageDescriber;

#[async_trait]
impl Executor for ImageDescriber {
    async fn execute(&self, ctx: &NodeExecutionContext, providers: &ProviderRegistry) -> Result<NodeOutput, ExecutorError> {
        let Some(image) = ctx.data_str("image") else {
            return Ok(NodeOutput::error("No image provided"));
        };

        let parsed = parse_data_uri(image);
        let provider = providers.text(&ctx.provider_id)?;
        let messages = vec![
            ChatMessage::system(prompts::describe_image_system_prompt()),
            ChatMessage::user(format!("data:{};base64,{}", parsed.media_type, parsed.payload)),
        ];
        let description = provider.chat(&messages, &ctx.model, ctx.temperature, prompts::PROVIDER_OUTPUT_CHAR_CAP as u32).await?;

        Ok(NodeOutput { text: Some(description), image: Some(image.to_string()), ..Default::default() })
    }
}
