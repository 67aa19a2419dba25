use async_trait::async_trait;

use crate::graph::{NodeExecutionContext, NodeOutput};
use crate::providers::{ProviderRegistry, aspect_ratio_for_dimensions};

use super::helpers::merge_input_text;
use super::{Executor, ExecutorError};

const DEFAULT_ASPECT_RATIO: &str = "1:1";
const DEFAULT_OUTPUT_FORMAT: &str = "png";

pub struct ImageGenerator;

#[async_trait]
impl Executor for ImageGenerator {
    async fn execute(&self, ctx: &NodeExecutionContext, providers: &ProviderRegistry) -> Result<NodeOutput, ExecutorError> {
        let merged = merge_input_text(&ctx.text_inputs);
        let prompt = if merged.is_empty() { ctx.data_str("prompt").unwrap_or_default().to_string() } else { merged };
        if prompt.is_empty() {
            return Ok(NodeOutput::error("No prompt provided"));
        }

        let width = ctx.data_u64("width");
        let height = ctx.data_u64("height");
        let aspect_ratio = match (width, height) {
            (Some(w), Some(h)) => aspect_ratio_for_dimensions(w, h),
            _ => ctx.data_str("aspectRatio").unwrap_or(DEFAULT_ASPECT_RATIO).to_string(),
        };
        let output_format = ctx.data_str("outputFormat").unwrap_or(DEFAULT_OUTPUT_FORMAT).to_string();

        let provider = providers.image(&ctx.provider_id)?;
        let generated = provider.generate(&prompt, &ctx.model, &aspect_ratio, &output_format, width, height).await?;

        Ok(NodeOutput {
            text: Some(generated.prompt_used),
            image: Some(format!("data:{};base64,{}", generated.content_type, generated.image_base64)),
            ..Default::default()
        })
    }
}
