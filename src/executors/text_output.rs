use async_trait::async_trait;

use crate::graph::{NodeExecutionContext, NodeOutput};
use crate::providers::ProviderRegistry;

use super::helpers::merge_input_text;
use super::{Executor, ExecutorError};

/// The terminal sink of a text pipeline: identity merge of upstream text.
pub struct TextOutput;

#[async_trait]
impl Executor for TextOutput {
    async fn execute(&self, ctx: &NodeExecutionContext, _providers: &ProviderRegistry) -> Result<NodeOutput, ExecutorError> {
        Ok(NodeOutput { text: Some(merge_input_text(&ctx.text_inputs)), ..Default::default() })
    }
}
