use async_trait::async_trait;

use crate::graph::{NodeExecutionContext, NodeOutput};
use crate::providers::ProviderRegistry;
use crate::scene::{SCENE_ATTRIBUTE_KEYS, scene_block_text};

use super::{Executor, ExecutorError};

/// Composes a scene prompt from canonical attribute blocks, in the fixed key
/// order `imageStyle, lighting, timeOfDay, weather, cameraAngle, cameraLens,
/// mood`, regardless of the order the attributes appear in `node_data`.
pub struct SceneBuilder;

#[async_trait]
impl Executor for SceneBuilder {
    async fn execute(&self, ctx: &NodeExecutionContext, _providers: &ProviderRegistry) -> Result<NodeOutput, ExecutorError> {
        let blocks: Vec<&str> = SCENE_ATTRIBUTE_KEYS
            .iter()
            .filter_map(|key| {
                let value = ctx.data_str(key)?;
                scene_block_text(key, value)
            })
            .collect();

        Ok(NodeOutput { text: Some(blocks.join("\n\n")), ..Default::default() })
    }
}
