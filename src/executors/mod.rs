//! The executor registry: `node_type → Executor`, and the shared executor
//! contract every node-type implementation honors.

pub mod compressor;
pub mod consistent_character;
pub mod grammar_fix;
pub mod helpers;
pub mod image_describer;
pub mod image_generator;
pub mod initial_prompt;
pub mod prompt_enhancer;
pub mod prompts;
pub mod scene_builder;
pub mod story_teller;
pub mod text_output;
pub mod translator;

use std::sync::Arc;

use async_trait::async_trait;
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::graph::{NodeExecutionContext, NodeOutput};
use crate::providers::{ProviderError, ProviderRegistry};

/// Errors an executor's provider-calling path can surface. A recoverable
/// missing-input condition is represented as `Ok(NodeOutput::error(_))`
/// instead, per the executor contract in the component design.
#[derive(Debug, Error, Diagnostic)]
pub enum ExecutorError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    #[diagnostic(code(loomgraph::executor::failed))]
    Failed(String),
}

/// One node type's executable behavior.
///
/// Implementations measure their own wall-clock duration when they can do so
/// more precisely than the runner's wrap-the-whole-call measurement (none of
/// the built-in executors currently need this; the runner fills
/// `duration_ms` whenever an executor leaves it unset).
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(
        &self,
        ctx: &NodeExecutionContext,
        providers: &ProviderRegistry,
    ) -> Result<NodeOutput, ExecutorError>;
}

/// Process-wide `node_type → Executor` mapping. Registration is idempotent:
/// registering the same type twice replaces the prior executor rather than
/// erroring.
pub struct ExecutorRegistry {
    executors: FxHashMap<String, Arc<dyn Executor>>,
}

impl ExecutorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { executors: FxHashMap::default() }
    }

    pub fn register(&mut self, node_type: impl Into<String>, executor: Arc<dyn Executor>) -> &mut Self {
        self.executors.insert(node_type.into(), executor);
        self
    }

    #[must_use]
    pub fn get(&self, node_type: &str) -> Option<Arc<dyn Executor>> {
        self.executors.get(node_type).cloned()
    }

    /// Build the registry with every required node type, in the fixed
    /// registration order the component design names.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register("initialPrompt", Arc::new(initial_prompt::InitialPrompt))
            .register("promptEnhancer", Arc::new(prompt_enhancer::PromptEnhancer))
            .register("translator", Arc::new(translator::Translator))
            .register("storyTeller", Arc::new(story_teller::StoryTeller))
            .register("grammarFix", Arc::new(grammar_fix::GrammarFix))
            .register("compressor", Arc::new(compressor::Compressor))
            .register("textOutput", Arc::new(text_output::TextOutput))
            .register("imageDescriber", Arc::new(image_describer::ImageDescriber))
            .register("imageGenerator", Arc::new(image_generator::ImageGenerator))
            .register("consistentCharacter", Arc::new(consistent_character::ConsistentCharacter))
            .register("sceneBuilder", Arc::new(scene_builder::SceneBuilder));
        registry
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_cover_every_required_type() {
        let registry = ExecutorRegistry::with_builtins();
        for ty in [
            "initialPrompt",
            "promptEnhancer",
            "translator",
            "storyTeller",
            "grammarFix",
            "compressor",
            "textOutput",
            "imageDescriber",
            "imageGenerator",
            "consistentCharacter",
            "sceneBuilder",
        ] {
            assert!(registry.get(ty).is_some(), "missing executor for {ty}");
        }
        assert!(registry.get("nonexistent").is_none());
    }
}
