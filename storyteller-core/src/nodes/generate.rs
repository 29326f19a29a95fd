//! Story generator node.

use std::sync::Arc;

use async_trait::async_trait;

use super::NodeError;
use crate::debug::debug_log;
use crate::graph::Node;
use crate::llm::{complete_with, GenerationParams, TextGenerator};
use crate::prompts::{self, END_SENTINEL};
use crate::specification::StorySpecification;
use crate::state::{StateUpdate, StoryState};

const PARAMS: GenerationParams = GenerationParams::new(1200, 0.35);

/// Keep the text before the first end sentinel, trimmed.
///
/// Text without a sentinel is returned unchanged.
pub fn truncate_at_sentinel(text: &str) -> &str {
    match text.find(END_SENTINEL) {
        Some(idx) => text[..idx].trim(),
        None => text,
    }
}

/// Writes the story from the current specification.
pub struct GenerateNode {
    generator: Arc<dyn TextGenerator>,
}

impl GenerateNode {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Node<StoryState> for GenerateNode {
    async fn run(&self, state: &StoryState) -> Result<StateUpdate, NodeError> {
        debug_log(
            "generate",
            "input_state",
            &serde_json::json!({ "specifications": state.specifications }),
        );

        // Re-validate and canonicalize before prompting.
        let specification = StorySpecification::from_json(state.require_specifications()?)?;
        let prompt = prompts::generate_story(&specification.to_json()?);
        let raw = complete_with(self.generator.as_ref(), &prompt, PARAMS).await?;

        let update = StateUpdate {
            story: Some(truncate_at_sentinel(&raw).to_string()),
            ..Default::default()
        };
        debug_log("generate", "output_delta", &update);
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;

    const SPEC: &str = r#"{"topic":"Owl","tone":"calm","style":"simple","plan":"Owl sleeps.","length":300}"#;

    #[test]
    fn test_truncate_at_sentinel() {
        assert_eq!(
            truncate_at_sentinel("Once upon a time... the end.\n<END>\ntrailer text"),
            "Once upon a time... the end."
        );
        assert_eq!(truncate_at_sentinel("  no marker here \n"), "  no marker here \n");
        assert_eq!(truncate_at_sentinel("a<END>b<END>c"), "a");
        assert_eq!(truncate_at_sentinel("<END>"), "");
    }

    #[tokio::test]
    async fn test_generates_from_spec() {
        let generator = Arc::new(ScriptedGenerator::new(["The owl yawned.\n<END>\n"]));
        let node = GenerateNode::new(generator.clone());
        let update = node
            .run(&StoryState::new("owl story").with_specifications(SPEC))
            .await
            .unwrap();
        assert_eq!(update.story.as_deref(), Some("The owl yawned."));

        let calls = generator.calls().await;
        assert_eq!(calls[0].max_tokens, 1200);
        assert_eq!(calls[0].temperature, 0.35);
        assert!(calls[0].prompt.contains(r#""topic":"Owl""#));
    }

    #[tokio::test]
    async fn test_missing_spec_fails_fast() {
        let generator = Arc::new(ScriptedGenerator::new(["unused"]));
        let node = GenerateNode::new(generator.clone());
        let err = node.run(&StoryState::new("x")).await.unwrap_err();
        assert!(matches!(err, NodeError::MissingField(_)));
        assert!(generator.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_spec_fails() {
        let generator = Arc::new(ScriptedGenerator::new(["unused"]));
        let node = GenerateNode::new(generator);
        let err = node
            .run(&StoryState::new("x").with_specifications("{\"topic\": 3}"))
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::Specification(_)));
    }
}
