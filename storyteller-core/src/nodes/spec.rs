//! Specification builder node.

use std::sync::Arc;

use async_trait::async_trait;

use super::{extract_json, NodeError};
use crate::debug::debug_log;
use crate::graph::Node;
use crate::llm::{complete_with, GenerationParams, TextGenerator};
use crate::prompts;
use crate::specification::StorySpecification;
use crate::state::{StateUpdate, StoryState};

const PARAMS: GenerationParams = GenerationParams::new(500, 0.4);

/// Builds a fresh specification or revises the current one with pending feedback.
///
/// Every pass consumes the feedback, so the output always resets it to "".
pub struct SpecNode {
    generator: Arc<dyn TextGenerator>,
}

impl SpecNode {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Node<StoryState> for SpecNode {
    async fn run(&self, state: &StoryState) -> Result<StateUpdate, NodeError> {
        debug_log(
            "spec",
            "input_state",
            &serde_json::json!({
                "message": state.message,
                "specifications": state.specifications,
                "feedback": state.feedback,
            }),
        );

        let prompt = prompts::build_specification(
            &state.message,
            state.specifications.as_deref(),
            state.pending_feedback(),
        );
        let raw = complete_with(self.generator.as_ref(), &prompt, PARAMS).await?;
        let specification = StorySpecification::from_json(extract_json(&raw))?;

        let update = StateUpdate {
            specifications: Some(specification.to_json()?),
            feedback: Some(String::new()),
            ..Default::default()
        };
        debug_log("spec", "output_delta", &update);
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;

    const SPEC: &str = r#"{"topic":"A brave mouse","tone":"cozy","style":"simple","plan":"Mouse finds courage.","length":400}"#;

    fn node(replies: &[&str]) -> (SpecNode, Arc<ScriptedGenerator>) {
        let generator = Arc::new(ScriptedGenerator::new(replies.iter().copied()));
        (SpecNode::new(generator.clone()), generator)
    }

    #[tokio::test]
    async fn test_builds_canonical_spec_and_clears_feedback() {
        let fenced = format!("```json\n{SPEC}\n```");
        let (node, generator) = node(&[fenced.as_str()]);
        let update = node
            .run(&StoryState::new("a brave mouse").with_feedback("more dialogue"))
            .await
            .unwrap();

        assert_eq!(update.feedback.as_deref(), Some(""));
        let spec = StorySpecification::from_json(update.specifications.as_deref().unwrap()).unwrap();
        assert_eq!(spec.topic, "A brave mouse");
        assert_eq!(spec.target_length(), 400);

        let calls = generator.calls().await;
        assert_eq!(calls[0].max_tokens, 500);
        assert_eq!(calls[0].temperature, 0.4);
        assert!(calls[0].prompt.contains("FEEDBACK TO APPLY:\nmore dialogue"));
    }

    #[tokio::test]
    async fn test_feedback_cleared_even_without_pending_feedback() {
        let (node, generator) = node(&[SPEC]);
        let update = node.run(&StoryState::new("a mouse")).await.unwrap();
        assert_eq!(update.feedback.as_deref(), Some(""));
        assert!(!generator.last_prompt().await.unwrap().contains("FEEDBACK TO APPLY"));
    }

    #[tokio::test]
    async fn test_prior_spec_is_revised() {
        let (node, generator) = node(&[SPEC]);
        node.run(&StoryState::new("shorter").with_specifications(SPEC))
            .await
            .unwrap();
        let prompt = generator.last_prompt().await.unwrap();
        assert!(prompt.contains("CURRENT SPEC (JSON):"));
        assert!(prompt.contains("Revise the CURRENT SPEC"));
    }

    #[tokio::test]
    async fn test_missing_length_defaults() {
        let (node, _) = node(&[r#"{"topic":"t","tone":"t","style":"s","plan":"p"}"#]);
        let update = node.run(&StoryState::new("x")).await.unwrap();
        let spec = StorySpecification::from_json(update.specifications.as_deref().unwrap()).unwrap();
        assert_eq!(spec.target_length(), 1000);
    }

    #[tokio::test]
    async fn test_malformed_spec_is_fatal() {
        for reply in [
            "not json",
            r#"{"topic":"t","tone":"t","style":"s"}"#,
            r#"{"topic":"t","tone":"t","style":"s","plan":"p","length":"long"}"#,
            r#"{"topic":"t","tone":"t","style":"s","plan":"p","length":0}"#,
            r#"{"topic":"t","tone":"t","style":"s","plan":"p","moral":"be kind"}"#,
        ] {
            let (node, _) = node(&[reply]);
            let err = node.run(&StoryState::new("x")).await.unwrap_err();
            assert!(matches!(err, NodeError::Specification(_)), "{reply}: {err}");
        }
    }
}
