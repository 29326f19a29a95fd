//! General conversation node.

use std::sync::Arc;

use async_trait::async_trait;

use super::NodeError;
use crate::debug::debug_log;
use crate::graph::Node;
use crate::llm::{complete_with, GenerationParams, TextGenerator};
use crate::prompts::{self, HISTORY_WINDOW};
use crate::state::{StateUpdate, StoryState};

const PARAMS: GenerationParams = GenerationParams::new(300, 0.3);

/// Answers messages that are not about a story.
pub struct GeneralNode {
    generator: Arc<dyn TextGenerator>,
}

impl GeneralNode {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Node<StoryState> for GeneralNode {
    async fn run(&self, state: &StoryState) -> Result<StateUpdate, NodeError> {
        debug_log("general", "input_state", &serde_json::json!({ "message": state.message }));

        let prompt = prompts::general_response(&state.message, state.recent_history(HISTORY_WINDOW));
        let raw = complete_with(self.generator.as_ref(), &prompt, PARAMS).await?;

        let update = StateUpdate {
            general_response: Some(raw.trim().to_string()),
            ..Default::default()
        };
        debug_log("general", "output_delta", &update);
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationError;
    use crate::testing::ScriptedGenerator;

    #[tokio::test]
    async fn test_reply_is_trimmed() {
        let generator = Arc::new(ScriptedGenerator::new(["\n  I tell bedtime stories!  \n"]));
        let update = GeneralNode::new(generator.clone())
            .run(&StoryState::new("what is this app?"))
            .await
            .unwrap();
        assert_eq!(update.general_response.as_deref(), Some("I tell bedtime stories!"));
        assert!(update.story.is_none());

        let calls = generator.calls().await;
        assert_eq!(calls[0].max_tokens, 300);
        assert_eq!(calls[0].temperature, 0.3);
    }

    #[tokio::test]
    async fn test_empty_reply_is_upstream_error() {
        let generator = Arc::new(ScriptedGenerator::new([""]));
        let err = GeneralNode::new(generator)
            .run(&StoryState::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::Generation(GenerationError::EmptyResponse)));
    }
}
