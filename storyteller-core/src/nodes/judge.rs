//! Appropriateness judge node.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::{parse_reply, NodeError};
use crate::debug::debug_log;
use crate::graph::Node;
use crate::llm::{complete_with, GenerationParams, TextGenerator};
use crate::prompts;
use crate::state::{StateUpdate, StoryState};

const PARAMS: GenerationParams = GenerationParams::new(200, 0.0);

/// The judge's structured reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JudgeVerdict {
    pub is_appropriate: bool,
    #[serde(default)]
    pub feedback: String,
}

/// Checks the story for the 5-10 audience.
///
/// A rejection turns the judge's explanation into pending feedback for the
/// spec node and counts one more revision.
pub struct JudgeNode {
    generator: Arc<dyn TextGenerator>,
}

impl JudgeNode {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn evaluate(&self, story: &str) -> Result<JudgeVerdict, NodeError> {
        let prompt = prompts::judge_story(story);
        let raw = complete_with(self.generator.as_ref(), &prompt, PARAMS).await?;
        parse_reply("judge", &raw)
    }
}

#[async_trait]
impl Node<StoryState> for JudgeNode {
    async fn run(&self, state: &StoryState) -> Result<StateUpdate, NodeError> {
        debug_log("judge", "input_state", &serde_json::json!({ "story": state.story }));

        let verdict = self.evaluate(state.require_story()?).await?;

        let update = StateUpdate {
            judge_evaluation: Some(verdict.is_appropriate),
            feedback: Some(if verdict.is_appropriate {
                String::new()
            } else {
                verdict.feedback.clone()
            }),
            judge_feedback: Some(verdict.feedback),
            revisions: (!verdict.is_appropriate).then_some(state.revisions + 1),
            ..Default::default()
        };
        debug_log("judge", "output_delta", &update);
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;

    async fn judge(reply: &str, state: StoryState) -> Result<StateUpdate, NodeError> {
        let generator = Arc::new(ScriptedGenerator::new([reply]));
        JudgeNode::new(generator).run(&state).await
    }

    #[tokio::test]
    async fn test_rejection_becomes_feedback() {
        let update = judge(
            r#"{"is_appropriate": false, "feedback": "too scary"}"#,
            StoryState::new("x").with_story("A dark cave..."),
        )
        .await
        .unwrap();
        assert_eq!(update.judge_evaluation, Some(false));
        assert_eq!(update.feedback.as_deref(), Some("too scary"));
        assert_eq!(update.judge_feedback.as_deref(), Some("too scary"));
        assert_eq!(update.revisions, Some(1));
    }

    #[tokio::test]
    async fn test_approval_keeps_explanation_but_clears_feedback() {
        let update = judge(
            r#"{"is_appropriate": true, "feedback": "lovely"}"#,
            StoryState::new("x").with_story("A warm nest."),
        )
        .await
        .unwrap();
        assert_eq!(update.judge_evaluation, Some(true));
        assert_eq!(update.feedback.as_deref(), Some(""));
        assert_eq!(update.judge_feedback.as_deref(), Some("lovely"));
        assert_eq!(update.revisions, None);
    }

    #[tokio::test]
    async fn test_feedback_defaults_to_empty() {
        let update = judge(
            r#"{"is_appropriate": true}"#,
            StoryState::new("x").with_story("s"),
        )
        .await
        .unwrap();
        assert_eq!(update.judge_feedback.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_revisions_accumulate() {
        let mut state = StoryState::new("x").with_story("s");
        state.revisions = 2;
        let update = judge(r#"{"is_appropriate": false, "feedback": "f"}"#, state)
            .await
            .unwrap();
        assert_eq!(update.revisions, Some(3));
    }

    #[tokio::test]
    async fn test_malformed_verdict_is_fatal() {
        for reply in ["yes it is fine", r#"{"feedback": "no verdict"}"#, r#"{"is_appropriate": "yes"}"#] {
            let err = judge(reply, StoryState::new("x").with_story("s"))
                .await
                .unwrap_err();
            assert!(matches!(err, NodeError::MalformedResponse { what: "judge", .. }));
        }
    }

    #[tokio::test]
    async fn test_missing_story_fails_fast() {
        let err = judge("{}", StoryState::new("x")).await.unwrap_err();
        assert!(matches!(err, NodeError::MissingField(_)));
    }
}
