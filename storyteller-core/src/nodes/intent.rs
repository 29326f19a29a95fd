//! Intent classifier node.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{parse_reply, NodeError};
use crate::debug::debug_log;
use crate::graph::Node;
use crate::intent::{Intent, IntentReply};
use crate::llm::{complete_with, GenerationParams, TextGenerator};
use crate::prompts::{self, HISTORY_WINDOW};
use crate::state::{StateUpdate, StoryState};

const PARAMS: GenerationParams = GenerationParams::new(200, 0.0);

/// Classifies the user message as story, feedback or general.
///
/// A `feedback` message also becomes the pending revision instruction.
pub struct IntentNode {
    generator: Arc<dyn TextGenerator>,
}

impl IntentNode {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Classify `message` given recent `history`.
    pub async fn classify(&self, message: &str, history: &[crate::state::Turn]) -> Result<Intent, NodeError> {
        let prompt = prompts::classify_intent(message, history);
        let raw = complete_with(self.generator.as_ref(), &prompt, PARAMS).await?;
        parse_intent(&raw)
    }
}

fn parse_intent(raw: &str) -> Result<Intent, NodeError> {
    // Tell an out-of-range value apart from a broken reply.
    let value: Value = parse_reply("intent", raw)?;
    if let Some(other) = value.get("intent").and_then(Value::as_str) {
        if !Intent::ALL.iter().any(|i| i.as_str() == other) {
            return Err(NodeError::UnknownIntent(other.to_string()));
        }
    }
    let reply: IntentReply = serde_json::from_value(value).map_err(|e| NodeError::MalformedResponse {
        what: "intent",
        reason: format!("{e}: {raw}"),
    })?;
    Ok(reply.intent)
}

#[async_trait]
impl Node<StoryState> for IntentNode {
    async fn run(&self, state: &StoryState) -> Result<StateUpdate, NodeError> {
        debug_log(
            "intent",
            "input_state",
            &serde_json::json!({ "message": state.message, "history_turns": state.history.len() }),
        );

        let intent = self
            .classify(&state.message, state.recent_history(HISTORY_WINDOW))
            .await?;

        let update = StateUpdate {
            intent: Some(intent),
            feedback: (intent == Intent::Feedback).then(|| state.message.clone()),
            ..Default::default()
        };
        debug_log("intent", "output_delta", &update);
        Ok(update)
    }
}
