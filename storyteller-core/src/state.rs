//! Conversation state threaded through the story graph.
//!
//! `StoryState` is the full record a node sees. Nodes never mutate it; they
//! return a [`StateUpdate`] whose `Some` fields overwrite the state when the
//! graph merges it. Absent fields leave the state untouched.

use crate::graph::GraphState;
use crate::intent::Intent;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A node read a field that no predecessor guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("required state field `{0}` is missing")]
pub struct MissingField(pub &'static str);

/// Who said a history turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Capitalized label used when rendering history into prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One entry of the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The evolving conversation/story state for one graph invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoryState {
    /// Current user utterance.
    pub message: String,
    pub intent: Option<Intent>,
    /// Serialized [`StorySpecification`](crate::specification::StorySpecification).
    pub specifications: Option<String>,
    pub story: Option<String>,
    /// Pending revision instruction; consumed by the spec node.
    pub feedback: Option<String>,
    pub judge_evaluation: Option<bool>,
    pub judge_feedback: Option<String>,
    pub general_response: Option<String>,
    /// Judge rejections so far in this invocation.
    pub revisions: u32,
    #[serde(skip)]
    pub history: Vec<Turn>,
}

impl StoryState {
    /// Create a state holding only the user message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Build the payload for a turn: message and history plus carried fields.
    pub fn for_turn(message: impl Into<String>, history: &[Turn], carry: &Carry) -> Self {
        Self {
            message: message.into(),
            history: history.to_vec(),
            specifications: carry.specifications.clone(),
            story: carry.story.clone(),
            judge_evaluation: carry.judge_evaluation,
            judge_feedback: carry.judge_feedback.clone(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_specifications(mut self, specifications: impl Into<String>) -> Self {
        self.specifications = Some(specifications.into());
        self
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }

    pub fn with_story(mut self, story: impl Into<String>) -> Self {
        self.story = Some(story.into());
        self
    }

    /// The story text, failing when no generator has produced one.
    pub fn require_story(&self) -> Result<&str, MissingField> {
        self.story.as_deref().ok_or(MissingField("story"))
    }

    /// The serialized specification, failing when none has been built.
    pub fn require_specifications(&self) -> Result<&str, MissingField> {
        self.specifications
            .as_deref()
            .ok_or(MissingField("specifications"))
    }

    /// Non-empty pending feedback, if any.
    pub fn pending_feedback(&self) -> Option<&str> {
        self.feedback.as_deref().filter(|f| !f.is_empty())
    }

    /// The most recent `limit` history turns.
    pub fn recent_history(&self, limit: usize) -> &[Turn] {
        let start = self.history.len().saturating_sub(limit);
        &self.history[start..]
    }
}

/// Partial state returned by a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judge_evaluation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judge_feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revisions: Option<u32>,
}

impl StateUpdate {
    /// Whether the update carries no fields at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl GraphState for StoryState {
    type Update = StateUpdate;

    fn merge(&mut self, update: StateUpdate) {
        fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        overwrite(&mut self.intent, update.intent);
        overwrite(&mut self.specifications, update.specifications);
        overwrite(&mut self.story, update.story);
        overwrite(&mut self.feedback, update.feedback);
        overwrite(&mut self.judge_evaluation, update.judge_evaluation);
        overwrite(&mut self.judge_feedback, update.judge_feedback);
        overwrite(&mut self.general_response, update.general_response);
        if let Some(revisions) = update.revisions {
            self.revisions = revisions;
        }
    }
}

/// Fields the driver keeps between turns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Carry {
    pub specifications: Option<String>,
    pub story: Option<String>,
    pub judge_evaluation: Option<bool>,
    pub judge_feedback: Option<String>,
}

impl Carry {
    /// Keep every carried field the final state has a value for.
    pub fn absorb(&mut self, state: &StoryState) {
        if state.specifications.is_some() {
            self.specifications = state.specifications.clone();
        }
        if state.story.is_some() {
            self.story = state.story.clone();
        }
        if state.judge_evaluation.is_some() {
            self.judge_evaluation = state.judge_evaluation;
        }
        if state.judge_feedback.is_some() {
            self.judge_feedback = state.judge_feedback.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
