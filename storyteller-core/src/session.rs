//! StorySession - the conversation driver.
//!
//! A session owns the compiled story graph, the conversation history and the
//! fields carried from one turn to the next. Each call to
//! [`StorySession::send`] runs the graph once for one user message.

use std::sync::Arc;

use claude::Claude;
use thiserror::Error;

use crate::config::{ConfigError, StoryConfig};
use crate::graph::{CompileError, GraphError};
use crate::intent::Intent;
use crate::llm::TextGenerator;
use crate::nodes::StoryNode;
use crate::state::{Carry, StoryState, Turn};
use crate::story_graph::{build_story_graph, StoryGraph};

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Turn failed: {0}")]
    Graph(#[from] GraphError),

    #[error("Invalid story graph: {0}")]
    Compile(#[from] CompileError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No API key configured - set ANTHROPIC_API_KEY environment variable")]
    NoApiKey,

    #[error("Message is empty")]
    EmptyMessage,
}

/// What the assistant answered for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnReply {
    /// Reply to a message that was not about a story.
    General { response: String },

    /// A new or revised story.
    Story {
        story: String,
        /// Whether the judge accepted the final story.
        approved: bool,
        /// Judge explanation, empty when the judge gave none.
        judge_feedback: String,
    },
}

impl TurnReply {
    /// Text to show as the assistant's answer.
    pub fn text(&self) -> &str {
        match self {
            TurnReply::General { response } => response,
            TurnReply::Story { story, .. } => story,
        }
    }

    /// Judge explanation worth showing, if any.
    pub fn judge_feedback(&self) -> Option<&str> {
        match self {
            TurnReply::Story { judge_feedback, .. } if !judge_feedback.is_empty() => {
                Some(judge_feedback)
            }
            _ => None,
        }
    }

    fn from_state(state: &StoryState) -> Self {
        // A missing intent was routed as a story.
        if matches!(state.intent, Some(intent) if !intent.is_story_pipeline()) {
            return TurnReply::General {
                response: state.general_response.clone().unwrap_or_default(),
            };
        }
        TurnReply::Story {
            story: state.story.clone().unwrap_or_default(),
            approved: state.judge_evaluation != Some(false),
            judge_feedback: state.judge_feedback.clone().unwrap_or_default(),
        }
    }

    /// History entries the assistant contributes for this reply.
    fn history_turns(&self) -> Vec<Turn> {
        let mut turns = Vec::new();
        if !self.text().is_empty() {
            turns.push(Turn::assistant(self.text()));
        }
        if let Some(feedback) = self.judge_feedback() {
            turns.push(Turn::assistant(format!("Judge feedback: {feedback}")));
        }
        turns
    }
}

/// A storytelling conversation.
pub struct StorySession {
    graph: StoryGraph,
    history: Vec<Turn>,
    carry: Carry,
    last_path: Vec<StoryNode>,
}

impl StorySession {
    /// Create a session generating text with `generator`.
    pub fn new(generator: Arc<dyn TextGenerator>, config: &StoryConfig) -> Result<Self, SessionError> {
        Ok(Self::with_graph(build_story_graph(generator, config)?))
    }

    /// Create a session backed by Claude.
    ///
    /// Requires `ANTHROPIC_API_KEY` environment variable to be set.
    pub fn from_env(config: &StoryConfig) -> Result<Self, SessionError> {
        let mut client = Claude::from_env()
            .map_err(|_| SessionError::NoApiKey)?
            .with_timeout(config.timeout);
        if let Some(model) = &config.model {
            client = client.with_model(model.clone());
        }
        tracing::info!(model = client.model(), timeout = ?config.timeout, "storyteller session ready");
        Self::new(Arc::new(client), config)
    }

    /// Create a session around an already compiled graph.
    pub fn with_graph(graph: StoryGraph) -> Self {
        Self {
            graph,
            history: Vec::new(),
            carry: Carry::default(),
            last_path: Vec::new(),
        }
    }

    /// Bound the number of node executions per turn.
    pub fn with_max_steps(mut self, limit: usize) -> Self {
        self.graph = self.graph.with_max_steps(limit);
        self
    }

    /// Process one user message.
    ///
    /// The message is recorded in the history before the graph runs. A failed
    /// turn keeps it there but leaves the carried fields untouched.
    pub async fn send(&mut self, message: &str) -> Result<TurnReply, SessionError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        self.history.push(Turn::user(message));
        let state = StoryState::for_turn(message, &self.history, &self.carry);

        let run = self.graph.invoke(state).await.inspect_err(|e| {
            tracing::warn!(error = %e, "turn failed");
        })?;

        let reply = TurnReply::from_state(&run.state);
        tracing::info!(
            intent = ?run.state.intent,
            steps = run.path.len(),
            revisions = run.state.revisions,
            "turn finished"
        );

        self.history.extend(reply.history_turns());
        self.carry.absorb(&run.state);
        self.last_path = run.path;
        Ok(reply)
    }

    /// Conversation so far, oldest first.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Fields carried into the next turn.
    pub fn carry(&self) -> &Carry {
        &self.carry
    }

    /// Nodes executed by the last successful turn.
    pub fn last_path(&self) -> &[StoryNode] {
        &self.last_path
    }
}
