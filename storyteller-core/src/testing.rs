//! Testing utilities for the storyteller.
//!
//! This module provides tools for deterministic tests without API calls:
//! - `ScriptedGenerator` replays queued replies and records every call
//! - `TestHarness` drives a full session against a scripted generator
//! - Assertion helpers for verifying turn outcomes

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::config::StoryConfig;
use crate::intent::Intent;
use crate::llm::{GenerationError, TextGenerator};
use crate::nodes::StoryNode;
use crate::session::{SessionError, StorySession, TurnReply};
use crate::specification::StorySpecification;

/// One recorded call to a [`ScriptedGenerator`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationCall {
    pub prompt: String,
    pub max_tokens: usize,
    pub temperature: f32,
}

/// A generator that returns scripted replies in order.
///
/// Once the script runs out every call fails with
/// [`GenerationError::Unavailable`].
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<GenerationCall>>,
}

impl ScriptedGenerator {
    pub fn new<I, T>(replies: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Add a reply to the end of the script.
    pub async fn queue(&self, reply: impl Into<String>) {
        self.replies.lock().await.push_back(Ok(reply.into()));
    }

    /// Make the next unscripted call fail with `reason`.
    pub async fn queue_failure(&self, reason: impl Into<String>) {
        self.replies.lock().await.push_back(Err(reason.into()));
    }

    /// Every call made so far, oldest first.
    pub async fn calls(&self) -> Vec<GenerationCall> {
        self.calls.lock().await.clone()
    }

    pub async fn last_prompt(&self) -> Option<String> {
        self.calls.lock().await.last().map(|c| c.prompt.clone())
    }

    /// Replies not consumed yet.
    pub async fn remaining(&self) -> usize {
        self.replies.lock().await.len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: usize,
        temperature: f32,
    ) -> Result<String, GenerationError> {
        self.calls.lock().await.push(GenerationCall {
            prompt: prompt.to_string(),
            max_tokens,
            temperature,
        });

        match self.replies.lock().await.pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(reason)) => Err(GenerationError::Unavailable(reason)),
            None => Err(GenerationError::Unavailable(
                "script exhausted".to_string(),
            )),
        }
    }
}

/// Build a specification reply for `topic` with plain defaults.
pub fn spec_json(topic: &str) -> String {
    serde_json::json!({
        "topic": topic,
        "tone": "cozy, reassuring",
        "style": "simple sentences, gentle imagery",
        "plan": format!("A gentle story about {topic} with a kind ending."),
        "length": 400,
    })
    .to_string()
}

/// Build a judge reply.
pub fn verdict_json(is_appropriate: bool, feedback: &str) -> String {
    serde_json::json!({ "is_appropriate": is_appropriate, "feedback": feedback }).to_string()
}

/// Test harness for running conversation scenarios.
pub struct TestHarness {
    /// The scripted generator shared with the session.
    pub generator: Arc<ScriptedGenerator>,
    /// The session under test.
    pub session: StorySession,
}

impl TestHarness {
    /// Create a harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(&StoryConfig::new())
    }

    /// Create a harness with custom configuration.
    pub fn with_config(config: &StoryConfig) -> Self {
        let generator = Arc::new(ScriptedGenerator::default());
        let session = match StorySession::new(generator.clone(), config) {
            Ok(session) => session,
            Err(e) => panic!("story graph failed to compile: {e}"),
        };
        Self { generator, session }
    }

    /// Queue the classifier's reply.
    pub async fn expect_intent(&self, intent: Intent) -> &Self {
        self.generator
            .queue(format!(r#"{{"intent": "{}"}}"#, intent.as_str()))
            .await;
        self
    }

    /// Queue a specification reply for `topic`.
    pub async fn expect_spec(&self, topic: &str) -> &Self {
        self.generator.queue(spec_json(topic)).await;
        self
    }

    /// Queue a story reply, terminated with the end sentinel.
    pub async fn expect_story(&self, story: &str) -> &Self {
        self.generator.queue(format!("{story}\n<END>\n")).await;
        self
    }

    /// Queue the judge's verdict.
    pub async fn expect_verdict(&self, is_appropriate: bool, feedback: &str) -> &Self {
        self.generator
            .queue(verdict_json(is_appropriate, feedback))
            .await;
        self
    }

    /// Queue a general-chat reply.
    pub async fn expect_general(&self, response: &str) -> &Self {
        self.generator.queue(response).await;
        self
    }

    /// Send a user message through the session.
    pub async fn send(&mut self, message: &str) -> Result<TurnReply, SessionError> {
        self.session.send(message).await
    }

    /// The carried specification, parsed.
    pub fn specification(&self) -> Option<StorySpecification> {
        self.session
            .carry()
            .specifications
            .as_deref()
            .and_then(|json| StorySpecification::from_json(json).ok())
    }

    /// Nodes executed by the last turn.
    pub fn path(&self) -> &[StoryNode] {
        self.session.last_path()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the reply is a story the judge approved.
#[track_caller]
pub fn assert_approved_story(reply: &TurnReply) {
    match reply {
        TurnReply::Story { story, approved, .. } => {
            assert!(*approved, "Expected the judge to approve the story");
            assert!(!story.is_empty(), "Expected a non-empty story");
        }
        other => panic!("Expected a story reply, got {other:?}"),
    }
}

/// Assert the reply is a story the judge rejected.
#[track_caller]
pub fn assert_rejected_story(reply: &TurnReply) {
    match reply {
        TurnReply::Story { approved, .. } => {
            assert!(!*approved, "Expected the judge to reject the story")
        }
        other => panic!("Expected a story reply, got {other:?}"),
    }
}

/// Assert the reply is a general-chat answer.
#[track_caller]
pub fn assert_general(reply: &TurnReply) {
    assert!(
        matches!(reply, TurnReply::General { .. }),
        "Expected a general reply, got {reply:?}"
    );
}

/// Assert the last turn visited exactly `expected`.
#[track_caller]
pub fn assert_path(harness: &TestHarness, expected: &[StoryNode]) {
    assert_eq!(harness.path(), expected, "Unexpected node path");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_generator_replays_in_order() {
        let generator = ScriptedGenerator::new(["first", "second"]);
        assert_eq!(generator.complete("a", 1, 0.0).await.unwrap(), "first");
        assert_eq!(generator.complete("b", 2, 0.5).await.unwrap(), "second");
        assert!(matches!(
            generator.complete("c", 3, 0.0).await,
            Err(GenerationError::Unavailable(_))
        ));

        let calls = generator.calls().await;
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].prompt, "b");
        assert_eq!(calls[1].max_tokens, 2);
    }

    #[tokio::test]
    async fn test_queued_failure() {
        let generator = ScriptedGenerator::default();
        generator.queue_failure("offline").await;
        generator.queue("back").await;
        assert!(generator.complete("x", 1, 0.0).await.is_err());
        assert_eq!(generator.complete("x", 1, 0.0).await.unwrap(), "back");
        assert_eq!(generator.remaining().await, 0);
    }

    #[tokio::test]
    async fn test_harness_story_turn() {
        let mut harness = TestHarness::new();
        harness
            .expect_intent(Intent::Story)
            .await
            .expect_spec("A sleepy owl")
            .await
            .expect_story("The owl slept.")
            .await
            .expect_verdict(true, "")
            .await;

        let reply = harness.send("an owl story").await.unwrap();
        assert_approved_story(&reply);
        assert_eq!(reply.text(), "The owl slept.");
        assert_path(
            &harness,
            &[
                StoryNode::Intent,
                StoryNode::Spec,
                StoryNode::Generate,
                StoryNode::Judge,
            ],
        );
        assert_eq!(harness.specification().unwrap().topic, "A sleepy owl");
    }
}
