//! Processing nodes of the story graph.
//!
//! Each node reads the fields it needs from [`StoryState`](crate::state::StoryState),
//! makes one generation call and returns a [`StateUpdate`](crate::state::StateUpdate).

mod general;
mod generate;
mod intent;
mod judge;
mod spec;

pub use general::GeneralNode;
pub use generate::{truncate_at_sentinel, GenerateNode};
pub use intent::IntentNode;
pub use judge::{JudgeNode, JudgeVerdict};
pub use spec::SpecNode;

use crate::llm::GenerationError;
use crate::specification::SpecificationError;
use crate::state::MissingField;
use serde::de::DeserializeOwned;
use std::fmt;
use thiserror::Error;

/// Errors a node can fail a turn with.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    MissingField(#[from] MissingField),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Malformed {what} response: {reason}")]
    MalformedResponse { what: &'static str, reason: String },

    #[error("Unrecognized intent {0:?} in classifier response")]
    UnknownIntent(String),

    #[error(transparent)]
    Specification(#[from] SpecificationError),
}

/// Identifiers of the story graph's nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoryNode {
    Intent,
    Spec,
    Generate,
    Judge,
    General,
}

impl StoryNode {
    pub const ALL: [StoryNode; 5] = [
        StoryNode::Intent,
        StoryNode::Spec,
        StoryNode::Generate,
        StoryNode::Judge,
        StoryNode::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoryNode::Intent => "intent",
            StoryNode::Spec => "spec",
            StoryNode::Generate => "generate",
            StoryNode::Judge => "judge",
            StoryNode::General => "general",
        }
    }
}

impl fmt::Display for StoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip a single surrounding markdown code fence, if present.
pub(crate) fn extract_json(text: &str) -> &str {
    let text = text.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(body) = rest.trim_end().strip_suffix("```") {
            return body.trim();
        }
    }

    text
}

/// Parse a strict JSON reply into `T`.
pub(crate) fn parse_reply<T: DeserializeOwned>(what: &'static str, raw: &str) -> Result<T, NodeError> {
    serde_json::from_str(extract_json(raw)).map_err(|e| NodeError::MalformedResponse {
        what,
        reason: format!("{e}: {raw}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_plain() {
        let text = r#"{"intent": "story"}"#;
        assert_eq!(extract_json(text), text);
    }

    #[test]
    fn test_extract_json_fenced() {
        assert_eq!(
            extract_json("```json\n{\"intent\": \"general\"}\n```"),
            r#"{"intent": "general"}"#
        );
        assert_eq!(
            extract_json("```\n{\"a\": 1}\n```\n"),
            r#"{"a": 1}"#
        );
    }

    #[test]
    fn test_extract_json_leaves_prose_alone() {
        let text = "Sure! Here it is: {\"a\": 1}";
        assert_eq!(extract_json(text), text);
    }

    #[test]
    fn test_node_names() {
        let names: Vec<_> = StoryNode::ALL.iter().map(|n| n.to_string()).collect();
        assert_eq!(names, ["intent", "spec", "generate", "judge", "general"]);
    }
}
