//! Story specification record.
//!
//! A specification is the structured brief the story generator works from.
//! It travels through the conversation state in its serialized JSON form and
//! is re-validated every time a node reads it.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use thiserror::Error;

/// Target word count used when the builder omits one.
pub const DEFAULT_LENGTH: u32 = 1000;

/// Errors from reading or writing a specification.
#[derive(Debug, Error)]
pub enum SpecificationError {
    #[error("Malformed specification: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Structured description governing story generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorySpecification {
    /// Concise topic or title derived from the request.
    pub topic: String,
    /// Emotional register, e.g. "cozy, reassuring".
    pub tone: String,
    /// Prose style, e.g. "simple sentences, gentle imagery".
    pub style: String,
    /// Short walkthrough of the story arc.
    pub plan: String,
    /// Approximate target word count.
    #[serde(default = "default_length")]
    pub length: NonZeroU32,
}

fn default_length() -> NonZeroU32 {
    NonZeroU32::new(DEFAULT_LENGTH).unwrap_or(NonZeroU32::MIN)
}

impl StorySpecification {
    /// Parse a specification from JSON, rejecting missing, extra or mistyped fields.
    pub fn from_json(json: &str) -> Result<Self, SpecificationError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Canonical serialized form stored in the conversation state.
    pub fn to_json(&self) -> Result<String, SpecificationError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Target length as a plain integer.
    pub fn target_length(&self) -> u32 {
        self.length.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StorySpecification {
        StorySpecification {
            topic: "A brave mouse".to_string(),
            tone: "cozy".to_string(),
            style: "simple sentences".to_string(),
            plan: "Mouse finds a lost button and returns it.".to_string(),
            length: NonZeroU32::new(450).unwrap(),
        }
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let spec = sample();
        let json = spec.to_json().unwrap();
        assert_eq!(StorySpecification::from_json(&json).unwrap(), spec);
    }

    #[test]
    fn test_length_defaults_when_missing() {
        let spec = StorySpecification::from_json(
            r#"{"topic":"t","tone":"x","style":"s","plan":"p"}"#,
        )
        .unwrap();
        assert_eq!(spec.target_length(), DEFAULT_LENGTH);
    }

    #[test]
    fn test_rejects_missing_field() {
        let err = StorySpecification::from_json(r#"{"topic":"t","tone":"x","plan":"p","length":5}"#);
        assert!(matches!(err, Err(SpecificationError::Malformed(_))));
    }

    #[test]
    fn test_rejects_mistyped_and_non_positive_length() {
        for json in [
            r#"{"topic":"t","tone":"x","style":"s","plan":"p","length":"500"}"#,
            r#"{"topic":"t","tone":"x","style":"s","plan":"p","length":0}"#,
            r#"{"topic":"t","tone":"x","style":"s","plan":"p","length":-3}"#,
            r#"{"topic":"t","tone":"x","style":"s","plan":"p","length":512.5}"#,
        ] {
            assert!(StorySpecification::from_json(json).is_err(), "accepted {json}");
        }
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = StorySpecification::from_json(
            r#"{"topic":"t","tone":"x","style":"s","plan":"p","length":5,"moral":"share"}"#,
        );
        assert!(err.is_err());
    }
}
