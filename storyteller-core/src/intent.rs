//! User intent classification values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user wants from the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// A request for a new or continued story.
    Story,
    /// Instructions to revise the current story or specification.
    Feedback,
    /// Anything unrelated to the story.
    General,
}

impl Intent {
    /// All intents in classification order.
    pub const ALL: [Intent; 3] = [Intent::Story, Intent::Feedback, Intent::General];

    /// Wire name of the intent.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Story => "story",
            Intent::Feedback => "feedback",
            Intent::General => "general",
        }
    }

    /// Whether this intent runs the story pipeline.
    pub fn is_story_pipeline(&self) -> bool {
        matches!(self, Intent::Story | Intent::Feedback)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classifier's JSON reply, `{"intent": "..."}`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct IntentReply {
    pub intent: Intent,
}
