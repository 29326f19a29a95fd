//! Conditional routers of the story graph.
//!
//! Routers are pure functions of the post-merge state returning a typed
//! label; the graph maps labels to successors.

use std::fmt;

use crate::intent::Intent;
use crate::state::StoryState;

/// Where to go after intent classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentRoute {
    Spec,
    General,
}

/// Where to go after the judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JudgeRoute {
    /// Approved; finish the turn.
    Ok,
    /// Rejected; revise the specification.
    Fix,
    /// Rejected with the revision cap reached; finish with the rejection.
    GiveUp,
}

/// Edge label type shared by both conditional edges of the story graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoryRoute {
    Intent(IntentRoute),
    Judge(JudgeRoute),
}

impl From<IntentRoute> for StoryRoute {
    fn from(route: IntentRoute) -> Self {
        StoryRoute::Intent(route)
    }
}

impl From<JudgeRoute> for StoryRoute {
    fn from(route: JudgeRoute) -> Self {
        StoryRoute::Judge(route)
    }
}

impl fmt::Display for IntentRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IntentRoute::Spec => "spec",
            IntentRoute::General => "general",
        })
    }
}

impl fmt::Display for JudgeRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JudgeRoute::Ok => "ok",
            JudgeRoute::Fix => "fix",
            JudgeRoute::GiveUp => "give_up",
        })
    }
}

impl fmt::Display for StoryRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryRoute::Intent(route) => write!(f, "intent:{route}"),
            StoryRoute::Judge(route) => write!(f, "judge:{route}"),
        }
    }
}

/// Story and feedback go to the spec builder, general chat to the general
/// responder. A missing intent is treated as a story request.
pub fn route_after_intent(state: &StoryState) -> IntentRoute {
    match state.intent {
        Some(Intent::General) => IntentRoute::General,
        Some(Intent::Story) | Some(Intent::Feedback) => IntentRoute::Spec,
        None => {
            tracing::debug!("no intent in state, routing as story");
            IntentRoute::Spec
        }
    }
}

/// Only an explicit `false` verdict sends the story back for revision.
pub fn route_after_judge(state: &StoryState) -> JudgeRoute {
    match state.judge_evaluation {
        Some(false) => JudgeRoute::Fix,
        Some(true) | None => JudgeRoute::Ok,
    }
}

/// Judge router that gives up once more than `max_revisions` rejections
/// happened in this turn. `None` never gives up.
pub fn capped_judge_router(
    max_revisions: Option<u32>,
) -> impl Fn(&StoryState) -> JudgeRoute + Send + Sync + 'static {
    move |state| match (route_after_judge(state), max_revisions) {
        (JudgeRoute::Fix, Some(max)) if state.revisions > max => {
            tracing::warn!(revisions = state.revisions, max, "revision cap reached");
            JudgeRoute::GiveUp
        }
        (route, _) => route,
    }
}
