//! Assembly of the story graph.
//!
//! ```text
//! intent --spec----> spec --> generate --> judge --ok/give_up--> end
//!        --general-> general --> end        |
//!                     ^----------fix--------'
//! ```

use std::sync::Arc;

use crate::config::StoryConfig;
use crate::graph::{CompileError, CompiledGraph, GraphBuilder, Target};
use crate::llm::TextGenerator;
use crate::nodes::{GeneralNode, GenerateNode, IntentNode, JudgeNode, SpecNode, StoryNode};
use crate::routing::{capped_judge_router, route_after_intent, IntentRoute, JudgeRoute, StoryRoute};
use crate::state::StoryState;

/// The compiled story graph.
pub type StoryGraph = CompiledGraph<StoryState, StoryNode, StoryRoute>;

/// Wire the five nodes around `generator`.
///
/// `config.max_revisions` caps the judge loop; unset leaves it uncapped.
pub fn build_story_graph(
    generator: Arc<dyn TextGenerator>,
    config: &StoryConfig,
) -> Result<StoryGraph, CompileError> {
    let judge_router = capped_judge_router(config.max_revisions);

    let mut builder: GraphBuilder<StoryState, StoryNode, StoryRoute> = GraphBuilder::new();
    builder
        .add_node(StoryNode::Intent, IntentNode::new(generator.clone()))
        .add_node(StoryNode::Spec, SpecNode::new(generator.clone()))
        .add_node(StoryNode::Generate, GenerateNode::new(generator.clone()))
        .add_node(StoryNode::Judge, JudgeNode::new(generator.clone()))
        .add_node(StoryNode::General, GeneralNode::new(generator))
        .set_entry(StoryNode::Intent)
        .add_conditional_edges(
            StoryNode::Intent,
            |state: &StoryState| StoryRoute::from(route_after_intent(state)),
            [
                (IntentRoute::Spec.into(), Target::Node(StoryNode::Spec)),
                (IntentRoute::General.into(), Target::Node(StoryNode::General)),
            ],
        )
        .add_edge(StoryNode::Spec, Target::Node(StoryNode::Generate))
        .add_edge(StoryNode::Generate, Target::Node(StoryNode::Judge))
        .add_conditional_edges(
            StoryNode::Judge,
            move |state: &StoryState| StoryRoute::from(judge_router(state)),
            [
                (JudgeRoute::Ok.into(), Target::End),
                (JudgeRoute::Fix.into(), Target::Node(StoryNode::Spec)),
                (JudgeRoute::GiveUp.into(), Target::End),
            ],
        )
        .add_edge(StoryNode::General, Target::End);

    builder.compile()
}
