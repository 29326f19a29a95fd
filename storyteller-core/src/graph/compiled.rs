//! Compiled graph: immutable, supports invoke only.

use std::collections::HashMap;

use tracing::Instrument;
use uuid::Uuid;

use super::error::GraphError;
use super::node::Node;
use super::{Edge, GraphKey, GraphState, Target};

/// Result of one invocation.
#[derive(Debug, Clone)]
pub struct Run<S, N> {
    /// State after the last node's update was merged.
    pub state: S,
    /// Node ids in execution order, including re-entries.
    pub path: Vec<N>,
}

impl<S, N: PartialEq> Run<S, N> {
    /// How many times `node` executed.
    pub fn visits(&self, node: N) -> usize {
        self.path.iter().filter(|n| **n == node).count()
    }
}

/// Validated, executable graph.
///
/// Execution starts at the entry node. After each node the update is
/// merged, then the node's edge is resolved once against the merged state.
/// Cycles are allowed; [`with_max_steps`](Self::with_max_steps) bounds them.
pub struct CompiledGraph<S: GraphState, N, L> {
    nodes: HashMap<N, Box<dyn Node<S>>>,
    edges: HashMap<N, Edge<S, N, L>>,
    entry: N,
    max_steps: Option<usize>,
}

impl<S: GraphState, N: GraphKey, L: GraphKey> CompiledGraph<S, N, L> {
    pub(super) fn new(
        nodes: HashMap<N, Box<dyn Node<S>>>,
        edges: HashMap<N, Edge<S, N, L>>,
        entry: N,
    ) -> Self {
        Self {
            nodes,
            edges,
            entry,
            max_steps: None,
        }
    }

    /// Fail an invocation once it has executed `limit` nodes.
    pub fn with_max_steps(mut self, limit: usize) -> Self {
        self.max_steps = Some(limit);
        self
    }

    /// The entry node.
    pub fn entry(&self) -> N {
        self.entry
    }

    /// Registered node ids, in no particular order.
    pub fn node_ids(&self) -> impl Iterator<Item = N> + '_ {
        self.nodes.keys().copied()
    }

    /// Run the graph from the entry node until an edge resolves to the end.
    pub async fn invoke(&self, state: S) -> Result<Run<S, N>, GraphError> {
        let run_id = Uuid::new_v4();
        self.run(state)
            .instrument(tracing::info_span!("graph_run", %run_id))
            .await
    }

    async fn run(&self, mut state: S) -> Result<Run<S, N>, GraphError> {
        let mut current = self.entry;
        let mut path = Vec::new();

        loop {
            if let Some(limit) = self.max_steps {
                if path.len() >= limit {
                    tracing::warn!(limit, "step limit reached");
                    return Err(GraphError::StepLimitExceeded { limit });
                }
            }

            // Compilation guarantees every reachable id has a node and an edge.
            let (Some(node), Some(edge)) = (self.nodes.get(&current), self.edges.get(&current))
            else {
                unreachable!("compiled graph is missing node `{current}`");
            };

            path.push(current);
            let update = node
                .run(&state)
                .instrument(tracing::debug_span!("node", node = %current))
                .await
                .map_err(|source| GraphError::Node {
                    node: current.to_string(),
                    source,
                })?;
            state.merge(update);

            let next = match edge {
                Edge::Fixed(target) => *target,
                Edge::Conditional { router, table } => {
                    let label = router(&state);
                    table
                        .iter()
                        .find(|(l, _)| *l == label)
                        .map(|(_, target)| *target)
                        .ok_or_else(|| GraphError::UnroutedLabel {
                            node: current.to_string(),
                            label: label.to_string(),
                        })?
                }
            };
            tracing::debug!(from = %current, to = %next, "edge resolved");

            match next {
                Target::End => {
                    tracing::info!(steps = path.len(), "graph run finished");
                    return Ok(Run { state, path });
                }
                Target::Node(id) => current = id,
            }
        }
    }
}
