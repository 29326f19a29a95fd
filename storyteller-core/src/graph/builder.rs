//! Graph builder: register nodes and edges, then compile.

use std::collections::{HashMap, HashSet};

use super::compiled::CompiledGraph;
use super::error::CompileError;
use super::node::Node;
use super::{Edge, GraphKey, GraphState, Target};

/// Mutable graph definition.
///
/// Generic over the state `S`, the node-id type `N` and the edge-label type
/// `L` used by conditional edges. Problems such as duplicate registrations
/// are recorded as they happen and reported by [`compile`](Self::compile).
pub struct GraphBuilder<S: GraphState, N, L> {
    nodes: HashMap<N, Box<dyn Node<S>>>,
    edges: HashMap<N, Edge<S, N, L>>,
    entry: Option<N>,
    problems: Vec<CompileError>,
}

impl<S: GraphState, N: GraphKey, L: GraphKey> Default for GraphBuilder<S, N, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GraphState, N: GraphKey, L: GraphKey> GraphBuilder<S, N, L> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            entry: None,
            problems: Vec::new(),
        }
    }

    /// Registers a node handler under `id`.
    pub fn add_node(&mut self, id: N, node: impl Node<S> + 'static) -> &mut Self {
        if self.nodes.insert(id, Box::new(node)).is_some() {
            self.problems.push(CompileError::DuplicateNode(id.to_string()));
        }
        self
    }

    /// Sets the node every invocation starts at.
    pub fn set_entry(&mut self, id: N) -> &mut Self {
        self.entry = Some(id);
        self
    }

    /// Adds an unconditional edge.
    pub fn add_edge(&mut self, from: N, to: Target<N>) -> &mut Self {
        self.insert_edge(from, Edge::Fixed(to));
        self
    }

    /// Adds a conditional edge: after `from` runs, `router` picks a label
    /// from the merged state and `table` maps that label to the successor.
    pub fn add_conditional_edges<F>(
        &mut self,
        from: N,
        router: F,
        table: impl IntoIterator<Item = (L, Target<N>)>,
    ) -> &mut Self
    where
        F: Fn(&S) -> L + Send + Sync + 'static,
    {
        let table: Vec<(L, Target<N>)> = table.into_iter().collect();
        let mut seen = HashSet::new();
        for (label, _) in &table {
            if !seen.insert(*label) {
                self.problems.push(CompileError::DuplicateLabel {
                    node: from.to_string(),
                    label: label.to_string(),
                });
            }
        }
        self.insert_edge(
            from,
            Edge::Conditional {
                router: Box::new(router),
                table,
            },
        );
        self
    }

    fn insert_edge(&mut self, from: N, edge: Edge<S, N, L>) {
        if self.edges.insert(from, edge).is_some() {
            self.problems.push(CompileError::DuplicateEdge(from.to_string()));
        }
    }

    /// Validates the definition and produces an executable graph.
    ///
    /// Returns the first problem found: recorded registration problems, a
    /// missing or unknown entry, edges touching unregistered nodes, or a
    /// registered node with no outgoing edge.
    pub fn compile(mut self) -> Result<CompiledGraph<S, N, L>, CompileError> {
        if !self.problems.is_empty() {
            return Err(self.problems.remove(0));
        }

        let entry = self.entry.ok_or(CompileError::MissingEntry)?;
        if !self.nodes.contains_key(&entry) {
            return Err(CompileError::UnknownEntry(entry.to_string()));
        }

        for (from, edge) in &self.edges {
            if !self.nodes.contains_key(from) {
                return Err(CompileError::UnknownSource(from.to_string()));
            }
            for target in edge.targets() {
                if let Target::Node(to) = target {
                    if !self.nodes.contains_key(&to) {
                        return Err(CompileError::UnknownTarget {
                            from: from.to_string(),
                            to: to.to_string(),
                        });
                    }
                }
            }
        }

        if let Some(id) = self.nodes.keys().find(|id| !self.edges.contains_key(id)) {
            return Err(CompileError::MissingEdge(id.to_string()));
        }

        Ok(CompiledGraph::new(self.nodes, self.edges, entry))
    }
}
