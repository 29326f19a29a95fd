//! State-machine graph engine.
//!
//! A graph is a set of nodes keyed by an enumerated id, one entry node, and
//! exactly one outgoing edge definition per node. An edge is either a fixed
//! successor or a router that inspects the post-merge state and returns a
//! typed label, resolved through that node's label table.
//!
//! Build with [`GraphBuilder`], validate with [`GraphBuilder::compile`], then
//! run with [`CompiledGraph::invoke`].

mod builder;
mod compiled;
mod error;
mod node;

pub use builder::GraphBuilder;
pub use compiled::{CompiledGraph, Run};
pub use error::{CompileError, GraphError};
pub use node::{FnNode, Node};

use std::fmt;
use std::hash::Hash;

/// State that can absorb a node's partial update.
pub trait GraphState: Send + Sync + 'static {
    /// Partial record returned by nodes.
    type Update: Send + 'static;

    /// Overwrite every field present in `update`; leave the rest untouched.
    fn merge(&mut self, update: Self::Update);
}

/// Requirements for node ids and edge labels.
pub trait GraphKey: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

impl<T> GraphKey for T where T: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

/// Where an edge leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target<N> {
    /// Run this node next.
    Node(N),
    /// Stop and return the current state.
    End,
}

impl<N: fmt::Display> fmt::Display for Target<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Node(node) => node.fmt(f),
            Target::End => f.write_str("end"),
        }
    }
}

/// Decision function for a conditional edge.
pub type Router<S, L> = Box<dyn Fn(&S) -> L + Send + Sync>;

pub(crate) enum Edge<S, N, L> {
    Fixed(Target<N>),
    Conditional {
        router: Router<S, L>,
        table: Vec<(L, Target<N>)>,
    },
}

impl<S, N: Copy, L> Edge<S, N, L> {
    pub(crate) fn targets(&self) -> Vec<Target<N>> {
        match self {
            Edge::Fixed(target) => vec![*target],
            Edge::Conditional { table, .. } => table.iter().map(|(_, t)| *t).collect(),
        }
    }
}
