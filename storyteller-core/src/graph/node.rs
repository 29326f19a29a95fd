//! Graph node trait.

use async_trait::async_trait;

use super::GraphState;
use crate::nodes::NodeError;

/// One processing step: read the state, return a partial update.
///
/// Nodes get a shared borrow of the state and cannot mutate it; the graph
/// merges the returned update before evaluating the outgoing edge.
#[async_trait]
pub trait Node<S: GraphState>: Send + Sync {
    async fn run(&self, state: &S) -> Result<S::Update, NodeError>;
}

/// Adapter turning a synchronous closure into a [`Node`].
pub struct FnNode<F>(pub F);

#[async_trait]
impl<S, F> Node<S> for FnNode<F>
where
    S: GraphState,
    F: Fn(&S) -> Result<S::Update, NodeError> + Send + Sync,
{
    async fn run(&self, state: &S) -> Result<S::Update, NodeError> {
        (self.0)(state)
    }
}
