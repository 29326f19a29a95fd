//! Graph compilation and execution errors.

use crate::nodes::NodeError;
use thiserror::Error;

/// The graph definition is structurally invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("no entry node set")]
    MissingEntry,

    #[error("entry node `{0}` is not registered")]
    UnknownEntry(String),

    #[error("node `{0}` registered twice")]
    DuplicateNode(String),

    #[error("node `{0}` has more than one outgoing edge definition")]
    DuplicateEdge(String),

    #[error("edge from unregistered node `{0}`")]
    UnknownSource(String),

    #[error("edge from `{from}` targets unregistered node `{to}`")]
    UnknownTarget { from: String, to: String },

    #[error("label `{label}` appears twice in the table for `{node}`")]
    DuplicateLabel { node: String, label: String },

    #[error("node `{0}` has no outgoing edge")]
    MissingEdge(String),
}

/// A graph invocation failed.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node `{node}` failed: {source}")]
    Node {
        node: String,
        #[source]
        source: NodeError,
    },

    #[error("router for `{node}` returned label `{label}` with no edge")]
    UnroutedLabel { node: String, label: String },

    #[error("step limit of {limit} node executions exceeded")]
    StepLimitExceeded { limit: usize },
}

impl GraphError {
    /// The failing node's error, if a node failed.
    pub fn node_error(&self) -> Option<&NodeError> {
        match self {
            GraphError::Node { source, .. } => Some(source),
            _ => None,
        }
    }
}
