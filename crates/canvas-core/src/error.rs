//! Error types for graph assembly.
//!
//! Every failure aborts the run. The only tolerated irregularities
//! (duplicate application-group rows, malformed integration groups) are
//! skipped before they ever reach an error.

use thiserror::Error;

/// Errors raised while assembling or post-processing the landscape graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A domain, application or module name was blank.
    #[error("No {kind} name defined")]
    EmptyName { kind: &'static str },

    /// A consumer/producer row used a reference kind we do not know.
    #[error("Unknown reference kind: {0}")]
    UnknownReferenceKind(String),

    /// An edge points at a node that is not in the graph.
    #[error("Node with ID \"{id}\" not found ({context})")]
    NodeNotFound { id: String, context: String },

    /// A module ended up in more than one sublayer.
    #[error("Found {count} sublayer containment edges for module {module}, expected at most one")]
    InvalidSublayerCardinality { module: String, count: usize },

    /// A domain filter named a domain that does not exist.
    #[error("Domain with ID \"{id}\" and name \"{name}\" not found")]
    DomainNotFound { id: String, name: String },

    /// A node carries no recognised graph-layer label.
    #[error("Unknown graph layer: {0}")]
    UnknownLayer(String),

    /// A module has no ancestor at the requested containment level.
    #[error("{level} ancestor of node \"{id}\" not found")]
    MissingAncestor { id: String, level: &'static str },
}

impl GraphError {
    pub(crate) fn empty_name(kind: &'static str) -> Self {
        Self::EmptyName { kind }
    }

    /// Shorthand for a missing node with a description of where it was looked up.
    pub fn node_not_found(id: impl Into<String>, context: impl Into<String>) -> Self {
        Self::NodeNotFound {
            id: id.into(),
            context: context.into(),
        }
    }
}

/// Violations reported by `validate_graph`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("There exists more than one node with ID {0}")]
    DuplicateNodeId(String),

    #[error("There exists more than one edge with ID {0}")]
    DuplicateEdgeId(String),

    #[error("{layer} node {id} does not have a single \"{layer}\" label (has {labels} instead)")]
    InvalidLabels {
        id: String,
        layer: &'static str,
        labels: String,
    },

    #[error("Node property \"{property}\" is undefined for node \"{id}\"")]
    MissingPropagatedProperty { id: String, property: &'static str },

    #[error("Source node with ID {node} of edge {edge} does not exist")]
    DanglingSource { edge: String, node: String },

    #[error("Target node with ID {node} of edge {edge} does not exist")]
    DanglingTarget { edge: String, node: String },

    #[error("Dependency edge {0} has no dependency types")]
    MissingDependencyTypes(String),

    #[error("Target node {target} has at least two incoming containment edges: {first} and {second}")]
    MultipleParents {
        target: String,
        first: String,
        second: String,
    },

    #[error("Containment edge {edge} links a {source_layer} node to a {target_layer} node")]
    CrossLayerContainment {
        edge: String,
        source_layer: &'static str,
        target_layer: &'static str,
    },
}

/// Result type for graph assembly.
pub type Result<T> = std::result::Result<T, GraphError>;
