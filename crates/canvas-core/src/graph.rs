//! The assembled landscape graph.
//!
//! This is the value every exporter consumes. Node order is meaningful:
//! it is the order nodes were first seen during assembly.

use crate::edge::{Edge, EdgeLabel};
use crate::layers::GraphLayer;
use crate::node::Node;
use serde::{Deserialize, Serialize};

/// Nodes and edges of a graph, in output order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Elements {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// A labelled property graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graph {
    pub elements: Elements,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            elements: Elements { nodes, edges },
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.elements.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.elements.edges
    }

    /// Looks up a node by ID. Linear; meant for tests and one-off queries.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.elements.nodes.iter().find(|n| n.id == id)
    }

    /// Looks up an edge by ID.
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.elements.edges.iter().find(|e| e.id == id)
    }

    /// Nodes whose labels include the given layer.
    pub fn nodes_in(&self, layer: GraphLayer) -> impl Iterator<Item = &Node> {
        self.elements.nodes.iter().filter(move |n| n.is(layer))
    }

    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        let count = |layer| self.nodes_in(layer).count();
        let edges = |label| self.edges().iter().filter(|e| e.label == label).count();
        GraphStats {
            node_count: self.nodes().len(),
            edge_count: self.edges().len(),
            domains: count(GraphLayer::Domain),
            applications: count(GraphLayer::Application),
            layers: count(GraphLayer::Layer),
            sublayers: count(GraphLayer::Sublayer),
            modules: count(GraphLayer::Module),
            contains_edges: edges(EdgeLabel::Contains),
            calls_edges: edges(EdgeLabel::Calls),
        }
    }
}

/// Graph statistics for the stats command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub domains: usize,
    pub applications: usize,
    pub layers: usize,
    pub sublayers: usize,
    pub modules: usize,
    pub contains_edges: usize,
    pub calls_edges: usize,
}
