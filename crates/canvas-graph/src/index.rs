//! Read-only traversal index over a finished graph.
//!
//! Wraps petgraph so the containment and dependency walks of the metrics
//! passes don't rescan the edge list for every node. Edges whose endpoints
//! are missing are left out; validation reports those separately.

use canvas_core::{Edge, EdgeLabel, Node};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// Containment and dependency lookups by node ID.
pub struct GraphIndex<'g> {
    graph: DiGraph<&'g Node, EdgeLabel>,

    /// Maps node IDs to graph indexes. The first node with an ID wins.
    id_index: HashMap<&'g str, NodeIndex>,
}

impl<'g> GraphIndex<'g> {
    pub fn new(nodes: &'g [Node], edges: &'g [Edge]) -> Self {
        let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());
        let mut id_index = HashMap::with_capacity(nodes.len());

        for node in nodes {
            let index = graph.add_node(node);
            id_index.entry(node.id.as_str()).or_insert(index);
        }
        for edge in edges {
            let source = id_index.get(edge.source.as_str());
            let target = id_index.get(edge.target.as_str());
            if let (Some(&source), Some(&target)) = (source, target) {
                graph.add_edge(source, target, edge.label);
            }
        }

        Self { graph, id_index }
    }

    /// Gets a node by its ID.
    pub fn get(&self, id: &str) -> Option<&'g Node> {
        self.id_index.get(id).map(|&i| self.graph[i])
    }

    /// Neighbours over edges with the given label, in edge insertion order.
    fn neighbors(&self, id: &str, label: EdgeLabel, direction: Direction) -> Vec<NodeIndex> {
        let Some(&index) = self.id_index.get(id) else {
            return Vec::new();
        };
        let mut found: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(index, direction)
            .filter(|e| *e.weight() == label)
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (e.id(), other)
            })
            .collect();
        // petgraph walks adjacency lists newest first.
        found.sort_by_key(|(edge, _)| *edge);
        found.into_iter().map(|(_, node)| node).collect()
    }

    /// Nodes directly contained by the given node.
    pub fn children(&self, id: &str) -> Vec<&'g Node> {
        self.neighbors(id, EdgeLabel::Contains, Direction::Outgoing)
            .into_iter()
            .map(|i| self.graph[i])
            .collect()
    }

    /// Source of the first containment edge pointing at the given node.
    pub fn parent(&self, id: &str) -> Option<&'g Node> {
        self.neighbors(id, EdgeLabel::Contains, Direction::Incoming)
            .first()
            .map(|&i| self.graph[i])
    }

    /// The node itself followed by its containment ancestors, nearest first.
    pub fn ancestors(&self, id: &str) -> Vec<&'g Node> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.get(id);
        while let Some(node) = current {
            if !seen.insert(node.id.as_str()) {
                break;
            }
            chain.push(node);
            current = self.parent(&node.id);
        }
        chain
    }

    /// All containment leaves below the given node, depth first. A node
    /// without children is its own leaf.
    pub fn leaves(&self, id: &str) -> Vec<&'g Node> {
        let Some(&root) = self.id_index.get(id) else {
            return Vec::new();
        };
        let mut leaves = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let node = self.graph[current];
            let children = self.neighbors(&node.id, EdgeLabel::Contains, Direction::Outgoing);
            if children.is_empty() {
                leaves.push(node);
            } else {
                stack.extend(children.into_iter().rev());
            }
        }

        leaves
    }

    /// Modules calling the given node, self-calls excluded.
    pub fn callers(&self, id: &str) -> Vec<&'g Node> {
        self.neighbors(id, EdgeLabel::Calls, Direction::Incoming)
            .into_iter()
            .map(|i| self.graph[i])
            .filter(|n| n.id != id)
            .collect()
    }

    /// Modules the given node calls, self-calls excluded.
    pub fn callees(&self, id: &str) -> Vec<&'g Node> {
        self.neighbors(id, EdgeLabel::Calls, Direction::Outgoing)
            .into_iter()
            .map(|i| self.graph[i])
            .filter(|n| n.id != id)
            .collect()
    }

    /// Number of `calls` edges with both endpoints in the given set,
    /// self-calls included.
    pub fn calls_within(&self, ids: &HashSet<&str>) -> usize {
        self.graph
            .edge_references()
            .filter(|e| *e.weight() == EdgeLabel::Calls)
            .filter(|e| {
                ids.contains(self.graph[e.source()].id.as_str())
                    && ids.contains(self.graph[e.target()].id.as_str())
            })
            .count()
    }
}
