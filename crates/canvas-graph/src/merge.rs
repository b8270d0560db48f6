//! Combines the output of independent parsers.

use crate::builder::GraphParts;
use std::collections::HashSet;

/// Concatenates parser outputs in order and drops repeated IDs from each
/// collection. The first occurrence wins, so earlier parsers take
/// precedence for node properties.
pub fn merge_parts(parts: impl IntoIterator<Item = GraphParts>) -> GraphParts {
    let mut merged = GraphParts::default();
    for part in parts {
        merged.nodes.extend(part.nodes);
        merged.contain_edges.extend(part.contain_edges);
        merged.dependency_edges.extend(part.dependency_edges);
    }

    let mut seen = HashSet::new();
    merged.nodes.retain(|n| seen.insert(n.id.clone()));
    seen.clear();
    merged.contain_edges.retain(|e| seen.insert(e.id.clone()));
    seen.clear();
    merged.dependency_edges.retain(|e| seen.insert(e.id.clone()));

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_core::{DependencyType, Edge, Node};

    #[test]
    fn test_first_occurrence_wins() {
        let mut details = Node::module("CRM", "CRM_API").unwrap();
        details.properties.details.nr_screens = Some(4);

        let first = GraphParts {
            nodes: vec![details, Node::application("CRM").unwrap()],
            contain_edges: vec![Edge::contains("A_CRM", "A_CRM__M_CRM_API")],
            dependency_edges: Vec::new(),
        };
        let second = GraphParts {
            nodes: vec![
                Node::application("CRM").unwrap(),
                Node::module("CRM", "CRM_API").unwrap(),
                Node::module("CRM", "CRM_Web").unwrap(),
            ],
            contain_edges: vec![Edge::contains("A_CRM", "A_CRM__M_CRM_API")],
            dependency_edges: vec![Edge::calls(
                "A_CRM__M_CRM_Web",
                "A_CRM__M_CRM_API",
                "Action",
                "Save",
                DependencyType::CompileTime,
                None,
            )],
        };

        let merged = merge_parts([first, second]);
        let ids: Vec<&str> = merged.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A_CRM__M_CRM_API", "A_CRM", "A_CRM__M_CRM_Web"]);
        assert_eq!(merged.nodes[0].properties.details.nr_screens, Some(4));
        assert_eq!(merged.contain_edges.len(), 1);
        assert_eq!(merged.dependency_edges.len(), 1);
    }
}
