//! Cohesion of structural nodes.

use crate::index::GraphIndex;
use canvas_core::{Edge, GraphLayer, Node};
use std::collections::HashSet;

/// Cohesion of a subtree with `internal_calls` calls among `modules` modules.
///
/// A subtree without modules has cohesion 0.
pub fn cohesion(internal_calls: usize, modules: usize) -> f64 {
    if modules == 0 {
        return 0.0;
    }
    internal_calls as f64 / (modules as f64).powf(1.5)
}

/// Sets the cohesion of every non-module node from the `calls` edges
/// among the modules below it.
pub fn find_cohesion(nodes: &mut [Node], edges: &[Edge]) {
    let values: Vec<(usize, f64)> = {
        let index = GraphIndex::new(nodes, edges);
        nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is(GraphLayer::Module))
            .map(|(i, n)| {
                let modules: HashSet<&str> = index
                    .leaves(&n.id)
                    .into_iter()
                    .filter(|leaf| leaf.is(GraphLayer::Module))
                    .map(|leaf| leaf.id.as_str())
                    .collect();
                (i, cohesion(index.calls_within(&modules), modules.len()))
            })
            .collect()
    };

    for (i, value) in values {
        nodes[i].properties.cohesion = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_core::DependencyType;

    #[test]
    fn test_formula() {
        assert_eq!(cohesion(0, 0), 0.0);
        assert_eq!(cohesion(4, 4), 0.5);
        assert!((cohesion(1, 2) - 1.0 / 8f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_find_cohesion() {
        let mut nodes = vec![
            Node::domain("Empty").unwrap(),
            Node::domain("Sales").unwrap(),
            Node::application("CRM").unwrap(),
            Node::module("CRM", "a").unwrap(),
            Node::module("CRM", "b").unwrap(),
            Node::module("Shop", "c").unwrap(),
        ];
        let call = |s: &str, t: &str| {
            Edge::calls(s, t, "Action", "Run", DependencyType::CompileTime, None)
        };
        let edges = vec![
            Edge::contains("D_Sales", "A_CRM"),
            Edge::contains("A_CRM", "A_CRM__M_a"),
            Edge::contains("A_CRM", "A_CRM__M_b"),
            call("A_CRM__M_a", "A_CRM__M_b"),
            call("A_CRM__M_b", "A_CRM__M_b"),
            call("A_CRM__M_a", "A_Shop__M_c"),
        ];
        find_cohesion(&mut nodes, &edges);

        let value = |id: &str| nodes.iter().find(|n| n.id == id).unwrap().properties.cohesion;
        assert_eq!(value("D_Empty"), 0.0);
        assert!(!value("D_Empty").is_nan());
        assert!((value("A_CRM") - 2.0 / 8f64.sqrt()).abs() < 1e-12);
        assert_eq!(value("D_Sales"), value("A_CRM"));
        assert_eq!(value("A_CRM__M_a"), 0.0);
    }
}
