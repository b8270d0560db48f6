//! Structural checks on a finished graph.
//!
//! Validation stops at the first violation. It never changes the graph.

use canvas_core::{Edge, Graph, GraphLayer, Node, ValidationError};
use std::collections::{HashMap, HashSet};

/// Containment pairs a `contains` edge may link, as (source, target).
const ALLOWED_CONTAINMENT: [(GraphLayer, GraphLayer); 5] = [
    (GraphLayer::Domain, GraphLayer::Application),
    (GraphLayer::Application, GraphLayer::Layer),
    (GraphLayer::Application, GraphLayer::Sublayer),
    (GraphLayer::Layer, GraphLayer::Sublayer),
    (GraphLayer::Sublayer, GraphLayer::Module),
];

/// Checks node and edge invariants of an assembled graph.
///
/// With `expect_propagated_properties` every node must also carry all six
/// module-detail metrics, which holds once details were propagated.
pub fn validate_graph(
    graph: &Graph,
    expect_propagated_properties: bool,
) -> Result<(), ValidationError> {
    let nodes = validate_nodes(graph.nodes(), expect_propagated_properties)?;
    validate_edges(graph.edges(), &nodes)
}

fn validate_nodes(
    nodes: &[Node],
    expect_propagated_properties: bool,
) -> Result<HashMap<&str, &Node>, ValidationError> {
    let mut by_id = HashMap::with_capacity(nodes.len());
    for node in nodes {
        if by_id.insert(node.id.as_str(), node).is_some() {
            return Err(ValidationError::DuplicateNodeId(node.id.clone()));
        }

        if let Some(layer) = layer_from_id(&node.id) {
            if node.labels.len() != 1 || node.labels[0] != layer.as_str() {
                return Err(ValidationError::InvalidLabels {
                    id: node.id.clone(),
                    layer: layer.as_str(),
                    labels: node.labels.join(";"),
                });
            }
        }

        if expect_propagated_properties {
            if let Some(property) = node.properties.details.first_missing() {
                return Err(ValidationError::MissingPropagatedProperty {
                    id: node.id.clone(),
                    property,
                });
            }
        }
    }
    Ok(by_id)
}

/// Graph layer implied by an ID prefix. Layer and sublayer IDs also start
/// with `A_`, so only applications without a `__` and modules with `__M_`
/// are recognised.
fn layer_from_id(id: &str) -> Option<GraphLayer> {
    if id.starts_with("D_") {
        Some(GraphLayer::Domain)
    } else if id.starts_with("A_") && !id.contains("__") {
        Some(GraphLayer::Application)
    } else if id.starts_with("A_") && id.contains("__M_") {
        Some(GraphLayer::Module)
    } else {
        None
    }
}

fn validate_edges(edges: &[Edge], nodes: &HashMap<&str, &Node>) -> Result<(), ValidationError> {
    let mut ids = HashSet::with_capacity(edges.len());
    let mut parent_edge: HashMap<&str, &str> = HashMap::new();

    for edge in edges {
        if !ids.insert(edge.id.as_str()) {
            return Err(ValidationError::DuplicateEdgeId(edge.id.clone()));
        }
        let Some(source) = nodes.get(edge.source.as_str()) else {
            return Err(ValidationError::DanglingSource {
                edge: edge.id.clone(),
                node: edge.source.clone(),
            });
        };
        let Some(target) = nodes.get(edge.target.as_str()) else {
            return Err(ValidationError::DanglingTarget {
                edge: edge.id.clone(),
                node: edge.target.clone(),
            });
        };

        if !edge.is_contains() {
            if edge.properties.dependency_types.is_empty() {
                return Err(ValidationError::MissingDependencyTypes(edge.id.clone()));
            }
            continue;
        }

        if let Some(first) = parent_edge.insert(edge.target.as_str(), edge.id.as_str()) {
            return Err(ValidationError::MultipleParents {
                target: edge.target.clone(),
                first: first.to_string(),
                second: edge.id.clone(),
            });
        }

        let pair = (source.layer(), target.layer());
        let allowed = ALLOWED_CONTAINMENT
            .iter()
            .any(|&(s, t)| pair == (Some(s), Some(t)));
        if !allowed {
            let name = |layer: Option<GraphLayer>| layer.map_or("unknown", |l| l.as_str());
            return Err(ValidationError::CrossLayerContainment {
                edge: edge.id.clone(),
                source_layer: name(pair.0),
                target_layer: name(pair.1),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_core::{DependencyType, ModuleDetails, NodeProperties};

    fn sublayer() -> Node {
        Node::new(
            "A_CRM__Core__API",
            vec!["Sublayer".to_string(), "Sublayer_API".to_string()],
            NodeProperties::named("CRM API", "API"),
        )
    }

    fn valid() -> Graph {
        Graph::new(
            vec![
                Node::domain("Sales").unwrap(),
                Node::application("CRM").unwrap(),
                sublayer(),
                Node::module("CRM", "CRM_API").unwrap(),
            ],
            vec![
                Edge::contains("D_Sales", "A_CRM"),
                Edge::contains("A_CRM", "A_CRM__Core__API"),
                Edge::contains("A_CRM__Core__API", "A_CRM__M_CRM_API"),
                Edge::calls(
                    "A_CRM__M_CRM_API",
                    "A_CRM__M_CRM_API",
                    "Action",
                    "Save",
                    DependencyType::CompileTime,
                    None,
                ),
            ],
        )
    }

    #[test]
    fn test_valid_graph() {
        assert_eq!(validate_graph(&valid(), false), Ok(()));
    }

    #[test]
    fn test_duplicate_node() {
        let mut graph = valid();
        graph.elements.nodes.push(Node::application("CRM").unwrap());
        assert_eq!(
            validate_graph(&graph, false),
            Err(ValidationError::DuplicateNodeId("A_CRM".to_string()))
        );
    }

    #[test]
    fn test_labels_must_match_prefix() {
        let mut graph = valid();
        graph.elements.nodes[1].labels.push("Extra".to_string());
        assert!(matches!(
            validate_graph(&graph, false),
            Err(ValidationError::InvalidLabels { layer: "Application", .. })
        ));
    }

    #[test]
    fn test_missing_propagated_property() {
        let mut graph = valid();
        for node in &mut graph.elements.nodes {
            node.properties.details = ModuleDetails::zero();
        }
        assert_eq!(validate_graph(&graph, true), Ok(()));

        graph.elements.nodes[2].properties.details.nr_entities = None;
        assert_eq!(
            validate_graph(&graph, true),
            Err(ValidationError::MissingPropagatedProperty {
                id: "A_CRM__Core__API".to_string(),
                property: "nrEntities",
            })
        );
    }

    #[test]
    fn test_dangling_endpoints() {
        let mut graph = valid();
        graph.elements.edges.push(Edge::contains("A_CRM", "A_Gone"));
        assert!(matches!(
            validate_graph(&graph, false),
            Err(ValidationError::DanglingTarget { ref node, .. }) if node == "A_Gone"
        ));

        let mut graph = valid();
        graph.elements.edges.push(Edge::contains("D_Gone", "A_CRM"));
        assert!(matches!(
            validate_graph(&graph, false),
            Err(ValidationError::DanglingSource { ref node, .. }) if node == "D_Gone"
        ));
    }

    #[test]
    fn test_dependency_types_required() {
        let mut graph = valid();
        graph.elements.edges[3].properties.dependency_types.clear();
        assert!(matches!(
            validate_graph(&graph, false),
            Err(ValidationError::MissingDependencyTypes(_))
        ));
    }

    #[test]
    fn test_single_parent() {
        let mut graph = valid();
        graph.elements.nodes.push(Node::domain("Ops").unwrap());
        graph.elements.edges.push(Edge::contains("D_Ops", "A_CRM"));
        assert_eq!(
            validate_graph(&graph, false),
            Err(ValidationError::MultipleParents {
                target: "A_CRM".to_string(),
                first: "D_Sales__A_CRM".to_string(),
                second: "D_Ops__A_CRM".to_string(),
            })
        );
    }

    #[test]
    fn test_cross_layer_containment() {
        let mut graph = valid();
        graph.elements.edges[2] = Edge::contains("A_CRM", "A_CRM__M_CRM_API");
        assert_eq!(
            validate_graph(&graph, false),
            Err(ValidationError::CrossLayerContainment {
                edge: "A_CRM__A_CRM__M_CRM_API".to_string(),
                source_layer: "Application",
                target_layer: "Module",
            })
        );
    }
}
