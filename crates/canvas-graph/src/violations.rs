//! Architecture Canvas rules as a graph.
//!
//! Lower layers may not depend on higher ones. Every forbidden sublayer
//! pair gets a `violates` edge so a graph database can match real
//! dependencies against them.

use canvas_core::{
    DependencyProfileCategory, Edge, EdgeLabel, Graph, ModuleLayer, Node, NodeProperties, Sublayer,
};

fn sublayer_node_id(sublayer: Sublayer) -> String {
    format!("Sublayer_{}", sublayer)
}

fn sublayer_nodes(layer: ModuleLayer) -> impl Iterator<Item = Node> {
    layer.sublayers().iter().map(move |&sublayer| {
        let id = sublayer_node_id(sublayer);
        let mut properties = NodeProperties::named(id.clone(), id.clone());
        properties.color = layer.color().to_string();
        properties.dependency_profile_category = DependencyProfileCategory::None;
        Node::new(id.clone(), vec![id], properties)
    })
}

fn violation_edges(from: ModuleLayer, to: ModuleLayer) -> impl Iterator<Item = Edge> {
    from.sublayers().iter().flat_map(move |&source| {
        to.sublayers().iter().map(move |&target| {
            let source = sublayer_node_id(source);
            let target = sublayer_node_id(target);
            Edge::new(
                format!("{}-{}", source, target),
                source,
                target,
                EdgeLabel::Violates,
            )
        })
    })
}

/// Builds the reference graph of forbidden sublayer dependencies.
pub fn violations_graph() -> Graph {
    let nodes = ModuleLayer::ALL.into_iter().flat_map(sublayer_nodes).collect();
    let edges = violation_edges(ModuleLayer::Core, ModuleLayer::EndUser)
        .chain(violation_edges(ModuleLayer::Foundation, ModuleLayer::EndUser))
        .chain(violation_edges(ModuleLayer::Foundation, ModuleLayer::Core))
        .collect();
    Graph::new(nodes, edges)
}
