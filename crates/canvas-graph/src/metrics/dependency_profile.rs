//! Module dependency profiles.
//!
//! Classifies each module by whether it talks across its application
//! boundary, after Bouwers, van Deursen and Visser, "Dependency profiles
//! for software architecture evaluations" (ICSM 2011).

use crate::index::GraphIndex;
use canvas_core::{
    DependencyProfileCategory, Edge, GraphError, GraphLayer, Node, Result,
    UNCLASSIFIED_DOMAIN_NAME,
};
use std::collections::HashMap;

/// Containment level that defines a module's boundary.
const CONTAINMENT_LEVEL: GraphLayer = GraphLayer::Application;

/// Dependency profile calculator with a per-node ancestor cache.
pub struct DependencyProfiles<'g> {
    index: &'g GraphIndex<'g>,
    ancestors_cache: HashMap<&'g str, Vec<&'g Node>>,
}

impl<'g> DependencyProfiles<'g> {
    pub fn new(index: &'g GraphIndex<'g>) -> Self {
        Self {
            index,
            ancestors_cache: HashMap::new(),
        }
    }

    fn ancestors(&mut self, node: &'g Node) -> &[&'g Node] {
        let index = self.index;
        self.ancestors_cache
            .entry(node.id.as_str())
            .or_insert_with(|| index.ancestors(&node.id))
    }

    /// Nearest ancestor (or the node itself) in the given layer.
    fn containment_level_node(&mut self, node: &'g Node, level: GraphLayer) -> Result<&'g Node> {
        self.ancestors(node)
            .iter()
            .find(|n| n.is(level))
            .copied()
            .ok_or_else(|| GraphError::MissingAncestor {
                id: node.id.clone(),
                level: level.as_str(),
            })
    }

    /// Whether `neighbor` sits in another application of a classified domain.
    fn is_external(&mut self, neighbor: &'g Node, container: &Node) -> Result<bool> {
        let neighbor_container = self.containment_level_node(neighbor, CONTAINMENT_LEVEL)?;
        let domain = self.containment_level_node(neighbor, GraphLayer::Domain)?;
        Ok(domain.properties.simple_name != UNCLASSIFIED_DOMAIN_NAME
            && neighbor_container.id != container.id)
    }

    /// Computes the category of one module.
    pub fn classify(&mut self, module: &'g Node) -> Result<DependencyProfileCategory> {
        let container = self.containment_level_node(module, CONTAINMENT_LEVEL)?;

        let mut external_incoming = false;
        for caller in self.index.callers(&module.id) {
            external_incoming |= self.is_external(caller, container)?;
        }
        let mut external_outgoing = false;
        for callee in self.index.callees(&module.id) {
            external_outgoing |= self.is_external(callee, container)?;
        }

        Ok(match (external_incoming, external_outgoing) {
            (true, true) => DependencyProfileCategory::Transit,
            (true, false) => DependencyProfileCategory::Inbound,
            (false, true) => DependencyProfileCategory::Outbound,
            (false, false) => DependencyProfileCategory::Hidden,
        })
    }
}

/// Sets the dependency profile category of every module node.
pub fn find_dependency_profiles(nodes: &mut [Node], edges: &[Edge]) -> Result<()> {
    let categories = {
        let index = GraphIndex::new(nodes, edges);
        let mut profiles = DependencyProfiles::new(&index);
        let mut categories = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            if node.is(GraphLayer::Module) {
                categories.push((i, profiles.classify(node)?));
            }
        }
        categories
    };

    for (i, category) in categories {
        nodes[i].properties.dependency_profile_category = category;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_core::DependencyType;

    /// Sales holds CRM (api, web) and Shop (web); no_domain holds Legacy.
    fn landscape(calls: &[(&str, &str)]) -> (Vec<Node>, Vec<Edge>) {
        let nodes = vec![
            Node::domain(UNCLASSIFIED_DOMAIN_NAME).unwrap(),
            Node::domain("Sales").unwrap(),
            Node::application("CRM").unwrap(),
            Node::application("Shop").unwrap(),
            Node::application("Legacy").unwrap(),
            Node::module("CRM", "api").unwrap(),
            Node::module("CRM", "web").unwrap(),
            Node::module("Shop", "web").unwrap(),
            Node::module("Legacy", "core").unwrap(),
        ];
        let mut edges = vec![
            Edge::contains("D_Sales", "A_CRM"),
            Edge::contains("D_Sales", "A_Shop"),
            Edge::contains("D_no_domain", "A_Legacy"),
            Edge::contains("A_CRM", "A_CRM__M_api"),
            Edge::contains("A_CRM", "A_CRM__M_web"),
            Edge::contains("A_Shop", "A_Shop__M_web"),
            Edge::contains("A_Legacy", "A_Legacy__M_core"),
        ];
        for (s, t) in calls {
            edges.push(Edge::calls(s, t, "Action", "Run", DependencyType::CompileTime, None));
        }
        (nodes, edges)
    }

    fn category(nodes: &[Node], id: &str) -> DependencyProfileCategory {
        nodes
            .iter()
            .find(|n| n.id == id)
            .unwrap()
            .properties
            .dependency_profile_category
    }

    #[test]
    fn test_categories() {
        let (mut nodes, edges) = landscape(&[
            ("A_Shop__M_web", "A_CRM__M_api"),
            ("A_CRM__M_api", "A_Shop__M_web"),
            ("A_CRM__M_web", "A_CRM__M_api"),
        ]);
        find_dependency_profiles(&mut nodes, &edges).unwrap();

        assert_eq!(category(&nodes, "A_CRM__M_api"), DependencyProfileCategory::Transit);
        assert_eq!(category(&nodes, "A_Shop__M_web"), DependencyProfileCategory::Transit);
        assert_eq!(category(&nodes, "A_CRM__M_web"), DependencyProfileCategory::Hidden);
        assert_eq!(category(&nodes, "D_Sales"), DependencyProfileCategory::None);
    }

    #[test]
    fn test_inbound_and_outbound() {
        let (mut nodes, edges) = landscape(&[("A_Shop__M_web", "A_CRM__M_api")]);
        find_dependency_profiles(&mut nodes, &edges).unwrap();

        assert_eq!(category(&nodes, "A_CRM__M_api"), DependencyProfileCategory::Inbound);
        assert_eq!(category(&nodes, "A_Shop__M_web"), DependencyProfileCategory::Outbound);
    }

    #[test]
    fn test_unclassified_neighbours_are_internal() {
        let (mut nodes, edges) = landscape(&[
            ("A_Legacy__M_core", "A_CRM__M_api"),
            ("A_CRM__M_api", "A_CRM__M_api"),
        ]);
        find_dependency_profiles(&mut nodes, &edges).unwrap();

        assert_eq!(category(&nodes, "A_CRM__M_api"), DependencyProfileCategory::Hidden);
        // Legacy's neighbour is classified, so Legacy still calls out.
        assert_eq!(category(&nodes, "A_Legacy__M_core"), DependencyProfileCategory::Outbound);
    }

    #[test]
    fn test_missing_domain_fails() {
        let (mut nodes, mut edges) = landscape(&[("A_Shop__M_web", "A_CRM__M_api")]);
        edges.retain(|e| e.id != "D_Sales__A_Shop");
        let err = find_dependency_profiles(&mut nodes, &edges).unwrap_err();
        assert_eq!(
            err,
            GraphError::MissingAncestor {
                id: "A_Shop__M_web".to_string(),
                level: "Domain",
            }
        );
    }
}
