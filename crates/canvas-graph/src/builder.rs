//! Incremental graph builder shared by every dataset parser.
//!
//! The builder owns the three collections an assembly phase works on and
//! hands out nodes by deterministic ID, creating them on first reference.
//! Lookups go through ID maps; the vectors keep insertion order because
//! output order depends on it.

use canvas_core::format::{
    application_id, application_with_layer_id, application_with_sublayer_id, format_name,
    module_id,
};
use canvas_core::{
    sublayer_name_to_layers, DependencyProfileCategory, Edge, EdgeLabel, GraphError, GraphLayer,
    Logger, ModuleLayer, Node, NodeProperties, Result,
};
use std::collections::{HashMap, HashSet};

/// Nodes, containment edges and dependency edges produced by one phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphParts {
    pub nodes: Vec<Node>,
    pub contain_edges: Vec<Edge>,
    pub dependency_edges: Vec<Edge>,
}

/// Builds the containment hierarchy and dependency edges for one dataset.
pub struct GraphBuilder<'a> {
    parts: GraphParts,
    /// Whether a Layer tier sits between Application and Sublayer.
    include_layer_tier: bool,
    /// Maps node IDs to positions in `parts.nodes`.
    node_index: HashMap<String, usize>,
    /// IDs of all containment edges.
    contain_ids: HashSet<String>,
    /// Maps dependency edge IDs to positions in `parts.dependency_edges`.
    dependency_index: HashMap<String, usize>,
    logger: &'a dyn Logger,
}

impl<'a> GraphBuilder<'a> {
    /// Creates an empty builder.
    pub fn new(include_layer_tier: bool, logger: &'a dyn Logger) -> Self {
        Self::from_parts(GraphParts::default(), include_layer_tier, logger)
    }

    /// Wraps collections produced elsewhere, e.g. by a merge.
    pub fn from_parts(
        parts: GraphParts,
        include_layer_tier: bool,
        logger: &'a dyn Logger,
    ) -> Self {
        let mut builder = Self {
            parts,
            include_layer_tier,
            node_index: HashMap::new(),
            contain_ids: HashSet::new(),
            dependency_index: HashMap::new(),
            logger,
        };
        builder.reindex();
        builder
    }

    /// Rebuilds the ID maps after the collections were replaced wholesale.
    pub(crate) fn reindex(&mut self) {
        self.node_index.clear();
        for (i, node) in self.parts.nodes.iter().enumerate() {
            self.node_index.entry(node.id.clone()).or_insert(i);
        }
        self.contain_ids = self.parts.contain_edges.iter().map(|e| e.id.clone()).collect();
        self.dependency_index.clear();
        for (i, edge) in self.parts.dependency_edges.iter().enumerate() {
            self.dependency_index.entry(edge.id.clone()).or_insert(i);
        }
    }

    pub fn logger(&self) -> &'a dyn Logger {
        self.logger
    }

    pub fn include_layer_tier(&self) -> bool {
        self.include_layer_tier
    }

    pub fn nodes(&self) -> &[Node] {
        &self.parts.nodes
    }

    pub fn contain_edges(&self) -> &[Edge] {
        &self.parts.contain_edges
    }

    pub fn dependency_edges(&self) -> &[Edge] {
        &self.parts.dependency_edges
    }

    pub(crate) fn parts_mut(&mut self) -> &mut GraphParts {
        &mut self.parts
    }

    /// Finishes building and returns the collections.
    pub fn into_parts(self) -> GraphParts {
        self.parts
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.parts.nodes[i])
    }

    pub fn get_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let i = *self.node_index.get(id)?;
        self.parts.nodes.get_mut(i)
    }

    pub fn get_dependency_edge(&self, id: &str) -> Option<&Edge> {
        self.dependency_index
            .get(id)
            .map(|&i| &self.parts.dependency_edges[i])
    }

    pub fn get_dependency_edge_mut(&mut self, id: &str) -> Option<&mut Edge> {
        let i = *self.dependency_index.get(id)?;
        self.parts.dependency_edges.get_mut(i)
    }

    /// Appends a node. Later duplicates stay in the list but are never
    /// returned by lookups.
    pub fn push_node(&mut self, node: Node) {
        self.node_index
            .entry(node.id.clone())
            .or_insert(self.parts.nodes.len());
        self.parts.nodes.push(node);
    }

    /// Appends a containment edge unless one with the same ID exists.
    pub fn push_contain_edge(&mut self, edge: Edge) {
        if self.contain_ids.insert(edge.id.clone()) {
            self.parts.contain_edges.push(edge);
        }
    }

    /// Appends a dependency edge unless one with the same ID exists.
    pub fn push_dependency_edge(&mut self, edge: Edge) {
        if self.dependency_index.contains_key(&edge.id) {
            return;
        }
        self.dependency_index
            .insert(edge.id.clone(), self.parts.dependency_edges.len());
        self.parts.dependency_edges.push(edge);
    }

    /// Returns the domain node with the given name, creating it if needed.
    pub fn get_or_create_domain(&mut self, domain_name: &str) -> Result<String> {
        let domain = Node::domain(domain_name)?;
        let id = domain.id.clone();
        if self.get_node(&id).is_none() {
            self.push_node(domain);
        }
        Ok(id)
    }

    /// Synthesizes the fixed (sub)layer taxonomy of one application.
    ///
    /// Every slot is created whether or not a module ends up in it;
    /// [`GraphBuilder::trim`] removes the empty ones afterwards.
    pub fn application_module_layer_nodes_and_edges(
        &self,
        application: &Node,
    ) -> (Vec<Node>, Vec<Edge>) {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let app_name = &application.properties.simple_name;

        for layer in ModuleLayer::ALL {
            let mut parent_id = application.id.clone();
            if self.include_layer_tier {
                let layer_node = structural_node(
                    application_with_layer_id(&application.id, Some(layer.as_str())),
                    GraphLayer::Layer,
                    format!("layer_{}", layer),
                    app_name,
                    layer.as_str(),
                    layer,
                );
                edges.push(taxonomy_edge(&application.id, &layer_node.id));
                parent_id = layer_node.id.clone();
                nodes.push(layer_node);
            }

            for sublayer in layer.sublayers() {
                let sublayer_node = structural_node(
                    application_with_sublayer_id(
                        &application.id,
                        Some(layer.as_str()),
                        Some(sublayer.as_str()),
                    ),
                    GraphLayer::Sublayer,
                    format!("Sublayer_{}", sublayer),
                    app_name,
                    sublayer.as_str(),
                    layer,
                );
                edges.push(taxonomy_edge(&parent_id, &sublayer_node.id));
                nodes.push(sublayer_node);
            }
        }

        (nodes, edges)
    }

    /// Finds or creates an application and one of its modules, and links
    /// the module into the hierarchy. Returns the module's ID.
    ///
    /// A new application is attached to `domain_id` when given and always
    /// receives its full (sub)layer taxonomy. When `sublayer_name`
    /// resolves, the module goes into that sublayer. Otherwise it is linked
    /// straight to its application; the post-processor later replaces that
    /// edge with a suffix-based sublayer edge.
    pub fn get_application_and_module(
        &mut self,
        application_name: &str,
        module_name: &str,
        domain_id: Option<&str>,
        sublayer_name: Option<&str>,
    ) -> Result<String> {
        let app_id = application_id(application_name);
        if self.get_node(&app_id).is_none() {
            let app_node = Node::application(application_name)?;
            if let Some(domain_id) = domain_id {
                self.push_contain_edge(Edge::contains(domain_id, &app_node.id));
            }
            let (layer_nodes, layer_edges) =
                self.application_module_layer_nodes_and_edges(&app_node);
            self.push_node(app_node);
            for node in layer_nodes {
                self.push_node(node);
            }
            for edge in layer_edges {
                self.push_contain_edge(edge);
            }
        }

        let module_id = module_id(application_name, module_name);
        if self.get_node(&module_id).is_none() {
            let module_node = Node::module(application_name, module_name)?;
            self.push_node(module_node);
        }

        let classification = match sublayer_name.filter(|s| !s.is_empty()) {
            Some(name) => {
                let found = sublayer_name_to_layers(name);
                if found.is_none() {
                    self.logger.warn(&format!(
                        "Could not match sublayer \"{}\" with any sublayer definitions.",
                        name
                    ));
                }
                found
            }
            None => None,
        };

        let parent_id = match classification {
            Some(slot) => {
                let parent_id = application_with_sublayer_id(
                    &app_id,
                    Some(slot.layer.as_str()),
                    Some(slot.sublayer.as_str()),
                );
                if self.get_node(&parent_id).is_none() {
                    return Err(GraphError::node_not_found(
                        parent_id,
                        format!("sublayer of module {}", module_id),
                    ));
                }
                parent_id
            }
            None => app_id,
        };
        self.push_contain_edge(Edge::contains(&parent_id, &module_id));

        Ok(module_id)
    }

    /// Removes sublayer nodes without children, then layer nodes without
    /// children, dropping the containment edges that pointed at them.
    pub fn trim(&mut self) {
        let parts = &mut self.parts;
        for layer in [GraphLayer::Sublayer, GraphLayer::Layer] {
            let parents: HashSet<&str> = parts
                .contain_edges
                .iter()
                .map(|e| e.source.as_str())
                .collect();
            let removed: HashSet<String> = parts
                .nodes
                .iter()
                .filter(|n| n.is(layer) && !parents.contains(n.id.as_str()))
                .map(|n| n.id.clone())
                .collect();
            parts.nodes.retain(|n| !removed.contains(&n.id));
            parts.contain_edges.retain(|e| !removed.contains(&e.target));
        }
        self.reindex();
    }

    /// Copies each node's colour from the source of its first incoming
    /// containment edge. Nodes without a parent keep their colour.
    pub fn color_nodes_based_on_parent(&mut self, ids: &[String]) {
        let mut parent_of: HashMap<&str, &str> = HashMap::new();
        for edge in self.parts.contain_edges.iter().filter(|e| e.is_contains()) {
            parent_of.entry(edge.target.as_str()).or_insert(edge.source.as_str());
        }

        let colors: Vec<(usize, String)> = ids
            .iter()
            .filter_map(|id| {
                let &child = self.node_index.get(id)?;
                let parent = self.get_node(parent_of.get(id.as_str())?)?;
                Some((child, parent.properties.color.clone()))
            })
            .collect();

        for (i, color) in colors {
            self.parts.nodes[i].properties.color = color;
        }
    }

    /// IDs of all nodes in the given graph layer, in node order.
    pub fn ids_in(&self, layer: GraphLayer) -> Vec<String> {
        self.parts
            .nodes
            .iter()
            .filter(|n| n.is(layer))
            .map(|n| n.id.clone())
            .collect()
    }
}

fn structural_node(
    id: String,
    graph_layer: GraphLayer,
    slot_label: String,
    application_name: &str,
    name: &str,
    layer: ModuleLayer,
) -> Node {
    let mut properties = NodeProperties::named(format!("{} {}", application_name, name), name);
    properties.color = layer.color().to_string();
    properties.dependency_profile_category = DependencyProfileCategory::None;
    Node::new(id, vec![graph_layer.to_string(), slot_label], properties)
}

fn taxonomy_edge(source: &str, target: &str) -> Edge {
    Edge::new(
        format_name(&format!("{}__contains", target)),
        source,
        target,
        EdgeLabel::Contains,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_core::NullLogger;

    fn incoming(builder: &GraphBuilder, id: &str) -> Vec<String> {
        builder
            .contain_edges()
            .iter()
            .filter(|e| e.target == id)
            .map(|e| e.source.clone())
            .collect()
    }

    #[test]
    fn test_taxonomy_without_layer_tier() {
        let builder = GraphBuilder::new(false, &NullLogger);
        let app = Node::application("CRM").unwrap();
        let (nodes, edges) = builder.application_module_layer_nodes_and_edges(&app);

        assert_eq!(nodes.len(), 10);
        assert!(nodes.iter().all(|n| n.is(GraphLayer::Sublayer)));
        assert!(edges.iter().all(|e| e.source == "A_CRM"));

        let api = nodes.iter().find(|n| n.id == "A_CRM__Core__API").unwrap();
        assert_eq!(api.labels, vec!["Sublayer", "Sublayer_API"]);
        assert_eq!(api.properties.full_name, "CRM API");
        assert_eq!(api.properties.color, "#E67E22");
        assert!(edges.iter().any(|e| e.id == "A_CRM__Core__API__contains"));
    }

    #[test]
    fn test_taxonomy_with_layer_tier() {
        let builder = GraphBuilder::new(true, &NullLogger);
        let app = Node::application("CRM").unwrap();
        let (nodes, edges) = builder.application_module_layer_nodes_and_edges(&app);

        assert_eq!(nodes.len(), 13);
        let layer = nodes.iter().find(|n| n.id == "A_CRM__Foundation").unwrap();
        assert_eq!(layer.labels, vec!["Layer", "layer_Foundation"]);
        let lib_edge = edges
            .iter()
            .find(|e| e.target == "A_CRM__Foundation__Library")
            .unwrap();
        assert_eq!(lib_edge.source, "A_CRM__Foundation");
    }

    #[test]
    fn test_lookup_or_create_is_idempotent() {
        let mut builder = GraphBuilder::new(false, &NullLogger);
        let first = builder
            .get_application_and_module("CRM", "CRM_API", None, None)
            .unwrap();
        let nodes = builder.nodes().len();
        let edges = builder.contain_edges().len();

        let second = builder
            .get_application_and_module("CRM", "CRM_API", None, None)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(builder.nodes().len(), nodes);
        assert_eq!(builder.contain_edges().len(), edges);
        // Application, 10 sublayers, module.
        assert_eq!(nodes, 12);
        assert_eq!(incoming(&builder, "A_CRM__M_CRM_API"), vec!["A_CRM"]);
    }

    #[test]
    fn test_explicit_sublayer() {
        let mut builder = GraphBuilder::new(false, &NullLogger);
        let domain = builder.get_or_create_domain("Sales").unwrap();
        let module = builder
            .get_application_and_module("Portal", "Portal_Web", Some(&domain), Some("core widgets"))
            .unwrap();

        assert_eq!(incoming(&builder, &module), vec!["A_Portal__Core__CoreWidgets"]);
        assert_eq!(incoming(&builder, "A_Portal"), vec!["D_Sales"]);
    }

    #[test]
    fn test_unknown_sublayer_falls_back_to_application() {
        let mut builder = GraphBuilder::new(false, &NullLogger);
        let module = builder
            .get_application_and_module("Portal", "Portal_Web", None, Some("Presentation"))
            .unwrap();
        assert_eq!(incoming(&builder, &module), vec!["A_Portal"]);
    }

    #[test]
    fn test_blank_names_fail() {
        let mut builder = GraphBuilder::new(false, &NullLogger);
        assert!(builder.get_application_and_module("", "M", None, None).is_err());
        assert!(builder.get_application_and_module("A", "", None, None).is_err());
        assert!(builder.get_or_create_domain("").is_err());
    }

    #[test]
    fn test_trim_keeps_used_sublayers() {
        let mut builder = GraphBuilder::new(true, &NullLogger);
        builder
            .get_application_and_module("CRM", "CRM_API", None, Some("API"))
            .unwrap();
        builder.trim();

        assert_eq!(builder.ids_in(GraphLayer::Sublayer), vec!["A_CRM__Core__API"]);
        assert_eq!(builder.ids_in(GraphLayer::Layer), vec!["A_CRM__Core"]);
        assert!(builder
            .contain_edges()
            .iter()
            .all(|e| builder.get_node(&e.target).is_some()));
        assert!(builder.get_node("A_CRM__Foundation").is_none());
    }

    #[test]
    fn test_color_from_parent() {
        let mut builder = GraphBuilder::new(false, &NullLogger);
        let module = builder
            .get_application_and_module("CRM", "CRM_Theme", None, Some("Style Guide"))
            .unwrap();
        builder.color_nodes_based_on_parent(&[module.clone()]);
        assert_eq!(builder.get_node(&module).unwrap().properties.color, "#28B463");
    }
}
