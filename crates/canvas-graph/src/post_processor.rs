//! Finalizes a merged graph.
//!
//! Passes run in a fixed order: orphan applications go to the
//! unclassified domain, provisional application→module edges become
//! sublayer edges, the graph is optionally narrowed to a set of domains
//! and anonymized, and finally empty structure is trimmed and modules take
//! their sublayer's colour.

use crate::builder::{GraphBuilder, GraphParts};
use canvas_core::format::{
    application_id, application_id_from_layer_id, application_with_sublayer_id, domain_id,
    module_id,
};
use canvas_core::{
    module_suffix_to_layers, Edge, GraphError, GraphLayer, Logger, Node, Result,
    UNCLASSIFIED_DOMAIN_NAME,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Which way a dependency walk follows `calls` edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    /// From caller to callee.
    Outward,
    /// From callee to caller.
    Inward,
}

/// Runs the post-processing passes over merged parser output.
pub struct GraphPostProcessor<'a> {
    builder: GraphBuilder<'a>,
}

impl<'a> GraphPostProcessor<'a> {
    pub fn new(parts: GraphParts, include_layer_tier: bool, logger: &'a dyn Logger) -> Self {
        Self {
            builder: GraphBuilder::from_parts(parts, include_layer_tier, logger),
        }
    }

    pub fn builder(&self) -> &GraphBuilder<'a> {
        &self.builder
    }

    fn logger(&self) -> &'a dyn Logger {
        self.builder.logger()
    }

    /// Runs every pass. `domain_filter` may be empty to keep all domains.
    pub fn run(mut self, anonymize: bool, domain_filter: &[String]) -> Result<GraphParts> {
        self.add_no_domain_classification()?;
        self.add_manual_module_sublayer_classification()?;
        if !domain_filter.is_empty() {
            self.filter_graph_by_domains(domain_filter)?;
        }
        if anonymize {
            self.anonymize_graph()?;
        }
        Ok(self.finish())
    }

    /// Trims empty (sub)layers and colours modules after their parent.
    pub fn finish(mut self) -> GraphParts {
        self.builder.trim();
        let modules = self.builder.ids_in(GraphLayer::Module);
        self.builder.color_nodes_based_on_parent(&modules);
        self.builder.into_parts()
    }

    /// Puts every application without a parent into the unclassified
    /// domain, which is placed first in the node list.
    pub fn add_no_domain_classification(&mut self) -> Result<()> {
        self.logger().info("Add domain to applications that have none...");

        let domain = Node::domain(UNCLASSIFIED_DOMAIN_NAME)?;
        let contained: HashSet<&str> = self
            .builder
            .contain_edges()
            .iter()
            .map(|e| e.target.as_str())
            .collect();
        let orphans: Vec<Edge> = self
            .builder
            .nodes()
            .iter()
            .filter(|n| n.is(GraphLayer::Application) && !contained.contains(n.id.as_str()))
            .map(|n| Edge::contains(&domain.id, &n.id))
            .collect();

        if self.builder.get_node(&domain.id).is_none() {
            self.builder.parts_mut().nodes.insert(0, domain);
            self.builder.reindex();
        }
        for edge in orphans {
            self.builder.push_contain_edge(edge);
        }
        Ok(())
    }

    /// Replaces provisional application→module edges.
    ///
    /// A module keeps its one explicit sublayer edge if it has one.
    /// Otherwise it is classified by name suffix and placed in that
    /// sublayer of the application its provisional edge came from.
    pub fn add_manual_module_sublayer_classification(&mut self) -> Result<()> {
        self.logger().info("Add modules to sublayers that have none...");

        let mut incoming: HashMap<&str, Vec<&Edge>> = HashMap::new();
        for edge in self.builder.contain_edges().iter().filter(|e| e.is_contains()) {
            incoming.entry(edge.target.as_str()).or_default().push(edge);
        }

        let mut provisional = HashSet::new();
        let mut sublayer_edges = Vec::new();
        for module in self.builder.nodes().iter().filter(|n| n.is(GraphLayer::Module)) {
            let edges = incoming.get(module.id.as_str()).map(Vec::as_slice).unwrap_or_default();

            let mut from_application = 0usize;
            for edge in edges {
                let source = self.builder.get_node(&edge.source).ok_or_else(|| {
                    GraphError::node_not_found(&edge.source, format!("source of edge {}", edge.id))
                })?;
                if source.is(GraphLayer::Application) {
                    provisional.insert(edge.id.clone());
                    from_application += 1;
                }
            }

            match edges.len() - from_application {
                0 => {}
                1 => continue,
                count => {
                    return Err(GraphError::InvalidSublayerCardinality {
                        module: module.id.clone(),
                        count,
                    })
                }
            }

            let application = edges.first().ok_or_else(|| GraphError::MissingAncestor {
                id: module.id.clone(),
                level: GraphLayer::Application.as_str(),
            })?;
            let slot = module_suffix_to_layers(&module.properties.simple_name);
            let sublayer_id = application_with_sublayer_id(
                &application.source,
                Some(slot.layer.as_str()),
                Some(slot.sublayer.as_str()),
            );
            if self.builder.get_node(&sublayer_id).is_none() {
                return Err(GraphError::node_not_found(
                    sublayer_id,
                    format!("sublayer of module {}", module.id),
                ));
            }
            sublayer_edges.push(Edge::contains(&sublayer_id, &module.id));
        }

        self.logger()
            .info("Replace application containment edges by sublayer containment edges...");
        let parts = self.builder.parts_mut();
        parts.contain_edges.retain(|e| !provisional.contains(&e.id));
        parts.contain_edges.extend(sublayer_edges);
        self.builder.reindex();
        Ok(())
    }

    /// Narrows the graph to the given domains and everything their modules
    /// depend on or are depended on by, transitively, plus the ancestors
    /// of all those modules. Only traversed edges survive.
    pub fn filter_graph_by_domains(&mut self, domain_names: &[String]) -> Result<()> {
        self.logger().info("Filter domains...");
        let view = FilterView::new(&self.builder);

        let mut modules = Vec::new();
        for name in domain_names {
            let id = domain_id(name);
            let Some(domain) = self.builder.get_node(&id) else {
                return Err(GraphError::DomainNotFound {
                    id,
                    name: name.clone(),
                });
            };
            modules.extend(view.find_leaves(&domain.id)?);
        }
        let modules = dedup(modules);

        let (outgoing_nodes, outgoing_edges) = view.follow_dependencies(&modules, Walk::Outward)?;
        let (incoming_nodes, incoming_edges) = view.follow_dependencies(&modules, Walk::Inward)?;
        let dependency_modules = dedup(outgoing_nodes.into_iter().chain(incoming_nodes).collect());
        let dependency_edges = dedup_edges(outgoing_edges.into_iter().chain(incoming_edges));

        let all_modules: Vec<&str> = modules.into_iter().chain(dependency_modules).collect();
        let mut ancestor_nodes = Vec::new();
        let mut ancestor_edges = Vec::new();
        for module in &all_modules {
            let (nodes, edges) = view.find_ancestors_with_edges(module)?;
            ancestor_nodes.extend(nodes);
            ancestor_edges.extend(edges);
        }

        let kept_ids = dedup(ancestor_nodes.into_iter().chain(all_modules).collect());
        let nodes: Vec<Node> = kept_ids
            .iter()
            .filter_map(|id| self.builder.get_node(id).cloned())
            .collect();
        let contain_edges: Vec<Edge> = dedup_edges(ancestor_edges).into_iter().cloned().collect();
        let dependency_edges: Vec<Edge> = dependency_edges.into_iter().cloned().collect();

        *self.builder.parts_mut() = GraphParts {
            nodes,
            contain_edges,
            dependency_edges,
        };
        self.builder.reindex();
        Ok(())
    }

    /// Replaces every name with a counter so the graph can be shared.
    ///
    /// Domains, applications and modules become `Domain_<n>`,
    /// `Application_<n>` and `Module_<n>`; layers and sublayers become
    /// `Layer_<n>` and `Sublayer_<n>`. Reference names become
    /// `Reference_<n>` from one counter shared by all edges. The
    /// unclassified domain keeps its name. The mapping is discarded.
    pub fn anonymize_graph(&mut self) -> Result<()> {
        self.logger().info("Anonymize graph...");
        let mut counters: HashMap<GraphLayer, usize> = HashMap::new();
        let mut next = |layer: GraphLayer| {
            let counter = counters.entry(layer).or_default();
            *counter += 1;
            *counter
        };
        let mut mapping: HashMap<String, String> = HashMap::new();
        let parts = self.builder.parts_mut();

        for node in parts.nodes.iter_mut() {
            let layer = node
                .layer()
                .ok_or_else(|| GraphError::UnknownLayer(node.labels.join(";")))?;
            let (new_id, name) = match layer {
                GraphLayer::Domain if node.properties.simple_name == UNCLASSIFIED_DOMAIN_NAME => {
                    mapping.insert(node.id.clone(), node.id.clone());
                    continue;
                }
                GraphLayer::Domain => {
                    let name = format!("Domain_{}", next(layer));
                    (domain_id(&name), name)
                }
                GraphLayer::Application => {
                    let name = format!("Application_{}", next(layer));
                    (application_id(&name), name)
                }
                GraphLayer::Module => {
                    let name = format!("Module_{}", next(layer));
                    (module_id("", &name), name)
                }
                GraphLayer::Layer | GraphLayer::Sublayer => continue,
            };
            rename(node, new_id, name.clone(), name, &mut mapping);
        }

        for node in parts.nodes.iter_mut() {
            let layer = node
                .layer()
                .ok_or_else(|| GraphError::UnknownLayer(node.labels.join(";")))?;
            if !layer.is_structural() {
                continue;
            }
            let application = mapping
                .get(application_id_from_layer_id(&node.id))
                .cloned()
                .unwrap_or_default();
            let new_id = format!("{}_{}", layer, next(layer));
            let full_name = format!("{} {}", application, new_id).trim().to_string();
            rename(node, new_id.clone(), full_name, new_id, &mut mapping);
        }

        let mut reference_counter = 1usize;
        let mut anonymize_edge = |edge: &Edge| -> Result<Edge> {
            let mapped = |id: &str| {
                mapping.get(id).cloned().ok_or_else(|| {
                    GraphError::node_not_found(id, format!("endpoint of edge {}", edge.id))
                })
            };
            let source = mapped(&edge.source)?;
            let target = mapped(&edge.target)?;

            let id = format!("{}__{}", source, target);
            let mut anonymized = Edge::new(id, source, target, edge.label);
            anonymized.properties = edge.properties.clone();
            anonymized.properties.references = edge
                .properties
                .references
                .iter()
                .map(|(kind, names)| {
                    let placeholders: Vec<String> = names
                        .iter()
                        .map(|_| {
                            reference_counter += 1;
                            format!("Reference_{}", reference_counter)
                        })
                        .collect();
                    (kind.clone(), placeholders)
                })
                .collect::<BTreeMap<_, _>>();
            Ok(anonymized)
        };

        parts.contain_edges = parts
            .contain_edges
            .iter()
            .map(&mut anonymize_edge)
            .collect::<Result<_>>()?;
        parts.dependency_edges = parts
            .dependency_edges
            .iter()
            .map(&mut anonymize_edge)
            .collect::<Result<_>>()?;

        self.builder.reindex();
        Ok(())
    }
}

fn rename(
    node: &mut Node,
    new_id: String,
    full_name: String,
    simple_name: String,
    mapping: &mut HashMap<String, String>,
) {
    let old_id = std::mem::replace(&mut node.id, new_id.clone());
    mapping.insert(old_id, new_id);
    node.properties.full_name = full_name;
    node.properties.simple_name = simple_name;
}

/// Keeps the first occurrence of every ID.
fn dedup(ids: Vec<&str>) -> Vec<&str> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn dedup_edges<'e>(edges: impl IntoIterator<Item = &'e Edge>) -> Vec<&'e Edge> {
    let mut seen = HashSet::new();
    edges
        .into_iter()
        .filter(|e| seen.insert(e.id.as_str()))
        .collect()
}

/// Edge lookups for the domain filter, in edge list order.
struct FilterView<'b> {
    builder: &'b GraphBuilder<'b>,
    children: HashMap<&'b str, Vec<&'b str>>,
    parent_edge: HashMap<&'b str, &'b Edge>,
}

impl<'b> FilterView<'b> {
    fn new(builder: &'b GraphBuilder<'b>) -> Self {
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut parent_edge = HashMap::new();
        for edge in builder.contain_edges().iter().filter(|e| e.is_contains()) {
            children
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
            parent_edge.entry(edge.target.as_str()).or_insert(edge);
        }
        Self {
            builder,
            children,
            parent_edge,
        }
    }

    fn node_id(&self, id: &str, context: impl FnOnce() -> String) -> Result<&'b str> {
        self.builder
            .get_node(id)
            .map(|n| n.id.as_str())
            .ok_or_else(|| GraphError::node_not_found(id, context()))
    }

    /// All containment leaves below a node; a node without children is
    /// its own leaf.
    fn find_leaves(&self, id: &'b str) -> Result<Vec<&'b str>> {
        let Some(children) = self.children.get(id) else {
            return Ok(vec![id]);
        };
        let mut leaves = Vec::new();
        for child in children {
            let child = self.node_id(child, || format!("child of {}", id))?;
            leaves.extend(self.find_leaves(child)?);
        }
        Ok(leaves)
    }

    /// Ancestors of a node, nearest first, with the edges that lead to them.
    fn find_ancestors_with_edges(&self, id: &str) -> Result<(Vec<&'b str>, Vec<&'b Edge>)> {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let mut current = id.to_string();
        let mut seen = HashSet::new();
        while let Some(&edge) = self.parent_edge.get(current.as_str()) {
            if !seen.insert(edge.id.as_str()) {
                break;
            }
            let parent = self.node_id(&edge.source, || format!("source of edge {}", edge.id))?;
            nodes.push(parent);
            edges.push(edge);
            current = parent.to_string();
        }
        Ok((nodes, edges))
    }

    /// Follows `calls` edges from `seeds` until no unseen edge is left.
    /// Returns the modules reached and the edges used.
    fn follow_dependencies(
        &self,
        seeds: &[&'b str],
        walk: Walk,
    ) -> Result<(Vec<&'b str>, Vec<&'b Edge>)> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut frontier: HashSet<&str> = seeds.iter().copied().collect();
        let mut reached = Vec::new();
        let mut used = Vec::new();

        loop {
            let step: Vec<&Edge> = self
                .builder
                .dependency_edges()
                .iter()
                .filter(|e| e.is_calls() && !seen.contains(e.id.as_str()))
                .filter(|e| match walk {
                    Walk::Outward => frontier.contains(e.source.as_str()),
                    Walk::Inward => frontier.contains(e.target.as_str()),
                })
                .collect();
            if step.is_empty() {
                break;
            }

            let mut next = Vec::with_capacity(step.len());
            for edge in &step {
                let other = match walk {
                    Walk::Outward => &edge.target,
                    Walk::Inward => &edge.source,
                };
                next.push(self.node_id(other, || format!("endpoint of edge {}", edge.id))?);
                seen.insert(edge.id.as_str());
            }

            frontier = next.iter().copied().collect();
            reached.extend(next);
            used.extend(step);
        }

        Ok((reached, used))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{parse_application_groups, parse_consumer_producer};
    use canvas_core::{ApplicationGroupEntry, ConsumerProducerEntry, NullLogger};

    fn group(domain: &str, app: &str, module: &str) -> ApplicationGroupEntry {
        ApplicationGroupEntry {
            domain: Some(domain.to_string()),
            application: app.to_string(),
            layer: None,
            module: module.to_string(),
        }
    }

    fn call(cons: (&str, &str), prod: (&str, &str)) -> ConsumerProducerEntry {
        ConsumerProducerEntry {
            cons_application: cons.0.to_string(),
            cons_module: cons.1.to_string(),
            prod_application: prod.0.to_string(),
            prod_module: prod.1.to_string(),
            reference_name: "Run".to_string(),
            reference_kind: "Action".to_string(),
        }
    }

    fn processor(
        groups: &[ApplicationGroupEntry],
        calls: &[ConsumerProducerEntry],
    ) -> GraphPostProcessor<'static> {
        let mut builder = GraphBuilder::new(false, &NullLogger);
        parse_application_groups(&mut builder, groups).unwrap();
        parse_consumer_producer(&mut builder, calls, &[]).unwrap();
        GraphPostProcessor::new(builder.into_parts(), false, &NullLogger)
    }

    fn parent_of<'p>(parts: &'p GraphParts, id: &str) -> Vec<&'p str> {
        parts
            .contain_edges
            .iter()
            .filter(|e| e.target == id)
            .map(|e| e.source.as_str())
            .collect()
    }

    #[test]
    fn test_orphans_join_unclassified_domain() {
        let mut post = processor(
            &[group("Sales", "CRM", "CRM_API")],
            &[call(("Shop", "Shop_Web"), ("CRM", "CRM_API"))],
        );
        post.add_no_domain_classification().unwrap();

        let builder = post.builder();
        assert_eq!(builder.nodes()[0].id, "D_no_domain");
        let edge = builder
            .contain_edges()
            .iter()
            .find(|e| e.target == "A_Shop")
            .unwrap();
        assert_eq!(edge.source, "D_no_domain");
        assert!(builder
            .contain_edges()
            .iter()
            .all(|e| !(e.target == "A_CRM" && e.source == "D_no_domain")));
    }

    #[test]
    fn test_suffix_classification_replaces_provisional_edges() {
        let mut post = processor(&[], &[call(("Shop", "Shop_Web"), ("CRM", "CRM_API"))]);
        post.add_no_domain_classification().unwrap();
        post.add_manual_module_sublayer_classification().unwrap();
        let parts = post.finish();

        assert_eq!(parent_of(&parts, "A_CRM__M_CRM_API"), vec!["A_CRM__Core__API"]);
        assert_eq!(parent_of(&parts, "A_Shop__M_Shop_Web"), vec!["A_Shop__Enduser__Enduser"]);
        let api = parts.nodes.iter().find(|n| n.id == "A_CRM__M_CRM_API").unwrap();
        assert_eq!(api.properties.color, "#E67E22");
    }

    #[test]
    fn test_explicit_sublayer_beats_suffix() {
        let mut groups = vec![group("Sales", "CRM", "CRM_API")];
        groups[0].layer = Some("Library".to_string());
        let mut post = processor(&groups, &[call(("CRM", "CRM_API"), ("CRM", "CRM_API"))]);
        post.add_manual_module_sublayer_classification().unwrap();
        let parts = post.finish();

        assert_eq!(
            parent_of(&parts, "A_CRM__M_CRM_API"),
            vec!["A_CRM__Foundation__Library"]
        );
    }

    #[test]
    fn test_two_sublayer_edges_fail() {
        let mut post = processor(&[group("Sales", "CRM", "CRM_API")], &[]);
        post.builder.push_contain_edge(Edge::contains("A_CRM__Core__API", "A_CRM__M_CRM_API"));
        post.builder.push_contain_edge(Edge::contains("A_CRM__Core__Core", "A_CRM__M_CRM_API"));

        let err = post.add_manual_module_sublayer_classification().unwrap_err();
        assert_eq!(
            err,
            GraphError::InvalidSublayerCardinality {
                module: "A_CRM__M_CRM_API".to_string(),
                count: 2,
            }
        );
    }

    #[test]
    fn test_unknown_domain_filter() {
        let post = processor(&[group("Sales", "CRM", "CRM_API")], &[]);
        let err = post.run(false, &["Marketing".to_string()]).unwrap_err();
        assert!(matches!(err, GraphError::DomainNotFound { ref id, .. } if id == "D_Marketing"));
    }

    #[test]
    fn test_domain_filter_follows_dependencies() {
        let post = processor(
            &[
                group("Sales", "CRM", "CRM_API"),
                group("Sales", "CRM", "CRM_Web"),
                group("Ops", "ERP", "ERP_IS"),
                group("Ops", "WMS", "WMS_Web"),
                group("HR", "Payroll", "Payroll_Web"),
            ],
            &[
                call(("CRM", "CRM_API"), ("ERP", "ERP_IS")),
                call(("WMS", "WMS_Web"), ("CRM", "CRM_Web")),
            ],
        );
        let parts = post.run(false, &["Sales".to_string()]).unwrap();

        let mut modules: Vec<&str> = parts
            .nodes
            .iter()
            .filter(|n| n.is(GraphLayer::Module))
            .map(|n| n.id.as_str())
            .collect();
        modules.sort_unstable();
        assert_eq!(
            modules,
            vec![
                "A_CRM__M_CRM_API",
                "A_CRM__M_CRM_Web",
                "A_ERP__M_ERP_IS",
                "A_WMS__M_WMS_Web"
            ]
        );
        assert!(parts.nodes.iter().any(|n| n.id == "D_Ops"));
        assert!(parts.nodes.iter().all(|n| n.id != "D_HR"));
        assert_eq!(parts.dependency_edges.len(), 2);
        assert_eq!(parent_of(&parts, "A_ERP"), vec!["D_Ops"]);
    }

    #[test]
    fn test_anonymize() {
        let post = processor(
            &[group("Sales", "CRM", "CRM_API")],
            &[
                call(("CRM", "CRM_API"), ("CRM", "CRM_API")),
                call(("Shop", "Shop_Web"), ("CRM", "CRM_API")),
            ],
        );
        let parts = post.run(true, &[]).unwrap();

        let ids: HashSet<&str> = parts.nodes.iter().map(|n| n.id.as_str()).collect();
        assert!(ids.contains("D_no_domain"));
        assert!(ids.contains("D_Domain_1"));
        assert!(ids.contains("A_Application_1"));
        assert!(ids.contains("A___M_Module_1"));
        assert!(!ids.iter().any(|id| id.contains("CRM") || id.contains("Shop")));

        let sublayer = parts.nodes.iter().find(|n| n.is(GraphLayer::Sublayer)).unwrap();
        assert!(sublayer.id.starts_with("Sublayer_"));
        assert!(sublayer.properties.full_name.starts_with("A_Application_"));

        for edge in parts.contain_edges.iter().chain(&parts.dependency_edges) {
            assert_eq!(edge.id, format!("{}__{}", edge.source, edge.target));
            assert!(ids.contains(edge.source.as_str()));
            assert!(ids.contains(edge.target.as_str()));
        }
        let names: Vec<&String> = parts
            .dependency_edges
            .iter()
            .flat_map(|e| e.properties.references.values().flatten())
            .collect();
        assert_eq!(names, vec!["Reference_2", "Reference_3"]);
    }
}
