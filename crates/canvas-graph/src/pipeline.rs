//! The single entry point from dataset rows to a finished graph.

use crate::builder::{GraphBuilder, GraphParts};
use crate::merge::merge_parts;
use crate::metrics::{find_cohesion, find_dependency_profiles};
use crate::parsers::{
    parse_application_groups, parse_consumer_producer, parse_integrations, parse_module_details,
    propagate_module_properties,
};
use crate::post_processor::GraphPostProcessor;
use canvas_core::records::split_by_log_type;
use canvas_core::{
    ApplicationGroupEntry, ConsumerProducerEntry, Graph, IntegrationServiceApiEntry, Logger,
    ModuleDetailsEntry, Result,
};
use serde::{Deserialize, Serialize};

/// Switches that shape the assembled graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildOptions {
    /// Insert Layer nodes between applications and sublayers.
    pub include_layer_tier: bool,
    /// Replace every name with a placeholder.
    pub anonymize: bool,
    /// Keep only these domains and their dependency closure. Empty keeps all.
    pub domain_filter: Vec<String>,
}

/// Dataset rows fed into [`build_graph`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Datasets {
    pub structure: Vec<ApplicationGroupEntry>,
    pub dependencies: Vec<ConsumerProducerEntry>,
    /// Dynamic API usage. Integration rows become runtime edges; service
    /// API rows supply call counts for consumer/producer edges.
    pub integration: Option<Vec<IntegrationServiceApiEntry>>,
    pub details: Option<Vec<ModuleDetailsEntry>>,
}

impl Datasets {
    /// Whether module details are present and will be propagated.
    pub fn has_details(&self) -> bool {
        self.details.as_ref().is_some_and(|d| !d.is_empty())
    }
}

fn run_parser<'a>(
    options: &BuildOptions,
    logger: &'a dyn Logger,
    parse: impl FnOnce(&mut GraphBuilder<'a>) -> Result<()>,
) -> Result<GraphParts> {
    let mut builder = GraphBuilder::new(options.include_layer_tier, logger);
    parse(&mut builder)?;
    Ok(builder.into_parts())
}

/// Assembles, post-processes and measures the landscape graph.
///
/// The result is not validated; call
/// [`validate_graph`](crate::validate_graph) on it when needed.
pub fn build_graph(
    datasets: &Datasets,
    options: &BuildOptions,
    logger: &dyn Logger,
) -> Result<Graph> {
    let (integrations, service_apis) = datasets
        .integration
        .clone()
        .map(split_by_log_type)
        .unwrap_or_default();

    let mut parts = Vec::with_capacity(4);
    if let Some(details) = datasets.details.as_ref().filter(|d| !d.is_empty()) {
        logger.info("Parse module details...");
        parts.push(run_parser(options, logger, |b| parse_module_details(b, details))?);
    }

    logger.info("Parse consumer/producer dependencies...");
    parts.push(run_parser(options, logger, |b| {
        parse_consumer_producer(b, &datasets.dependencies, &service_apis)
    })?);

    logger.info("Parse application groups...");
    parts.push(run_parser(options, logger, |b| {
        parse_application_groups(b, &datasets.structure)
    })?);

    if datasets.integration.is_some() {
        logger.info("Parse integrations...");
        parts.push(run_parser(options, logger, |b| parse_integrations(b, &integrations))?);
    }

    logger.info("Merge graphs...");
    let merged = merge_parts(parts);

    let post_processor = GraphPostProcessor::new(merged, options.include_layer_tier, logger);
    let GraphParts {
        mut nodes,
        contain_edges,
        dependency_edges,
    } = post_processor.run(options.anonymize, &options.domain_filter)?;
    let edges: Vec<_> = contain_edges.into_iter().chain(dependency_edges).collect();

    if datasets.has_details() {
        logger.info("Propagate module details...");
        propagate_module_properties(&mut nodes, &edges);
    }

    logger.info("Find dependency profiles...");
    find_dependency_profiles(&mut nodes, &edges)?;

    logger.info("Find cohesion...");
    find_cohesion(&mut nodes, &edges);

    logger.info(&format!(
        "Generated graph with {} nodes and {} edges.",
        nodes.len(),
        edges.len()
    ));
    Ok(Graph::new(nodes, edges))
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_core::{LogType, NullLogger};
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingLogger {
        messages: RefCell<Vec<String>>,
    }

    impl Logger for RecordingLogger {
        fn info(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }

        fn warn(&self, message: &str) {
            self.messages.borrow_mut().push(format!("warn: {}", message));
        }
    }

    fn datasets() -> Datasets {
        Datasets {
            structure: vec![ApplicationGroupEntry {
                domain: Some("Sales".to_string()),
                application: "CRM".to_string(),
                layer: None,
                module: "CRM_API".to_string(),
            }],
            dependencies: vec![ConsumerProducerEntry {
                cons_application: "Shop".to_string(),
                cons_module: "Shop_Web".to_string(),
                prod_application: "CRM".to_string(),
                prod_module: "CRM_API".to_string(),
                reference_name: "GET /customers".to_string(),
                reference_kind: "ServiceAPIMethod".to_string(),
            }],
            integration: None,
            details: None,
        }
    }

    fn usage(
        module: &str,
        direction: &str,
        logtype: LogType,
        count: u64,
    ) -> IntegrationServiceApiEntry {
        let (application, _) = module.split_once('_').unwrap();
        IntegrationServiceApiEntry {
            application_name: application.to_string(),
            module_name: module.to_string(),
            endpoint_and_method: "GET /customers".to_string(),
            direction: direction.to_string(),
            logtype,
            count,
        }
    }

    #[test]
    fn test_phases_are_logged_in_order() {
        let logger = RecordingLogger::default();
        build_graph(&datasets(), &BuildOptions::default(), &logger).unwrap();

        let messages = logger.messages.borrow();
        let position = |m: &str| messages.iter().position(|x| x == m).unwrap();
        assert!(
            position("Parse consumer/producer dependencies...")
                < position("Parse application groups...")
        );
        assert!(position("Merge graphs...") < position("Find cohesion..."));
        assert!(!messages.iter().any(|m| m == "Parse module details..."));
        assert!(!messages.iter().any(|m| m == "Parse integrations..."));
    }

    #[test]
    fn test_service_api_counts_flow_into_edges() {
        let mut data = datasets();
        data.integration = Some(vec![
            usage("CRM_API", "REST (Expose)", LogType::ServiceApi, 42),
            usage("Shop_Web", "REST (Consume)", LogType::ServiceApi, 7),
        ]);
        let graph = build_graph(&data, &BuildOptions::default(), &NullLogger).unwrap();

        let edge = graph.edge("A_Shop__M_Shop_Web__A_CRM__M_CRM_API").unwrap();
        assert_eq!(edge.properties.nr_calls, Some(42));
    }

    #[test]
    fn test_layer_tier_option() {
        let options = BuildOptions {
            include_layer_tier: true,
            ..BuildOptions::default()
        };
        let graph = build_graph(&datasets(), &options, &NullLogger).unwrap();

        assert!(graph.node("A_CRM__Core").is_some());
        let api = graph.node("A_CRM__Core__API").unwrap();
        assert_eq!(api.properties.cohesion, 0.0);
        let parent = graph
            .edges()
            .iter()
            .find(|e| e.target == "A_CRM__Core__API")
            .unwrap();
        assert_eq!(parent.source, "A_CRM__Core");
    }

    #[test]
    fn test_options_from_json() {
        let json = r#"{"includeLayerTier": true, "domainFilter": ["Sales"]}"#;
        let options: BuildOptions = serde_json::from_str(json).unwrap();
        assert!(options.include_layer_tier);
        assert!(!options.anonymize);
        assert_eq!(options.domain_filter, vec!["Sales"]);
    }
}
