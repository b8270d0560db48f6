//! Canvas Graph - Landscape graph assembly
//!
//! This crate turns dataset rows exported from an OutSystems factory into
//! a labelled property graph of domains, applications, architecture
//! layers and modules, connected by containment and dependency edges.
//!
//! # Pipeline
//!
//! Each dataset is parsed by its own [`GraphBuilder`]. The parts are merged,
//! post-processed (unclassified domain, sublayer classification, optional
//! domain filter and anonymization, trimming) and finally measured:
//! module details are summed up the hierarchy, modules get a dependency
//! profile and every container a cohesion score.
//!
//! # Example
//!
//! ```
//! use canvas_core::{ApplicationGroupEntry, NullLogger};
//! use canvas_graph::{build_graph, validate_graph, BuildOptions, Datasets};
//!
//! let datasets = Datasets {
//!     structure: vec![ApplicationGroupEntry {
//!         domain: Some("Sales".into()),
//!         application: "CRM".into(),
//!         layer: None,
//!         module: "CRM_API".into(),
//!     }],
//!     ..Datasets::default()
//! };
//!
//! let graph = build_graph(&datasets, &BuildOptions::default(), &NullLogger).unwrap();
//! assert!(graph.node("A_CRM__Core__API").is_some());
//! assert!(validate_graph(&graph, false).is_ok());
//! ```

mod builder;
mod export;
mod index;
mod merge;
mod metrics;
mod parsers;
mod pipeline;
mod post_processor;
mod validate;
mod violations;

pub use builder::{GraphBuilder, GraphParts};
pub use export::{edges_to_csv, nodes_to_csv};
pub use index::GraphIndex;
pub use merge::merge_parts;
pub use metrics::{find_cohesion, find_dependency_profiles, DependencyProfiles};
pub use parsers::{
    parse_application_groups, parse_consumer_producer, parse_integrations, parse_module_details,
    propagate_module_properties,
};
pub use pipeline::{build_graph, BuildOptions, Datasets};
pub use post_processor::GraphPostProcessor;
pub use validate::validate_graph;
pub use violations::violations_graph;
