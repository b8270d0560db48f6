//! Dataset parsers.
//!
//! Each parser drives its own [`GraphBuilder`](crate::GraphBuilder) with the
//! rows of one dataset. The resulting parts are merged afterwards.

mod application_group;
mod consumer_producer;
mod integration;
mod module_details;

pub use application_group::parse_application_groups;
pub use consumer_producer::parse_consumer_producer;
pub use integration::parse_integrations;
pub use module_details::{parse_module_details, propagate_module_properties};

use crate::builder::GraphBuilder;
use canvas_core::{DependencyType, Edge};

/// Adds a reference from `consumer` to `producer`, folding it into the
/// existing `calls` edge between the two modules if there is one.
pub(crate) fn add_dependency(
    builder: &mut GraphBuilder,
    consumer: &str,
    producer: &str,
    reference_kind: &str,
    reference_name: &str,
    dependency_type: DependencyType,
    nr_calls: Option<u64>,
) {
    let id = format!("{}__{}", consumer, producer);
    match builder.get_dependency_edge_mut(&id) {
        Some(edge) => {
            edge.fold_reference(reference_kind, reference_name, dependency_type, nr_calls)
        }
        None => builder.push_dependency_edge(Edge::calls(
            consumer,
            producer,
            reference_kind,
            reference_name,
            dependency_type,
            nr_calls,
        )),
    }
}
