//! Static references between modules.

use super::add_dependency;
use crate::builder::GraphBuilder;
use canvas_core::{
    dependency_type_for_kind, ConsumerProducerEntry, DependencyType, IntegrationServiceApiEntry,
    LogType, Result,
};

/// Turns every consumer/producer reference into a `calls` edge, folding
/// references between the same pair of modules into one edge.
///
/// Runtime references pick up their call volume from the first service API
/// row whose endpoint matches the reference name.
pub fn parse_consumer_producer(
    builder: &mut GraphBuilder,
    entries: &[ConsumerProducerEntry],
    service_apis: &[IntegrationServiceApiEntry],
) -> Result<()> {
    for entry in entries {
        let producer = builder.get_application_and_module(
            &entry.prod_application,
            &entry.prod_module,
            None,
            None,
        )?;
        let consumer = builder.get_application_and_module(
            &entry.cons_application,
            &entry.cons_module,
            None,
            None,
        )?;

        let dependency_type = dependency_type_for_kind(&entry.reference_kind)?;
        let nr_calls = (dependency_type == DependencyType::Runtime).then(|| {
            service_apis
                .iter()
                .filter(|e| e.logtype == LogType::ServiceApi)
                .find(|e| e.endpoint_and_method == entry.reference_name)
                .map_or(0, |e| e.count)
        });

        add_dependency(
            builder,
            &consumer,
            &producer,
            &entry.reference_kind,
            &entry.reference_name,
            dependency_type,
            nr_calls,
        );
    }

    for edge in builder.parts_mut().dependency_edges.iter_mut() {
        edge.dedup_dependency_types();
    }
    Ok(())
}
