//! Runtime REST integrations observed in the logs.

use super::add_dependency;
use crate::builder::GraphBuilder;
use canvas_core::{
    DependencyType, IntegrationServiceApiEntry, LogType, Result, INTEGRATION_REFERENCE_KIND,
};

/// Links REST consumers to the module exposing the same endpoint.
///
/// Rows are grouped by `EndpointAndMethod`. A group counts only with
/// exactly one exposing row and at least one consuming row; other groups
/// are dropped. Each consumer gets a runtime `calls` edge to the producer
/// carrying its observed call count.
pub fn parse_integrations(
    builder: &mut GraphBuilder,
    entries: &[IntegrationServiceApiEntry],
) -> Result<()> {
    let mut groups: Vec<(&str, Vec<&IntegrationServiceApiEntry>)> = Vec::new();
    for entry in entries
        .iter()
        .filter(|e| e.logtype == LogType::Integration)
    {
        match groups
            .iter_mut()
            .find(|(endpoint, _)| *endpoint == entry.endpoint_and_method)
        {
            Some((_, group)) => group.push(entry),
            None => groups.push((entry.endpoint_and_method.as_str(), vec![entry])),
        }
    }

    let total = groups.len();
    let mut parsed = 0usize;
    for (_, group) in &groups {
        let mut producers = group.iter().filter(|e| e.is_producer());
        let (Some(producer), None) = (producers.next(), producers.next()) else {
            continue;
        };
        if !group.iter().any(|e| e.is_consumer()) {
            continue;
        }

        parse_grouped_integration(builder, producer, group)?;
        parsed += 1;
    }

    if parsed < total {
        builder.logger().info(&format!(
            "Ignored {} of {} integration endpoints without exactly one producer and a consumer",
            total - parsed,
            total
        ));
    }
    Ok(())
}

fn parse_grouped_integration(
    builder: &mut GraphBuilder,
    producer: &IntegrationServiceApiEntry,
    group: &[&IntegrationServiceApiEntry],
) -> Result<()> {
    let producer_id = builder.get_application_and_module(
        &producer.application_name,
        &producer.module_name,
        None,
        None,
    )?;

    for consumer in group.iter().filter(|e| e.is_consumer()) {
        let consumer_id = builder.get_application_and_module(
            &consumer.application_name,
            &consumer.module_name,
            None,
            None,
        )?;
        add_dependency(
            builder,
            &consumer_id,
            &producer_id,
            INTEGRATION_REFERENCE_KIND,
            &consumer.endpoint_and_method,
            DependencyType::Runtime,
            Some(consumer.count),
        );
    }
    Ok(())
}
