//! Module size and element counts.

use crate::builder::GraphBuilder;
use crate::index::GraphIndex;
use canvas_core::{Edge, ModuleDetails, ModuleDetailsEntry, Node, Result};

/// Sets the metrics of every listed module. A module listed twice keeps
/// the values of its last row.
pub fn parse_module_details(
    builder: &mut GraphBuilder,
    entries: &[ModuleDetailsEntry],
) -> Result<()> {
    for entry in entries {
        let module_id = builder.get_application_and_module(
            &entry.application_name,
            &entry.module_name,
            None,
            None,
        )?;
        if let Some(module) = builder.get_node_mut(&module_id) {
            module.properties.details = ModuleDetails {
                file_size_kb: entry.file_size_kb,
                nr_screens: entry.count_screens,
                nr_entities: entry.count_entities,
                nr_public_elements: entry.count_public_elements,
                nr_rest_consumers: entry.count_rest_consumer,
                nr_rest_producers: entry.count_rest_producer,
            };
        }
    }
    Ok(())
}

/// Sums module metrics up the containment tree.
///
/// Every node ends up with the totals over the leaves below it; a node
/// without children is its own leaf. Unset values count as zero, so after
/// this pass every metric is set on every node.
pub fn propagate_module_properties(nodes: &mut [Node], edges: &[Edge]) {
    let totals: Vec<ModuleDetails> = {
        let index = GraphIndex::new(nodes, edges);
        nodes
            .iter()
            .map(|node| {
                let mut total = ModuleDetails::zero();
                for leaf in index.leaves(&node.id) {
                    total.accumulate(&leaf.properties.details);
                }
                total
            })
            .collect()
    };

    for (node, total) in nodes.iter_mut().zip(totals) {
        node.properties.details = total;
    }
}
