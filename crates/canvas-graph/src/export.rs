//! CSV rendering in the Neo4j admin-import layout.
//!
//! Rows end with `\r\n` except the last one. Unset values render as empty
//! fields; references are embedded as a JSON object.

use canvas_core::{Edge, Node};
use csv::{Terminator, Writer, WriterBuilder};

const NODE_HEADERS: [&str; 13] = [
    "id:ID",
    ":LABEL",
    "fullName",
    "simpleName",
    "color",
    "dependencyProfileCategory",
    "cohesion",
    "fileSizeKB:INT",
    "nrScreens:INT",
    "nrEntities:INT",
    "nrPublicElements:INT",
    "nrRESTConsumers:INT",
    "nrRESTProducers:INT",
];

const EDGE_HEADERS: [&str; 8] = [
    "id",
    ":TYPE",
    ":START_ID",
    ":END_ID",
    "references",
    "dependencyTypes",
    "nrDependencies:INT",
    "nrCalls:INT",
];

fn new_writer(headers: &[&str], header: bool) -> csv::Result<Writer<Vec<u8>>> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());
    if header {
        writer.write_record(headers)?;
    }
    Ok(writer)
}

fn finish(writer: Writer<Vec<u8>>) -> csv::Result<Vec<u8>> {
    let mut bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    if bytes.ends_with(b"\r\n") {
        bytes.truncate(bytes.len() - 2);
    }
    Ok(bytes)
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Renders nodes, one row per node.
pub fn nodes_to_csv(nodes: &[Node], header: bool) -> csv::Result<Vec<u8>> {
    let mut writer = new_writer(&NODE_HEADERS, header)?;
    for node in nodes {
        let props = &node.properties;
        let details = &props.details;
        writer.write_record([
            node.id.clone(),
            node.labels.join(";"),
            props.full_name.clone(),
            props.simple_name.clone(),
            props.color.clone(),
            props.dependency_profile_category.to_string(),
            props.cohesion.to_string(),
            optional(details.file_size_kb),
            optional(details.nr_screens),
            optional(details.nr_entities),
            optional(details.nr_public_elements),
            optional(details.nr_rest_consumers),
            optional(details.nr_rest_producers),
        ])?;
    }
    finish(writer)
}

/// Renders edges, one row per edge.
pub fn edges_to_csv(edges: &[Edge], header: bool) -> csv::Result<Vec<u8>> {
    let mut writer = new_writer(&EDGE_HEADERS, header)?;
    for edge in edges {
        let props = &edge.properties;
        let dependency_types: Vec<&str> =
            props.dependency_types.iter().map(|t| t.as_str()).collect();
        writer.write_record([
            edge.id.clone(),
            edge.label.as_str().to_uppercase(),
            edge.source.clone(),
            edge.target.clone(),
            serde_json::to_string(&props.references).unwrap_or_default(),
            dependency_types.join("|"),
            optional(props.nr_dependencies),
            optional(props.nr_calls),
        ])?;
    }
    finish(writer)
}
