//! Identifier sanitization.
//!
//! Every generated node and edge ID goes through [`format_name`], so two
//! calls with the same logical name always land on the same ID. Case and
//! Unicode are left alone.

/// Turns a human-readable name (or name path) into a graph-safe identifier.
pub fn format_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            ' ' | '-' => out.push('_'),
            '&' => out.push_str("and"),
            '+' => out.push_str("plus"),
            '/' | '(' | ')' | '.' => {}
            other => out.push(other),
        }
    }
    out
}

pub fn domain_id(domain_name: &str) -> String {
    format_name(&format!("D_{}", domain_name))
}

pub fn application_id(application_name: &str) -> String {
    format_name(&format!("A_{}", application_name))
}

pub fn module_id(application_name: &str, module_name: &str) -> String {
    format_name(&format!("A_{}__M_{}", application_name, module_name))
}

/// ID of a layer container inside an application. Without a layer this is
/// the application itself.
pub fn application_with_layer_id(application_id: &str, layer: Option<&str>) -> String {
    match layer {
        Some(layer) if !layer.is_empty() => format_name(&format!("{}__{}", application_id, layer)),
        _ => application_id.to_string(),
    }
}

/// ID of a sublayer container inside an application.
///
/// Omitting the layer and sublayer degrades to the application ID.
pub fn application_with_sublayer_id(
    application_id: &str,
    layer: Option<&str>,
    sublayer: Option<&str>,
) -> String {
    let with_layer = application_with_layer_id(application_id, layer);
    match sublayer {
        Some(sublayer) if !sublayer.is_empty() => {
            format_name(&format!("{}__{}", with_layer, sublayer))
        }
        _ => with_layer,
    }
}

/// Recovers the application ID a layer or sublayer ID was built from.
pub fn application_id_from_layer_id(layer_id: &str) -> &str {
    layer_id.split("__").next().unwrap_or(layer_id)
}
