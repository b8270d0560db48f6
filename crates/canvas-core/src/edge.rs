//! Edge types for the landscape graph.
//!
//! Two kinds matter for assembly: `contains` builds the hierarchy and
//! `calls` records module dependencies. `violates` only appears in the
//! architecture-rule reference graph that ships alongside CSV exports.

use crate::reference::DependencyType;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// The type of relationship between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeLabel {
    /// Structural containment (domain contains application, and so on).
    Contains,

    /// Module A depends on module B.
    Calls,

    /// Sublayer A may not depend on sublayer B.
    Violates,
}

impl EdgeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Calls => "calls",
            Self::Violates => "violates",
        }
    }
}

impl std::fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Properties of an edge. Containment edges leave everything empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeProperties {
    /// Reference names grouped by reference kind.
    pub references: BTreeMap<String, Vec<String>>,

    /// Distinct dependency types folded into this edge.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependency_types: Vec<DependencyType>,

    /// Number of source references folded into this edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nr_dependencies: Option<u64>,

    /// Observed runtime call volume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nr_calls: Option<u64>,
}

/// An edge in the landscape graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: EdgeLabel,
    pub properties: EdgeProperties,
}

impl Edge {
    /// Creates an edge with empty properties.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        label: EdgeLabel,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label,
            properties: EdgeProperties::default(),
        }
    }

    /// Creates a containment edge with ID `source__target`.
    pub fn contains(source: &str, target: &str) -> Self {
        Self::new(
            format!("{}__{}", source, target),
            source,
            target,
            EdgeLabel::Contains,
        )
    }

    /// Creates a dependency edge carrying a single reference.
    pub fn calls(
        source: &str,
        target: &str,
        reference_kind: &str,
        reference_name: &str,
        dependency_type: DependencyType,
        nr_calls: Option<u64>,
    ) -> Self {
        let mut edge = Self::new(
            format!("{}__{}", source, target),
            source,
            target,
            EdgeLabel::Calls,
        );
        edge.properties
            .references
            .insert(reference_kind.to_string(), vec![reference_name.to_string()]);
        edge.properties.dependency_types = vec![dependency_type];
        edge.properties.nr_dependencies = Some(1);
        edge.properties.nr_calls = nr_calls;
        edge
    }

    /// Folds another reference into an existing dependency edge.
    ///
    /// Dependency types are appended as-is; call
    /// [`Edge::dedup_dependency_types`] once all references are in.
    pub fn fold_reference(
        &mut self,
        reference_kind: &str,
        reference_name: &str,
        dependency_type: DependencyType,
        nr_calls: Option<u64>,
    ) {
        let props = &mut self.properties;
        props.nr_dependencies = Some(props.nr_dependencies.unwrap_or(0) + 1);
        if let Some(calls) = nr_calls {
            props.nr_calls = Some(props.nr_calls.unwrap_or(0) + calls);
        }
        props
            .references
            .entry(reference_kind.to_string())
            .or_default()
            .push(reference_name.to_string());
        props.dependency_types.push(dependency_type);
    }

    /// Removes repeated dependency types, keeping first occurrences.
    pub fn dedup_dependency_types(&mut self) {
        let mut seen = Vec::with_capacity(self.properties.dependency_types.len());
        self.properties.dependency_types.retain(|t| {
            if seen.contains(t) {
                false
            } else {
                seen.push(*t);
                true
            }
        });
    }

    pub fn is_contains(&self) -> bool {
        self.label == EdgeLabel::Contains
    }

    pub fn is_calls(&self) -> bool {
        self.label == EdgeLabel::Calls
    }
}

impl Serialize for Edge {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Data<'a> {
            id: &'a str,
            source: &'a str,
            target: &'a str,
            label: EdgeLabel,
            properties: &'a EdgeProperties,
        }

        #[derive(Serialize)]
        struct Envelope<'a> {
            data: Data<'a>,
        }

        Envelope {
            data: Data {
                id: &self.id,
                source: &self.source,
                target: &self.target,
                label: self.label,
                properties: &self.properties,
            },
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_id() {
        let edge = Edge::contains("D_Sales", "A_CRM");
        assert_eq!(edge.id, "D_Sales__A_CRM");
        assert!(edge.is_contains());
        assert!(edge.properties.references.is_empty());
    }

    #[test]
    fn test_fold_reference() {
        let mut edge = Edge::calls(
            "A_X__M_A",
            "A_Y__M_B",
            "Action",
            "Save",
            DependencyType::CompileTime,
            None,
        );
        edge.fold_reference("Entity", "Customer", DependencyType::Entity, None);
        edge.fold_reference("Action", "Load", DependencyType::CompileTime, None);
        edge.dedup_dependency_types();

        assert_eq!(edge.properties.nr_dependencies, Some(3));
        assert_eq!(
            edge.properties.dependency_types,
            vec![DependencyType::CompileTime, DependencyType::Entity]
        );
        assert_eq!(
            edge.properties.references["Action"],
            vec!["Save".to_string(), "Load".to_string()]
        );
        assert_eq!(edge.properties.nr_calls, None);
    }

    #[test]
    fn test_fold_calls() {
        let mut edge = Edge::calls(
            "a",
            "b",
            "ServiceAPIMethod",
            "GET /x",
            DependencyType::Runtime,
            Some(10),
        );
        edge.fold_reference("ServiceAPIMethod", "GET /y", DependencyType::Runtime, Some(5));
        assert_eq!(edge.properties.nr_calls, Some(15));
    }

    #[test]
    fn test_label_display() {
        assert_eq!(EdgeLabel::Contains.to_string(), "contains");
        assert_eq!(EdgeLabel::Calls.to_string(), "calls");
    }
}
