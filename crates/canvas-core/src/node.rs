//! Node types for the landscape graph.
//!
//! A node is a domain, application, layer, sublayer or module. The first
//! label is always its graph layer; layer and sublayer nodes carry one
//! extra label naming their slot in the canvas.

use crate::error::{GraphError, Result};
use crate::format::{application_id, domain_id, module_id};
use crate::layers::{GraphLayer, DEFAULT_COLOR};
use serde::{Deserialize, Serialize, Serializer};

/// Role of a module relative to its application boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyProfileCategory {
    /// Not applicable (non-module nodes).
    #[default]
    #[serde(rename = "")]
    None,
    Hidden,
    Inbound,
    Outbound,
    Transit,
}

impl DependencyProfileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyProfileCategory::None => "",
            DependencyProfileCategory::Hidden => "hidden",
            DependencyProfileCategory::Inbound => "inbound",
            DependencyProfileCategory::Outbound => "outbound",
            DependencyProfileCategory::Transit => "transit",
        }
    }
}

impl std::fmt::Display for DependencyProfileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Size and count metrics from the module-details dataset.
///
/// Unset until a details record names the module, or until the values are
/// summed up the containment tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDetails {
    #[serde(rename = "fileSizeKB", skip_serializing_if = "Option::is_none")]
    pub file_size_kb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nr_screens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nr_entities: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nr_public_elements: Option<u64>,
    #[serde(rename = "nrRESTConsumers", skip_serializing_if = "Option::is_none")]
    pub nr_rest_consumers: Option<u64>,
    #[serde(rename = "nrRESTProducers", skip_serializing_if = "Option::is_none")]
    pub nr_rest_producers: Option<u64>,
}

impl ModuleDetails {
    /// Property names as they appear in exported graphs.
    pub const PROPERTY_NAMES: [&'static str; 6] = [
        "fileSizeKB",
        "nrScreens",
        "nrEntities",
        "nrPublicElements",
        "nrRESTConsumers",
        "nrRESTProducers",
    ];

    /// All six metrics set to zero.
    pub fn zero() -> Self {
        Self {
            file_size_kb: Some(0.0),
            nr_screens: Some(0),
            nr_entities: Some(0),
            nr_public_elements: Some(0),
            nr_rest_consumers: Some(0),
            nr_rest_producers: Some(0),
        }
    }

    /// Adds another module's metrics, counting unset values as zero.
    pub fn accumulate(&mut self, other: &ModuleDetails) {
        fn add<T: Copy + Default + std::ops::Add<Output = T>>(a: &mut Option<T>, b: Option<T>) {
            *a = Some(a.unwrap_or_default() + b.unwrap_or_default());
        }
        add(&mut self.file_size_kb, other.file_size_kb);
        add(&mut self.nr_screens, other.nr_screens);
        add(&mut self.nr_entities, other.nr_entities);
        add(&mut self.nr_public_elements, other.nr_public_elements);
        add(&mut self.nr_rest_consumers, other.nr_rest_consumers);
        add(&mut self.nr_rest_producers, other.nr_rest_producers);
    }

    /// Name of the first metric that is unset, if any.
    pub fn first_missing(&self) -> Option<&'static str> {
        let present = [
            self.file_size_kb.is_some(),
            self.nr_screens.is_some(),
            self.nr_entities.is_some(),
            self.nr_public_elements.is_some(),
            self.nr_rest_consumers.is_some(),
            self.nr_rest_producers.is_some(),
        ];
        present
            .iter()
            .position(|p| !p)
            .map(|i| Self::PROPERTY_NAMES[i])
    }
}

/// Properties shared by every node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperties {
    pub full_name: String,
    pub simple_name: String,
    pub color: String,
    pub dependency_profile_category: DependencyProfileCategory,
    pub cohesion: f64,
    #[serde(flatten)]
    pub details: ModuleDetails,
}

impl NodeProperties {
    pub fn named(full_name: impl Into<String>, simple_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            simple_name: simple_name.into(),
            color: DEFAULT_COLOR.to_string(),
            dependency_profile_category: DependencyProfileCategory::None,
            cohesion: 0.0,
            details: ModuleDetails::default(),
        }
    }
}

/// A node in the landscape graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub labels: Vec<String>,
    pub properties: NodeProperties,
}

impl Node {
    pub fn new(id: impl Into<String>, labels: Vec<String>, properties: NodeProperties) -> Self {
        Self {
            id: id.into(),
            labels,
            properties,
        }
    }

    /// Creates a domain node. Fails on a blank name.
    pub fn domain(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(GraphError::empty_name("domain"));
        }
        Ok(Self::new(
            domain_id(name),
            vec![GraphLayer::Domain.to_string()],
            NodeProperties::named(name, name),
        ))
    }

    /// Creates an application node. Fails on a blank name.
    pub fn application(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(GraphError::empty_name("application"));
        }
        Ok(Self::new(
            application_id(name),
            vec![GraphLayer::Application.to_string()],
            NodeProperties::named(name, name),
        ))
    }

    /// Creates a module node scoped to its application. Fails on a blank
    /// module name.
    pub fn module(application_name: &str, name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(GraphError::empty_name("module"));
        }
        let mut properties = NodeProperties::named(name, name);
        properties.dependency_profile_category = DependencyProfileCategory::Hidden;
        Ok(Self::new(
            module_id(application_name, name),
            vec![GraphLayer::Module.to_string()],
            properties,
        ))
    }

    /// The graph layer named by the node's first recognised label.
    pub fn layer(&self) -> Option<GraphLayer> {
        self.labels.iter().find_map(|l| GraphLayer::from_label(l))
    }

    /// Whether any label names the given layer.
    pub fn is(&self, layer: GraphLayer) -> bool {
        self.labels.iter().any(|l| l == layer.as_str())
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Data<'a> {
            id: &'a str,
            labels: &'a [String],
            properties: &'a NodeProperties,
        }

        #[derive(Serialize)]
        struct Envelope<'a> {
            data: Data<'a>,
        }

        Envelope {
            data: Data {
                id: &self.id,
                labels: &self.labels,
                properties: &self.properties,
            },
        }
        .serialize(serializer)
    }
}
