//! Canvas Core - Landscape graph model
//!
//! This crate holds the data model shared by the assembly engine and the
//! CLI: nodes, edges, the architecture taxonomy, identifier rules and the
//! dataset record contracts.
//!
//! # Example
//!
//! ```
//! use canvas_core::{module_suffix_to_layers, ModuleLayer, Sublayer};
//!
//! let slot = module_suffix_to_layers("Orders_API");
//! assert_eq!(slot.layer, ModuleLayer::Core);
//! assert_eq!(slot.sublayer, Sublayer::Api);
//! ```

pub mod edge;
pub mod error;
pub mod format;
pub mod graph;
pub mod layers;
pub mod logger;
pub mod node;
pub mod records;
pub mod reference;

pub use edge::{Edge, EdgeLabel, EdgeProperties};
pub use error::{GraphError, Result, ValidationError};
pub use format::format_name;
pub use graph::{Elements, Graph, GraphStats};
pub use layers::{
    module_suffix_to_layers, sublayer_name_to_layers, Classification, GraphLayer, ModuleLayer,
    Sublayer, DEFAULT_COLOR,
};
pub use logger::{Logger, NullLogger, TracingLogger};
pub use node::{DependencyProfileCategory, ModuleDetails, Node, NodeProperties};
pub use records::{
    ApplicationGroupEntry, ConsumerProducerEntry, IntegrationServiceApiEntry, LogType,
    ModuleDetailsEntry, RecordError,
};
pub use reference::{dependency_type_for_kind, DependencyType, INTEGRATION_REFERENCE_KIND};

/// Simple name of the domain that collects applications nobody classified.
pub const UNCLASSIFIED_DOMAIN_NAME: &str = "no_domain";
