//! Reference kinds and the dependency types they map to.
//!
//! Follows the OutSystems distinction between strong (compile-time), weak
//! (runtime) and entity dependencies.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};

/// Kind of dependency a `calls` edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    CompileTime,
    Runtime,
    Entity,
}

impl DependencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::CompileTime => "compile_time",
            DependencyType::Runtime => "runtime",
            DependencyType::Entity => "entity",
        }
    }
}

impl std::fmt::Display for DependencyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference kind used for edges created from the integration dataset.
pub const INTEGRATION_REFERENCE_KIND: &str = "Integration";

/// Maps a consumer/producer reference kind onto its dependency type.
pub fn dependency_type_for_kind(kind: &str) -> Result<DependencyType> {
    let dependency_type = match kind {
        "Action" | "ClientAction" | "WebBlock" | "Image" | "Script" | "Theme" | "Role"
        | "Resource" | "FlowExceptionHandlingFlow" | "Process" => DependencyType::CompileTime,
        "Entity" | "StaticEntity" | "ClientEntity" => DependencyType::Entity,
        // Integration never shows up in consumer/producer exports; the
        // integration dataset produces these edges itself.
        "Structure" | "WebScreen" | "ServiceAPIMethod" | INTEGRATION_REFERENCE_KIND => {
            DependencyType::Runtime
        }
        other => return Err(GraphError::UnknownReferenceKind(other.to_string())),
    };
    Ok(dependency_type)
}
