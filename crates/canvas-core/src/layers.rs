//! The fixed architecture taxonomy.
//!
//! Graph layers name the tiers of the containment hierarchy. Module layers
//! and sublayers follow the OutSystems Architecture Canvas; their string
//! values end up in node IDs and in exported CSV, so they must not change.

use serde::{Deserialize, Serialize};

/// Colour of domain, application and unclassified nodes.
pub const DEFAULT_COLOR: &str = "#7B7D7D";

/// Tier of a node in the containment hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GraphLayer {
    Domain,
    Application,
    Layer,
    Sublayer,
    Module,
}

impl GraphLayer {
    pub const ALL: [GraphLayer; 5] = [
        GraphLayer::Domain,
        GraphLayer::Application,
        GraphLayer::Layer,
        GraphLayer::Sublayer,
        GraphLayer::Module,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GraphLayer::Domain => "Domain",
            GraphLayer::Application => "Application",
            GraphLayer::Layer => "Layer",
            GraphLayer::Sublayer => "Sublayer",
            GraphLayer::Module => "Module",
        }
    }

    /// Parses a node label back into a graph layer.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == label)
    }

    /// Structural tiers are the ones synthesized per application.
    pub fn is_structural(&self) -> bool {
        matches!(self, GraphLayer::Layer | GraphLayer::Sublayer)
    }
}

impl std::fmt::Display for GraphLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Architecture Canvas layer of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleLayer {
    #[serde(rename = "Enduser")]
    EndUser,
    Core,
    Foundation,
}

impl ModuleLayer {
    pub const ALL: [ModuleLayer; 3] = [
        ModuleLayer::EndUser,
        ModuleLayer::Core,
        ModuleLayer::Foundation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleLayer::EndUser => "Enduser",
            ModuleLayer::Core => "Core",
            ModuleLayer::Foundation => "Foundation",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ModuleLayer::EndUser => "#3498DB",
            ModuleLayer::Core => "#E67E22",
            ModuleLayer::Foundation => "#28B463",
        }
    }

    /// Sublayers of this layer, in canvas order.
    pub fn sublayers(&self) -> &'static [Sublayer] {
        match self {
            ModuleLayer::EndUser => &[Sublayer::EndUser],
            ModuleLayer::Core => &[
                Sublayer::Core,
                Sublayer::Api,
                Sublayer::CoreWidgets,
                Sublayer::CompositeLogic,
                Sublayer::CoreService,
            ],
            ModuleLayer::Foundation => &[
                Sublayer::Foundation,
                Sublayer::StyleGuide,
                Sublayer::FoundationService,
                Sublayer::Library,
            ],
        }
    }
}

impl std::fmt::Display for ModuleLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sublayer within a module layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sublayer {
    #[serde(rename = "Enduser")]
    EndUser,
    Core,
    #[serde(rename = "API")]
    Api,
    CoreWidgets,
    CompositeLogic,
    CoreService,
    Foundation,
    StyleGuide,
    FoundationService,
    Library,
}

impl Sublayer {
    /// All sublayers in canvas order (Enduser, Core tier, Foundation tier).
    pub const ALL: [Sublayer; 10] = [
        Sublayer::EndUser,
        Sublayer::Core,
        Sublayer::Api,
        Sublayer::CoreWidgets,
        Sublayer::CompositeLogic,
        Sublayer::CoreService,
        Sublayer::Foundation,
        Sublayer::StyleGuide,
        Sublayer::FoundationService,
        Sublayer::Library,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sublayer::EndUser => "Enduser",
            Sublayer::Core => "Core",
            Sublayer::Api => "API",
            Sublayer::CoreWidgets => "CoreWidgets",
            Sublayer::CompositeLogic => "CompositeLogic",
            Sublayer::CoreService => "CoreService",
            Sublayer::Foundation => "Foundation",
            Sublayer::StyleGuide => "StyleGuide",
            Sublayer::FoundationService => "FoundationService",
            Sublayer::Library => "Library",
        }
    }

    /// The module layer this sublayer belongs to.
    pub fn layer(&self) -> ModuleLayer {
        match self {
            Sublayer::EndUser => ModuleLayer::EndUser,
            Sublayer::Core
            | Sublayer::Api
            | Sublayer::CoreWidgets
            | Sublayer::CompositeLogic
            | Sublayer::CoreService => ModuleLayer::Core,
            Sublayer::Foundation
            | Sublayer::StyleGuide
            | Sublayer::FoundationService
            | Sublayer::Library => ModuleLayer::Foundation,
        }
    }
}

impl std::fmt::Display for Sublayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (layer, sublayer) slot a module can be placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Classification {
    pub layer: ModuleLayer,
    pub sublayer: Sublayer,
}

impl Classification {
    pub fn of(sublayer: Sublayer) -> Self {
        Self {
            layer: sublayer.layer(),
            sublayer,
        }
    }
}

/// Classifies a module by the token after its last underscore, falling
/// back to the token before its first underscore, then to Enduser.
pub fn module_suffix_to_layers(module_name: &str) -> Classification {
    let suffix = module_name.rsplit('_').next().unwrap_or_default();
    let by_suffix = match suffix.to_lowercase().as_str() {
        "api" => Some(Sublayer::Api),
        "cw" => Some(Sublayer::CoreWidgets),
        "cs" | "data" => Some(Sublayer::CoreService),
        "core" => Some(Sublayer::Core),
        "bl" | "sa" => Some(Sublayer::CompositeLogic),
        "theme" | "thm" | "th" => Some(Sublayer::StyleGuide),
        "is" => Some(Sublayer::FoundationService),
        "lib" | "drv" => Some(Sublayer::Library),
        _ => None,
    };
    if let Some(sublayer) = by_suffix {
        return Classification::of(sublayer);
    }

    let prefix = module_name.split('_').next().unwrap_or_default();
    if prefix.eq_ignore_ascii_case("cdm") {
        return Classification::of(Sublayer::Library);
    }

    Classification::of(Sublayer::EndUser)
}

/// Upper-cases the first letter of every word and drops whitespace,
/// so "composite logic" becomes "CompositeLogic".
fn pascalize(s: &str) -> String {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut out = String::with_capacity(s.len());
    let mut prev_is_word = false;
    for c in s.chars() {
        let word = is_word(c);
        if word && !prev_is_word {
            out.extend(c.to_uppercase());
        } else if !c.is_whitespace() {
            out.push(c);
        }
        prev_is_word = word;
    }
    out
}

/// Resolves a free-text sublayer name from a dataset.
///
/// Returns `None` when the name matches no known sublayer.
pub fn sublayer_name_to_layers(sublayer_name: &str) -> Option<Classification> {
    let parsed = pascalize(sublayer_name);
    Sublayer::ALL
        .into_iter()
        .find(|s| s.as_str() == parsed)
        .map(Classification::of)
}
