//! Dataset record contracts.
//!
//! Each dataset is a workbook export converted to a JSON array of row
//! objects. Column names are fixed; older exports with different headers
//! have to be renamed before they are fed in.
//!
//! OutSystems guarantees application and module names are unique within an
//! environment. When several environments are merged and a module shows up
//! twice, the first containment wins.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `direction` value of the producing side of an integration.
pub const REST_EXPOSE: &str = "REST (Expose)";

/// `direction` value of a consuming side of an integration.
pub const REST_CONSUME: &str = "REST (Consume)";

/// Domain/application/module containment, optionally with an explicit sublayer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationGroupEntry {
    #[serde(rename = "Domain", default)]
    pub domain: Option<String>,
    #[serde(rename = "Application")]
    pub application: String,
    /// Free-text sublayer name, e.g. "Core Widgets".
    #[serde(rename = "Layer", default)]
    pub layer: Option<String>,
    #[serde(rename = "Module")]
    pub module: String,
}

/// One reference from a consumer module to a producer module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumerProducerEntry {
    #[serde(rename = "Cons_Application")]
    pub cons_application: String,
    #[serde(rename = "Cons_Module")]
    pub cons_module: String,
    #[serde(rename = "Prod_Application")]
    pub prod_application: String,
    #[serde(rename = "Prod_Module")]
    pub prod_module: String,
    /// Name of the referenced element, e.g. `GetCustomers`.
    #[serde(rename = "Reference_Name")]
    pub reference_name: String,
    /// Kind of the referenced element, e.g. `Action`.
    #[serde(rename = "Reference_Kind")]
    pub reference_kind: String,
}

/// Which log an API-usage row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogType {
    /// Unregistered REST integrations.
    Integration,
    /// Registered service API calls.
    #[serde(rename = "ServiceAPI")]
    ServiceApi,
}

/// A row of dynamic API usage, summed over the export's time frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationServiceApiEntry {
    #[serde(rename = "ApplicationName")]
    pub application_name: String,
    #[serde(rename = "ModuleName")]
    pub module_name: String,
    #[serde(rename = "EndpointAndMethod")]
    pub endpoint_and_method: String,
    /// [`REST_EXPOSE`], [`REST_CONSUME`] or something we ignore.
    pub direction: String,
    pub logtype: LogType,
    #[serde(default)]
    pub count: u64,
}

impl IntegrationServiceApiEntry {
    pub fn is_producer(&self) -> bool {
        self.direction == REST_EXPOSE
    }

    pub fn is_consumer(&self) -> bool {
        self.direction == REST_CONSUME
    }
}

/// Size and element counts for one module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleDetailsEntry {
    #[serde(rename = "ApplicationName")]
    pub application_name: String,
    #[serde(rename = "ModuleName")]
    pub module_name: String,
    #[serde(rename = "FileSizeKB", default)]
    pub file_size_kb: Option<f64>,
    #[serde(rename = "Count_Screens", default)]
    pub count_screens: Option<u64>,
    #[serde(rename = "Count_Entities", default)]
    pub count_entities: Option<u64>,
    #[serde(rename = "Count_PublicElements", default)]
    pub count_public_elements: Option<u64>,
    #[serde(rename = "Count_REST_Consumer", default)]
    pub count_rest_consumer: Option<u64>,
    #[serde(rename = "Count_REST_Producer", default)]
    pub count_rest_producer: Option<u64>,
}

/// Splits API-usage rows into (integration rows, service API rows).
pub fn split_by_log_type(
    entries: Vec<IntegrationServiceApiEntry>,
) -> (Vec<IntegrationServiceApiEntry>, Vec<IntegrationServiceApiEntry>) {
    entries
        .into_iter()
        .partition(|e| e.logtype == LogType::Integration)
}

/// A dataset export that could not be decoded.
#[derive(Error, Debug)]
#[error("Malformed {dataset} dataset: {source}")]
pub struct RecordError {
    pub dataset: &'static str,
    #[source]
    pub source: serde_json::Error,
}

/// Decodes a JSON array of dataset rows.
pub fn parse_records<T: DeserializeOwned>(
    dataset: &'static str,
    json: &str,
) -> Result<Vec<T>, RecordError> {
    serde_json::from_str(json).map_err(|source| RecordError { dataset, source })
}
