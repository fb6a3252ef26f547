//! Planner configuration.
//!
//! Every field has a default so an empty JSON object (or no file at all)
//! yields the stock behaviour: one request per VM, unresolved networks
//! degrade to a bare infrastructure placement, and vNIC profile lookup is
//! enabled for Red Hat providers on servers 5.9 and newer.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ProvisionError, ProvisionResult};
use crate::types::ServerVersion;

/// What to do when a network name is in neither catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedNetworkPolicy {
    /// Continue with an infrastructure placement using the raw name.
    Degrade,
    /// Fail the template with `NotFound`.
    Fail,
}

impl Default for UnresolvedNetworkPolicy {
    fn default() -> Self {
        Self::Degrade
    }
}

/// Gate for provider-native vNIC profile lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VnicProfilePolicy {
    /// Substring of the management-system type that selects the lookup
    #[serde(default = "default_provider_marker")]
    pub provider_marker: String,
    /// Lowest automation-server version that uses profile ids
    #[serde(default = "default_min_server_version")]
    pub min_server_version: ServerVersion,
}

fn default_provider_marker() -> String {
    "Redhat".into()
}

fn default_min_server_version() -> ServerVersion {
    ServerVersion::from_parts(vec![5, 9])
}

impl Default for VnicProfilePolicy {
    fn default() -> Self {
        Self {
            provider_marker: default_provider_marker(),
            min_server_version: default_min_server_version(),
        }
    }
}

impl VnicProfilePolicy {
    /// Whether a template on `ems_type` hosted by `server` uses profile ids.
    pub fn applies(&self, ems_type: &str, server: &ServerVersion) -> bool {
        ems_type.contains(&self.provider_marker) && *server >= self.min_server_version
    }
}

/// Top-level planner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerConfig {
    /// One request per VM (true) or one request per template (false)
    #[serde(default = "default_true")]
    pub separate_requests: bool,
    /// Log every input and payload
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub unresolved_network: UnresolvedNetworkPolicy,
    /// Name prefix marking a distributed virtual switch port group
    #[serde(default = "default_dvs_prefix")]
    pub distributed_switch_prefix: String,
    #[serde(default)]
    pub vnic_profile: VnicProfilePolicy,
    /// Payload version handed to the provisioning engine
    #[serde(default = "default_request_version")]
    pub request_version: String,
}

fn default_true() -> bool {
    true
}
fn default_dvs_prefix() -> String {
    "dvs_".into()
}
fn default_request_version() -> String {
    "1.1".into()
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            separate_requests: true,
            debug: false,
            unresolved_network: UnresolvedNetworkPolicy::default(),
            distributed_switch_prefix: default_dvs_prefix(),
            vnic_profile: VnicProfilePolicy::default(),
            request_version: default_request_version(),
        }
    }
}

impl PlannerConfig {
    pub fn from_json_str(json: &str) -> ProvisionResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ProvisionError::parse(format!("Invalid planner config: {e}")))
    }

    pub fn from_file(path: impl AsRef<Path>) -> ProvisionResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ProvisionError::invalid_input(format!(
                "Cannot read planner config {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&raw)
    }

    /// Like [`from_file`](Self::from_file) but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> ProvisionResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No planner config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn with_separate_requests(mut self, separate: bool) -> Self {
        self.separate_requests = separate;
        self
    }
}
