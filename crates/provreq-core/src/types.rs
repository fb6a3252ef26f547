//! Shared types for provisioning-request planning.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::{ProvisionError, ProvisionResult};

/// String-keyed field mapping as accepted by the provisioning engine.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Requester / Template
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// User on whose behalf the VMs are requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requester {
    /// Login name (e.g. "jdoe")
    pub userid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl Requester {
    pub fn new(userid: impl Into<String>) -> Self {
        Self {
            userid: userid.into(),
            email: None,
            first_name: None,
            last_name: None,
        }
    }
}

/// Template descriptor selected in the dialog. Unknown keys are carried
/// through to the payload's template fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub name: String,
    pub guid: String,
    #[serde(flatten)]
    pub extra: FieldMap,
}

impl TemplateSpec {
    pub fn new(name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guid: guid.into(),
            extra: FieldMap::new(),
        }
    }

    /// Flatten into a field mapping (`name`, `guid` and every extra key).
    pub fn to_field_map(&self) -> FieldMap {
        let mut map = self.extra.clone();
        map.insert("name".into(), self.name.clone().into());
        map.insert("guid".into(), self.guid.clone().into());
        map
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Catalog records
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub userid: String,
    pub password: String,
}

/// Management system (provider) owning a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementSystemRecord {
    pub id: String,
    pub name: String,
    /// Provider type (e.g. "ManageIQ::Providers::Redhat::InfraManager")
    pub ems_type: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub guid: String,
    pub name: String,
    #[serde(default)]
    pub ems: Option<ManagementSystemRecord>,
}

/// Infrastructure network (LAN / port group).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanRecord {
    pub name: String,
    /// Whether the backing switch is shared across hosts (distributed).
    #[serde(default)]
    pub switch_shared: bool,
}

/// Cloud subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudSubnetRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cloud_network_id: Option<String>,
    #[serde(default)]
    pub availability_zone_id: Option<String>,
}

/// A catalog hit, tagged by the catalog it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "catalog", rename_all = "camelCase")]
pub enum NetworkRecord {
    Infrastructure(LanRecord),
    Cloud(CloudSubnetRecord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkKind {
    Infrastructure,
    DistributedVswitch,
    CloudSubnet,
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Infrastructure => "infrastructure",
            Self::DistributedVswitch => "distributed-vswitch",
            Self::CloudSubnet => "cloud-subnet",
        };
        f.write_str(s)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Request handles
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvisionRequestId(pub String);

impl ProvisionRequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProvisionRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProvisionRequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProvisionRequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Handle returned by the provisioning engine for one accepted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequestHandle {
    pub id: ProvisionRequestId,
}

impl ProvisionRequestHandle {
    pub fn new(id: impl Into<ProvisionRequestId>) -> Self {
        Self { id: id.into() }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Server version
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Dotted numeric version of the automation server (e.g. "5.9.0.17").
/// Compared component-wise; missing trailing components count as zero.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerVersion {
    parts: Vec<u64>,
}

impl ServerVersion {
    pub fn parse(raw: &str) -> ProvisionResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ProvisionError::invalid_input("Server version is empty"));
        }
        let parts = raw
            .split('.')
            .map(|p| {
                p.parse::<u64>().map_err(|_| {
                    ProvisionError::invalid_input(format!("Invalid server version '{raw}'"))
                })
            })
            .collect::<ProvisionResult<Vec<_>>>()?;
        Ok(Self { parts })
    }

    pub fn from_parts(parts: Vec<u64>) -> Self {
        Self { parts }
    }

    fn component(&self, idx: usize) -> u64 {
        self.parts.get(idx).copied().unwrap_or(0)
    }
}

impl PartialEq for ServerVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for ServerVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for ServerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.parts.iter().map(u64::to_string).collect();
        f.write_str(&joined.join("."))
    }
}

impl TryFrom<String> for ServerVersion {
    type Error = ProvisionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ServerVersion> for String {
    fn from(v: ServerVersion) -> String {
        v.to_string()
    }
}
