use provreq_core::types::ManagementSystemRecord;
use serde::{Deserialize, Serialize};

use crate::error::{OvirtError, OvirtResult};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Connection settings for an oVirt engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvirtConfig {
    /// Engine hostname / IP (e.g. "rhvm.lab.local")
    pub host: String,
    /// Port (default 443)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Username (e.g. "admin@internal")
    pub username: String,
    /// Password
    pub password: String,
    /// Skip TLS certificate verification
    #[serde(default = "default_insecure")]
    pub insecure: bool,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 { 443 }
fn default_insecure() -> bool { true }
fn default_timeout() -> u64 { 30 }

impl Default for OvirtConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 443,
            username: String::new(),
            password: String::new(),
            insecure: true,
            timeout_secs: 30,
        }
    }
}

impl OvirtConfig {
    /// Connection settings for a management-system record. A record without
    /// a hostname is a connection error, one without credentials an
    /// authentication error.
    pub fn from_ems(ems: &ManagementSystemRecord) -> OvirtResult<Self> {
        let host = ems
            .hostname
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| {
                OvirtError::connection(format!("Management system '{}' has no hostname", ems.name))
            })?;
        let credentials = ems.credentials.as_ref().ok_or_else(|| {
            OvirtError::auth(format!("Management system '{}' has no credentials", ems.name))
        })?;

        Ok(Self {
            host: host.to_string(),
            port: ems.port.unwrap_or_else(default_port),
            username: credentials.userid.clone(),
            password: credentials.password.clone(),
            ..Self::default()
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  vNIC profiles
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Reference to another engine object (`{"href": ..., "id": ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: String,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VnicProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Logical network the profile belongs to
    #[serde(default)]
    pub network: Option<ObjectRef>,
}

/// `GET /vnicprofiles` body. An empty collection comes back as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VnicProfileList {
    #[serde(default)]
    pub vnic_profile: Vec<VnicProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use provreq_core::types::Credentials;

    fn ems() -> ManagementSystemRecord {
        ManagementSystemRecord {
            id: "1".into(),
            name: "rhv".into(),
            ems_type: "ManageIQ::Providers::Redhat::InfraManager".into(),
            hostname: Some("rhvm.lab.local".into()),
            port: None,
            credentials: Some(Credentials {
                userid: "admin@internal".into(),
                password: "secret".into(),
            }),
        }
    }

    #[test]
    fn config_from_record() {
        let cfg = OvirtConfig::from_ems(&ems()).unwrap();
        assert_eq!(cfg.host, "rhvm.lab.local");
        assert_eq!(cfg.port, 443);
        assert_eq!(cfg.username, "admin@internal");
        assert!(cfg.insecure);
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn record_without_hostname_or_credentials() {
        let mut record = ems();
        record.hostname = Some("  ".into());
        let err = OvirtConfig::from_ems(&record).unwrap_err();
        assert_eq!(err.kind, crate::error::OvirtErrorKind::ConnectionError);

        let mut record = ems();
        record.credentials = None;
        let err = OvirtConfig::from_ems(&record).unwrap_err();
        assert_eq!(err.kind, crate::error::OvirtErrorKind::AuthenticationError);
    }

    #[test]
    fn profile_list_parsing() {
        let body = r#"{"vnic_profile":[
            {"href":"/ovirt-engine/api/vnicprofiles/a1","id":"a1","name":"ovirtmgmt",
             "network":{"href":"/ovirt-engine/api/networks/n1","id":"n1"}},
            {"id":"b2","name":"prod","description":"production"}
        ]}"#;
        let list: VnicProfileList = serde_json::from_str(body).unwrap();
        assert_eq!(list.vnic_profile.len(), 2);
        assert_eq!(list.vnic_profile[0].network.as_ref().map(|n| n.id.as_str()), Some("n1"));
        assert_eq!(list.vnic_profile[1].description.as_deref(), Some("production"));

        let empty: VnicProfileList = serde_json::from_str("{}").unwrap();
        assert!(empty.vnic_profile.is_empty());
    }
}
