//! [`NetworkProfileResolver`] backed by the oVirt engine.

use async_trait::async_trait;
use provreq_core::error::ProvisionResult;
use provreq_core::profile::{select_profile, NetworkProfileResolver};
use provreq_core::types::ManagementSystemRecord;

use crate::client::OvirtClient;
use crate::error::OvirtResult;
use crate::types::OvirtConfig;
use crate::vnic::VnicProfileManager;

/// Looks vNIC profiles up on the engine behind a management-system record.
/// Every call opens its own client and drops it before returning.
#[derive(Debug, Clone)]
pub struct OvirtVnicProfileResolver {
    insecure: bool,
    timeout_secs: u64,
    api_url: Option<String>,
}

impl Default for OvirtVnicProfileResolver {
    fn default() -> Self {
        let defaults = OvirtConfig::default();
        Self {
            insecure: defaults.insecure,
            timeout_secs: defaults.timeout_secs,
            api_url: None,
        }
    }
}

impl OvirtVnicProfileResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Use a fixed API root instead of the one derived from the record.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    fn client_for(&self, ems: &ManagementSystemRecord) -> OvirtResult<OvirtClient> {
        let config = OvirtConfig {
            insecure: self.insecure,
            timeout_secs: self.timeout_secs,
            ..OvirtConfig::from_ems(ems)?
        };
        match self.api_url {
            Some(ref url) => OvirtClient::with_base_url(&config, url),
            None => OvirtClient::new(&config),
        }
    }
}

#[async_trait]
impl NetworkProfileResolver for OvirtVnicProfileResolver {
    async fn resolve_profile_id(
        &self,
        ems: &ManagementSystemRecord,
        profile_name: &str,
    ) -> ProvisionResult<String> {
        let client = self.client_for(ems)?;
        log::info!("Resolving vNIC profile '{profile_name}' on {}", client.base_url());

        client.test().await?;
        let profiles = VnicProfileManager::new(&client).list_network_profiles().await?;
        let profile = select_profile(&profiles, profile_name)?;

        log::info!("vNIC profile '{profile_name}' => {}", profile.id);
        Ok(profile.id.clone())
    }
}
