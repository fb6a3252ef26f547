//! vNIC profile operations via the oVirt REST API.

use provreq_core::profile::NetworkProfile;

use crate::client::OvirtClient;
use crate::error::OvirtResult;
use crate::types::*;

/// vNIC profile operations.
pub struct VnicProfileManager<'a> {
    client: &'a OvirtClient,
}

impl<'a> VnicProfileManager<'a> {
    pub fn new(client: &'a OvirtClient) -> Self {
        Self { client }
    }

    /// List every vNIC profile visible to the engine user.
    pub async fn list_vnic_profiles(&self) -> OvirtResult<Vec<VnicProfile>> {
        let list = self.client.get::<VnicProfileList>("/vnicprofiles").await?;
        Ok(list.vnic_profile)
    }

    /// Profiles as `(id, name)` pairs, in engine order.
    pub async fn list_network_profiles(&self) -> OvirtResult<Vec<NetworkProfile>> {
        Ok(self
            .list_vnic_profiles()
            .await?
            .into_iter()
            .map(|p| NetworkProfile { id: p.id, name: p.name })
            .collect())
    }
}
