//! Catalog lookups (networks, cloud subnets, templates).
//!
//! The planner only depends on the [`Inventory`] contract. [`StaticInventory`]
//! is an in-memory implementation for embedding and tests.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::ProvisionResult;
use crate::types::*;

/// Read-only access to the provider inventory.
#[async_trait]
pub trait Inventory: Send + Sync {
    /// Infrastructure network (LAN / port group) by exact name.
    async fn find_lan(&self, name: &str) -> ProvisionResult<Option<LanRecord>>;

    /// Cloud subnet by exact name.
    async fn find_cloud_subnet(&self, name: &str) -> ProvisionResult<Option<CloudSubnetRecord>>;

    /// Template by GUID.
    async fn find_template(&self, guid: &str) -> ProvisionResult<Option<TemplateRecord>>;
}

/// Look `name` up in the infrastructure catalog, then the cloud catalog.
/// First hit wins.
pub async fn lookup_network(
    inventory: &dyn Inventory,
    name: &str,
) -> ProvisionResult<Option<NetworkRecord>> {
    if let Some(lan) = inventory.find_lan(name).await? {
        return Ok(Some(NetworkRecord::Infrastructure(lan)));
    }
    Ok(inventory
        .find_cloud_subnet(name)
        .await?
        .map(NetworkRecord::Cloud))
}

/// In-memory inventory.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    lans: HashMap<String, LanRecord>,
    subnets: HashMap<String, CloudSubnetRecord>,
    templates: HashMap<String, TemplateRecord>,
}

impl StaticInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lan(mut self, lan: LanRecord) -> Self {
        self.lans.insert(lan.name.clone(), lan);
        self
    }

    pub fn with_cloud_subnet(mut self, subnet: CloudSubnetRecord) -> Self {
        self.subnets.insert(subnet.name.clone(), subnet);
        self
    }

    pub fn with_template(mut self, template: TemplateRecord) -> Self {
        self.templates.insert(template.guid.clone(), template);
        self
    }
}

#[async_trait]
impl Inventory for StaticInventory {
    async fn find_lan(&self, name: &str) -> ProvisionResult<Option<LanRecord>> {
        Ok(self.lans.get(name).cloned())
    }

    async fn find_cloud_subnet(&self, name: &str) -> ProvisionResult<Option<CloudSubnetRecord>> {
        Ok(self.subnets.get(name).cloned())
    }

    async fn find_template(&self, guid: &str) -> ProvisionResult<Option<TemplateRecord>> {
        Ok(self.templates.get(guid).cloned())
    }
}
