//! Network classification and placement-field derivation.
//!
//! A provisioning network name is resolved against the infrastructure and
//! cloud catalogs, renamed with the distributed-switch prefix where its
//! backing switch is shared, and turned into the placement fields the
//! provisioning engine expects for that kind of network.

use serde::{Deserialize, Serialize};

use crate::catalog::{lookup_network, Inventory};
use crate::config::{PlannerConfig, UnresolvedNetworkPolicy};
use crate::error::{ProvisionError, ProvisionResult};
use crate::profile::NetworkProfileResolver;
use crate::types::*;

/// A network name after catalog lookup and prefix rewriting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedNetwork {
    /// Name to use downstream (possibly carrying the distributed prefix)
    pub name: String,
    pub kind: NetworkKind,
    /// `None` when the name is in neither catalog
    pub record: Option<NetworkRecord>,
}

/// Placement fields derived from a resolved network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementFields {
    pub placement_auto: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_subnet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_availability_zone: Option<String>,
    pub network_adapters: u32,
}

impl PlacementFields {
    fn infrastructure(vlan: String) -> Self {
        Self {
            placement_auto: true,
            vlan: Some(vlan),
            cloud_subnet: None,
            cloud_network: None,
            placement_availability_zone: None,
            network_adapters: 1,
        }
    }

    fn cloud(subnet: &CloudSubnetRecord) -> Self {
        Self {
            placement_auto: false,
            vlan: None,
            cloud_subnet: Some(subnet.id.clone()),
            cloud_network: subnet.cloud_network_id.clone(),
            placement_availability_zone: subnet.availability_zone_id.clone(),
            network_adapters: 1,
        }
    }

    pub fn to_field_map(&self) -> FieldMap {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => FieldMap::new(),
        }
    }
}

/// Resolved network together with its placement fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPlacement {
    pub network: ResolvedNetwork,
    pub fields: PlacementFields,
}

/// Classifies provisioning networks for one planning call.
pub struct NetworkClassifier<'a> {
    inventory: &'a dyn Inventory,
    profiles: &'a dyn NetworkProfileResolver,
    config: &'a PlannerConfig,
    server_version: &'a ServerVersion,
}

impl<'a> NetworkClassifier<'a> {
    pub fn new(
        inventory: &'a dyn Inventory,
        profiles: &'a dyn NetworkProfileResolver,
        config: &'a PlannerConfig,
        server_version: &'a ServerVersion,
    ) -> Self {
        Self { inventory, profiles, config, server_version }
    }

    /// Look the name up and apply the distributed-switch rename.
    pub async fn resolve(&self, name: &str) -> ProvisionResult<ResolvedNetwork> {
        let record = lookup_network(self.inventory, name).await?;
        let prefix = self.config.distributed_switch_prefix.as_str();
        let prefixed = !prefix.is_empty() && name.starts_with(prefix);

        let (resolved_name, kind) = match &record {
            Some(NetworkRecord::Cloud(_)) => (name.to_string(), NetworkKind::CloudSubnet),
            Some(NetworkRecord::Infrastructure(lan)) => {
                if lan.switch_shared && !prefixed {
                    (format!("{prefix}{name}"), NetworkKind::DistributedVswitch)
                } else {
                    (name.to_string(), infrastructure_kind(lan.switch_shared || prefixed))
                }
            }
            None => match self.config.unresolved_network {
                UnresolvedNetworkPolicy::Fail => {
                    return Err(ProvisionError::not_found(format!(
                        "Network '{name}' not found in infrastructure or cloud catalog"
                    )));
                }
                UnresolvedNetworkPolicy::Degrade => {
                    log::warn!(
                        "Network '{name}' not found in any catalog, using the name as given"
                    );
                    (name.to_string(), infrastructure_kind(prefixed))
                }
            },
        };
        let resolved = ResolvedNetwork { name: resolved_name, kind, record };

        if self.config.debug {
            log::info!(
                "provisioning network '{}' => '{}' ({})",
                name,
                resolved.name,
                resolved.kind
            );
        }
        Ok(resolved)
    }

    /// Resolve `name` and derive the placement fields for `template`.
    pub async fn placement(
        &self,
        name: &str,
        template: &TemplateSpec,
    ) -> ProvisionResult<NetworkPlacement> {
        let network = self.resolve(name).await?;

        let fields = match network.record {
            Some(NetworkRecord::Cloud(ref subnet)) => PlacementFields::cloud(subnet),
            _ => PlacementFields::infrastructure(self.vlan_for(&network.name, template).await?),
        };

        Ok(NetworkPlacement { network, fields })
    }

    /// Profile id on providers that need one, otherwise the network name.
    async fn vlan_for(&self, network_name: &str, template: &TemplateSpec) -> ProvisionResult<String> {
        let record = self
            .inventory
            .find_template(&template.guid)
            .await?
            .ok_or_else(|| {
                ProvisionError::not_found(format!(
                    "Template '{}' ({}) not found",
                    template.name, template.guid
                ))
            })?;

        match record.ems {
            Some(ref ems)
                if self
                    .config
                    .vnic_profile
                    .applies(&ems.ems_type, self.server_version) =>
            {
                let id = self.profiles.resolve_profile_id(ems, network_name).await?;
                log::info!(
                    "Resolved vNIC profile '{network_name}' on '{}' to '{id}'",
                    ems.name
                );
                Ok(id)
            }
            _ => Ok(network_name.to_string()),
        }
    }
}

/// A name carrying the distributed-switch prefix is a distributed switch,
/// whether or not the catalog knows the LAN.
fn infrastructure_kind(distributed: bool) -> NetworkKind {
    if distributed {
        NetworkKind::DistributedVswitch
    } else {
        NetworkKind::Infrastructure
    }
}
