//! Provider-native network (vNIC) profile resolution.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ProvisionError, ProvisionResult};
use crate::types::ManagementSystemRecord;

/// A network profile as listed by a management API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProfile {
    pub id: String,
    pub name: String,
}

/// Resolves a network name to a provider-native profile id.
///
/// Implementations open their own connection per call and must not share
/// it across calls.
#[async_trait]
pub trait NetworkProfileResolver: Send + Sync {
    async fn resolve_profile_id(
        &self,
        ems: &ManagementSystemRecord,
        profile_name: &str,
    ) -> ProvisionResult<String>;
}

/// Pick the profile whose name matches exactly. Duplicate names are not a
/// contract: the first listed wins.
pub fn select_profile<'a>(
    profiles: &'a [NetworkProfile],
    profile_name: &str,
) -> ProvisionResult<&'a NetworkProfile> {
    profiles
        .iter()
        .find(|p| p.name == profile_name)
        .ok_or_else(|| {
            ProvisionError::not_found(format!("No vNIC profile named '{profile_name}'"))
        })
}

/// Resolver used where no provider-native lookup is available; any attempt
/// to resolve fails with `NotFound`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProfileResolver;

#[async_trait]
impl NetworkProfileResolver for NoProfileResolver {
    async fn resolve_profile_id(
        &self,
        ems: &ManagementSystemRecord,
        profile_name: &str,
    ) -> ProvisionResult<String> {
        Err(ProvisionError::not_found(format!(
            "No profile resolver configured for '{}' (profile '{profile_name}')",
            ems.name
        )))
    }
}
