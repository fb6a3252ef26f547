//! Payload field sections and their merge precedence.
//!
//! Later layers override earlier ones on key collision:
//!
//! - vm fields: placement → custom VM fields → dialog → forced overrides
//! - additional values: service/network → custom additional values → dialog
//!   → forced overrides
//!
//! The forced overrides (`number_of_vms`, `vm_memory` as a string) always
//! come last because they must agree with the distribution decision.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProvisionError, ProvisionResult};
use crate::network::PlacementFields;
use crate::types::{FieldMap, Requester, TemplateSpec};

pub const NUMBER_OF_VMS: &str = "number_of_vms";
pub const VM_MEMORY: &str = "vm_memory";
pub const REQUEST_TYPE: &str = "request_type";

fn layered(layers: &[&FieldMap]) -> FieldMap {
    let mut merged = FieldMap::new();
    for layer in layers {
        for (k, v) in layer.iter() {
            merged.insert(k.clone(), v.clone());
        }
    }
    merged
}

// ── Template fields ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateFields(FieldMap);

impl TemplateFields {
    /// Caller's descriptor with `request_type` forced to `"template"`.
    pub fn from_spec(spec: &TemplateSpec) -> Self {
        let mut map = spec.to_field_map();
        map.insert(REQUEST_TYPE.into(), Value::from("template"));
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &FieldMap {
        &self.0
    }
}

// ── VM fields ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VmFields(FieldMap);

impl VmFields {
    pub fn merge(
        placement: &PlacementFields,
        custom_vm_fields: &FieldMap,
        dialog: &FieldMap,
        number_of_vms: u32,
    ) -> Self {
        let base = placement.to_field_map();
        let mut map = layered(&[&base, custom_vm_fields, dialog]);
        map.insert(NUMBER_OF_VMS.into(), Value::from(number_of_vms));
        if let Some(memory) = map.get(VM_MEMORY).and_then(stringify) {
            map.insert(VM_MEMORY.into(), Value::String(memory));
        }
        Self(map)
    }

    pub fn number_of_vms(&self) -> Option<u64> {
        self.0.get(NUMBER_OF_VMS).and_then(Value::as_u64)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &FieldMap {
        &self.0
    }
}

/// String form of a scalar; `None` for null.
fn stringify(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ── Additional values ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdditionalValues(FieldMap);

impl AdditionalValues {
    pub fn merge(
        service_id: &str,
        network_name: &str,
        custom_additional_values: &FieldMap,
        dialog: &FieldMap,
        number_of_vms: u32,
    ) -> Self {
        let mut base = FieldMap::new();
        base.insert("service_id".into(), Value::from(service_id));
        base.insert("network_name".into(), Value::from(network_name));
        let mut map = layered(&[&base, custom_additional_values, dialog]);
        map.insert(NUMBER_OF_VMS.into(), Value::from(number_of_vms));
        Self(map)
    }

    pub fn number_of_vms(&self) -> Option<u64> {
        self.0.get(NUMBER_OF_VMS).and_then(Value::as_u64)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &FieldMap {
        &self.0
    }
}

// ── Requester ───────────────────────────────────────────────────────

/// Owner fields. `user_name` must be the requester's login, otherwise the
/// engine attributes the request to its default user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequesterFields {
    pub user_name: String,
    pub owner_email: Option<String>,
    pub owner_first_name: Option<String>,
    pub owner_last_name: Option<String>,
}

impl RequesterFields {
    pub fn from_requester(requester: &Requester) -> ProvisionResult<Self> {
        if requester.userid.trim().is_empty() {
            return Err(ProvisionError::invalid_input("Requester login is required"));
        }
        Ok(Self {
            user_name: requester.userid.clone(),
            owner_email: requester.email.clone(),
            owner_first_name: requester.first_name.clone(),
            owner_last_name: requester.last_name.clone(),
        })
    }
}

// ── VM count ────────────────────────────────────────────────────────

/// Read a VM count from an option value. Blank strings count as absent.
pub fn parse_vm_count(value: Option<&Value>, source: &str) -> ProvisionResult<Option<u32>> {
    let invalid = |raw: String| {
        ProvisionError::invalid_input(format!("Invalid number_of_vms '{raw}' in {source}"))
    };
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| invalid(n.to_string())),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<u32>().map(Some).map_err(|_| invalid(s.clone())),
        Some(other) => Err(invalid(other.to_string())),
    }
}

/// Total VM count: dialog → custom VM fields → custom additional values → 1.
pub fn resolve_total_vm_count(
    dialog: &FieldMap,
    custom_vm_fields: &FieldMap,
    custom_additional_values: &FieldMap,
) -> ProvisionResult<u32> {
    let sources = [
        (dialog, "dialog options"),
        (custom_vm_fields, "custom VM fields"),
        (custom_additional_values, "custom additional values"),
    ];
    for (map, source) in sources {
        if let Some(count) = parse_vm_count(map.get(NUMBER_OF_VMS), source)? {
            return Ok(count);
        }
    }
    Ok(1)
}
