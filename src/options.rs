//! Decoding of the option bags stored on a service provisioning task.
//!
//! Dialog options and tags arrive as YAML documents. Keys written from
//! symbol-keyed hashes carry a leading `:` (`:templates:`), which is
//! stripped; integer keys become their decimal string. When the options
//! document is keyed by dialog index, entry `0` is the option set.

use provreq_core::error::{ProvisionError, ProvisionResult};
use provreq_core::planner::LocationSettings;
use provreq_core::task::*;
use provreq_core::types::{FieldMap, TemplateSpec};
use serde_json::Value;

pub const TEMPLATES: &str = "templates";

/// Decoded option bags of one task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskOptions {
    pub dialog_options: FieldMap,
    pub tags: FieldMap,
    pub custom_vm_fields: FieldMap,
    pub custom_additional_values: FieldMap,
}

impl TaskOptions {
    pub fn load(task: &dyn ProvisioningTask) -> ProvisionResult<Self> {
        let dialog = decode_mapping(task.get_option(PARSED_DIALOG_OPTIONS), PARSED_DIALOG_OPTIONS)?;
        let dialog_options = match dialog.get("0") {
            Some(Value::Object(first)) => first.clone(),
            _ => dialog,
        };

        Ok(Self {
            dialog_options,
            tags: decode_mapping(task.get_option(PARSED_DIALOG_TAGS), PARSED_DIALOG_TAGS)?,
            custom_vm_fields: decode_mapping(task.get_option(CUSTOM_VM_FIELDS), CUSTOM_VM_FIELDS)?,
            custom_additional_values: decode_mapping(
                task.get_option(CUSTOM_ADDITIONAL_VALUES),
                CUSTOM_ADDITIONAL_VALUES,
            )?,
        })
    }

    /// Templates selected in the dialog. Missing, blank or empty is
    /// `MissingTemplates`.
    pub fn templates(&self) -> ProvisionResult<Vec<TemplateSpec>> {
        let raw = match self.dialog_options.get(TEMPLATES) {
            None | Some(Value::Null) => return Err(ProvisionError::missing_templates()),
            Some(Value::String(s)) if s.trim().is_empty() => {
                return Err(ProvisionError::missing_templates())
            }
            Some(Value::String(s)) => parse_yaml(s, TEMPLATES)?,
            Some(other) => other.clone(),
        };

        let items = match raw {
            Value::Null => Vec::new(),
            Value::Array(items) => items,
            other => {
                return Err(ProvisionError::invalid_input(format!(
                    "Expected a list of templates, got {other}"
                )))
            }
        };
        if items.is_empty() {
            return Err(ProvisionError::missing_templates());
        }

        items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                serde_json::from_value::<TemplateSpec>(item).map_err(|e| {
                    ProvisionError::invalid_input(format!("Invalid template descriptor #{idx}: {e}"))
                })
            })
            .collect()
    }

    /// Per-location settings for locations `0..count`.
    pub fn locations(&self, count: usize) -> Vec<LocationSettings> {
        (0..count)
            .map(|idx| {
                let get = |suffix: &str| {
                    self.dialog_options
                        .get(&format!("location_{idx}_{suffix}"))
                        .and_then(scalar_string)
                };
                LocationSettings {
                    provisioning_network: get("provisioning_network"),
                    destination_network: get("destination_network"),
                    destination_network_gateway: get("destination_network_gateway"),
                    domain_name: get("domain_name"),
                    cloud_flavor: get("cloud_flavor"),
                    cloud_ssh_key: get("cloud_ssh_key"),
                }
            })
            .collect()
    }
}

fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Decode a stored option into a mapping. Accepts a YAML/JSON string or an
/// already structured object; absent, null and blank are empty.
pub fn decode_mapping(value: Option<Value>, key: &str) -> ProvisionResult<FieldMap> {
    let value = match value {
        None | Some(Value::Null) => return Ok(FieldMap::new()),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(FieldMap::new()),
        Some(Value::String(s)) => parse_yaml(&s, key)?,
        Some(other) => normalize(other),
    };
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(FieldMap::new()),
        other => Err(ProvisionError::parse(format!(
            "Option '{key}' is not a mapping: {other}"
        ))),
    }
}

/// Parse a YAML document into JSON with normalised keys.
pub fn parse_yaml(raw: &str, key: &str) -> ProvisionResult<Value> {
    let doc: serde_yaml::Value = serde_yaml::from_str(raw)
        .map_err(|e| ProvisionError::parse(format!("Option '{key}' is not valid YAML: {e}")))?;
    yaml_to_json(doc, key)
}

fn yaml_to_json(v: serde_yaml::Value, key: &str) -> ProvisionResult<Value> {
    use serde_yaml::Value as Y;
    Ok(match v {
        Y::Null => Value::Null,
        Y::Bool(b) => Value::Bool(b),
        Y::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Y::String(s) => Value::String(s),
        Y::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(|item| yaml_to_json(item, key))
                .collect::<ProvisionResult<_>>()?,
        ),
        Y::Mapping(mapping) => {
            let mut map = FieldMap::new();
            for (k, v) in mapping {
                map.insert(yaml_key(k, key)?, yaml_to_json(v, key)?);
            }
            Value::Object(map)
        }
        Y::Tagged(tagged) => yaml_to_json(tagged.value, key)?,
    })
}

fn yaml_key(k: serde_yaml::Value, key: &str) -> ProvisionResult<String> {
    use serde_yaml::Value as Y;
    match k {
        Y::String(s) => Ok(strip_symbol(&s).to_string()),
        Y::Number(n) => Ok(n.to_string()),
        Y::Bool(b) => Ok(b.to_string()),
        Y::Tagged(tagged) => yaml_key(tagged.value, key),
        other => Err(ProvisionError::parse(format!(
            "Option '{key}' has a non-scalar key: {other:?}"
        ))),
    }
}

fn strip_symbol(s: &str) -> &str {
    s.strip_prefix(':').filter(|rest| !rest.is_empty()).unwrap_or(s)
}

/// Normalise keys of an already structured value.
fn normalize(v: Value) -> Value {
    match v {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (strip_symbol(&k).to_string(), normalize(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provreq_core::error::ProvisionErrorKind;
    use serde_json::json;

    const DIALOG: &str = r#"---
0:
  :templates: |
    - :name: rhel8
      :guid: g-1
    - :name: win2019
      :guid: g-2
      :os: windows
  :number_of_vms: "5"
  :location_0_provisioning_network: prod
  :location_0_domain_name: east.example.com
  :location_1_provisioning_network: 42
  :location_1_cloud_flavor: ''
"#;

    fn task() -> InMemoryTask {
        InMemoryTask::new("svc-1")
            .with_option(PARSED_DIALOG_OPTIONS, json!(DIALOG))
            .with_option(PARSED_DIALOG_TAGS, json!("---\n:environment: prod\n"))
            .with_option(CUSTOM_VM_FIELDS, json!({"vm_memory": 2048}))
    }

    #[test]
    fn dialog_indexed_by_zero() {
        let options = TaskOptions::load(&task()).unwrap();
        assert_eq!(options.dialog_options.get("number_of_vms"), Some(&json!("5")));
        assert_eq!(options.tags.get("environment"), Some(&json!("prod")));
        assert_eq!(options.custom_vm_fields.get("vm_memory"), Some(&json!(2048)));
        assert!(options.custom_additional_values.is_empty());
    }

    #[test]
    fn templates_from_yaml_string() {
        let options = TaskOptions::load(&task()).unwrap();
        let templates = options.templates().unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].guid, "g-1");
        assert_eq!(templates[1].extra.get("os"), Some(&json!("windows")));
    }

    #[test]
    fn missing_or_blank_templates() {
        let mut options = TaskOptions::default();
        assert_eq!(options.templates().unwrap_err().kind, ProvisionErrorKind::MissingTemplates);

        options.dialog_options.insert(TEMPLATES.into(), json!("  "));
        assert_eq!(options.templates().unwrap_err().kind, ProvisionErrorKind::MissingTemplates);

        options.dialog_options.insert(TEMPLATES.into(), json!("--- []\n"));
        assert_eq!(options.templates().unwrap_err().kind, ProvisionErrorKind::MissingTemplates);
    }

    #[test]
    fn structured_templates_are_accepted() {
        let mut options = TaskOptions::default();
        options
            .dialog_options
            .insert(TEMPLATES.into(), json!([{"name": "t1", "guid": "g1"}]));
        assert_eq!(options.templates().unwrap()[0].name, "t1");
    }

    #[test]
    fn per_location_keys() {
        let options = TaskOptions::load(&task()).unwrap();
        let locations = options.locations(3);
        assert_eq!(locations[0].provisioning_network.as_deref(), Some("prod"));
        assert_eq!(locations[0].domain_name.as_deref(), Some("east.example.com"));
        assert_eq!(locations[1].provisioning_network.as_deref(), Some("42"));
        assert_eq!(locations[1].cloud_flavor.as_deref(), Some(""));
        assert_eq!(locations[2], LocationSettings::default());
    }

    #[test]
    fn absent_and_structured_options() {
        assert!(decode_mapping(None, "x").unwrap().is_empty());
        assert!(decode_mapping(Some(json!("")), "x").unwrap().is_empty());
        let map = decode_mapping(Some(json!({":a": 1})), "x").unwrap();
        assert_eq!(map.get("a"), Some(&json!(1)));
        assert_eq!(
            decode_mapping(Some(json!("- 1\n- 2\n")), "x").unwrap_err().kind,
            ProvisionErrorKind::ParseError
        );
        assert_eq!(
            decode_mapping(Some(json!("{ unclosed")), "x").unwrap_err().kind,
            ProvisionErrorKind::ParseError
        );
    }
}
