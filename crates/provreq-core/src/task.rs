//! Owning service task: option store, destination service, result.

use serde_json::Value;
use std::collections::HashMap;

pub const PARSED_DIALOG_OPTIONS: &str = "parsed_dialog_options";
pub const PARSED_DIALOG_TAGS: &str = "parsed_dialog_tags";
pub const CUSTOM_VM_FIELDS: &str = "custom_vm_fields";
pub const CUSTOM_ADDITIONAL_VALUES: &str = "custom_additional_values";
pub const PROVISION_REQUEST_IDS: &str = "provision_request_ids";

/// Outcome recorded for the automation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    Ok,
    Error { reason: String },
}

/// Service provisioning task as seen by the planner.
pub trait ProvisioningTask: Send {
    /// Id of the service the new VMs will belong to.
    fn destination_service_id(&self) -> Option<String>;

    fn get_option(&self, key: &str) -> Option<Value>;

    /// Replaces the whole value stored under `key`.
    fn set_option(&mut self, key: &str, value: Value);

    fn set_result(&mut self, result: TaskResult);
}

/// In-memory task.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTask {
    destination: Option<String>,
    options: HashMap<String, Value>,
    result: Option<TaskResult>,
}

impl InMemoryTask {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: Some(destination.into()),
            ..Self::default()
        }
    }

    pub fn with_option(mut self, key: &str, value: Value) -> Self {
        self.options.insert(key.to_string(), value);
        self
    }

    pub fn result(&self) -> Option<&TaskResult> {
        self.result.as_ref()
    }
}

impl ProvisioningTask for InMemoryTask {
    fn destination_service_id(&self) -> Option<String> {
        self.destination.clone()
    }

    fn get_option(&self, key: &str) -> Option<Value> {
        self.options.get(key).cloned()
    }

    fn set_option(&mut self, key: &str, value: Value) {
        self.options.insert(key.to_string(), value);
    }

    fn set_result(&mut self, result: TaskResult) {
        self.result = Some(result);
    }
}
