//! Request planning: distribute VMs over templates, build one payload per
//! template (or per VM) and submit them in template order.
//!
//! Validation happens up front, before anything is submitted. Once
//! submissions have started a failure is reported as a [`PlanFailure`] that
//! carries every handle already returned by the engine; those requests are
//! not rolled back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::Inventory;
use crate::config::PlannerConfig;
use crate::distribute::distribute_vm_count;
use crate::engine::{ProvisionRequestPlan, ProvisioningEngine};
use crate::error::{ProvisionError, ProvisionResult};
use crate::fields::{
    resolve_total_vm_count, AdditionalValues, RequesterFields, TemplateFields, VmFields,
};
use crate::network::NetworkClassifier;
use crate::profile::NetworkProfileResolver;
use crate::types::*;

/// Per-location dialog choices, matched to templates by index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSettings {
    #[serde(default)]
    pub provisioning_network: Option<String>,
    #[serde(default)]
    pub destination_network: Option<String>,
    #[serde(default)]
    pub destination_network_gateway: Option<String>,
    #[serde(default)]
    pub domain_name: Option<String>,
    /// Cloud flavor id, sent as `instance_type`
    #[serde(default)]
    pub cloud_flavor: Option<String>,
    /// Cloud SSH key pair id, sent as `guest_access_key_pair`
    #[serde(default)]
    pub cloud_ssh_key: Option<String>,
}

impl LocationSettings {
    pub fn provisioning_network(&self) -> Option<&str> {
        self.provisioning_network
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Layer this location's values onto a template's custom fields.
    pub fn apply(&self, custom_vm_fields: &mut FieldMap, custom_additional_values: &mut FieldMap) {
        let additional = [
            ("destination_network", &self.destination_network),
            ("destination_network_gateway", &self.destination_network_gateway),
            ("domain_name", &self.domain_name),
        ];
        for (key, value) in additional {
            if let Some(v) = value {
                custom_additional_values.insert(key.into(), Value::from(v.as_str()));
            }
        }

        let vm = [
            ("instance_type", &self.cloud_flavor),
            ("guest_access_key_pair", &self.cloud_ssh_key),
        ];
        for (key, value) in vm {
            if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                custom_vm_fields.insert(key.into(), Value::from(v));
            }
        }
    }
}

/// Everything one planning call needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    /// Service the new VMs will belong to
    pub service_id: String,
    pub requester: Requester,
    /// Explicit total; derived from the option maps when `None`
    #[serde(default)]
    pub total_vm_count: Option<u32>,
    pub templates: Vec<TemplateSpec>,
    #[serde(default)]
    pub locations: Vec<LocationSettings>,
    #[serde(default)]
    pub dialog_options: FieldMap,
    #[serde(default)]
    pub tags: FieldMap,
    #[serde(default)]
    pub custom_vm_fields: FieldMap,
    #[serde(default)]
    pub custom_additional_values: FieldMap,
    /// Overrides [`PlannerConfig::separate_requests`] for this call
    #[serde(default)]
    pub separate_requests: Option<bool>,
}

/// Submission stopped part-way; `submitted` holds what the engine accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{error} ({} request(s) already submitted)", .submitted.len())]
pub struct PlanFailure {
    pub error: ProvisionError,
    pub submitted: Vec<ProvisionRequestHandle>,
}

impl PlanFailure {
    fn before_submission(error: ProvisionError) -> Self {
        Self { error, submitted: Vec::new() }
    }
}

/// External services the planner talks to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub inventory: &'a dyn Inventory,
    pub profiles: &'a dyn NetworkProfileResolver,
    pub engine: &'a dyn ProvisioningEngine,
}

/// Result of validation: the per-template allocation and requester fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPlan {
    pub total_vm_count: u32,
    pub allocation: Vec<u32>,
    pub requester: RequesterFields,
    pub separate_requests: bool,
}

pub struct RequestPlanner<'a> {
    config: PlannerConfig,
    collaborators: Collaborators<'a>,
    server_version: ServerVersion,
}

impl<'a> RequestPlanner<'a> {
    pub fn new(
        config: PlannerConfig,
        collaborators: Collaborators<'a>,
        server_version: ServerVersion,
    ) -> Self {
        Self { config, collaborators, server_version }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Check the request and compute the allocation. No side effects.
    pub fn validate(&self, req: &PlanRequest) -> ProvisionResult<ValidatedPlan> {
        if req.templates.is_empty() {
            return Err(ProvisionError::missing_templates());
        }
        if req.service_id.trim().is_empty() {
            return Err(ProvisionError::invalid_input(
                "Task has no destination service",
            ));
        }
        let requester = RequesterFields::from_requester(&req.requester)?;

        let total_vm_count = match req.total_vm_count {
            Some(total) => total,
            None => resolve_total_vm_count(
                &req.dialog_options,
                &req.custom_vm_fields,
                &req.custom_additional_values,
            )?,
        };
        let allocation = distribute_vm_count(total_vm_count, req.templates.len())?;

        for (idx, (template, count)) in req.templates.iter().zip(&allocation).enumerate() {
            let has_network = req
                .locations
                .get(idx)
                .and_then(LocationSettings::provisioning_network)
                .is_some();
            if *count > 0 && !has_network {
                return Err(ProvisionError::invalid_input(format!(
                    "No provisioning network selected for template '{}' (location {idx})",
                    template.name
                )));
            }
        }

        Ok(ValidatedPlan {
            total_vm_count,
            allocation,
            requester,
            separate_requests: req.separate_requests.unwrap_or(self.config.separate_requests),
        })
    }

    /// Build the payload for template `idx` carrying `vms_per_request` VMs.
    pub async fn build_plan(
        &self,
        req: &PlanRequest,
        validated: &ValidatedPlan,
        idx: usize,
        vms_per_request: u32,
    ) -> ProvisionResult<ProvisionRequestPlan> {
        let template = req.templates.get(idx).ok_or_else(|| {
            ProvisionError::invalid_input(format!("No template at index {idx}"))
        })?;
        let location = req.locations.get(idx).cloned().unwrap_or_default();
        let network_name = location.provisioning_network().ok_or_else(|| {
            ProvisionError::invalid_input(format!(
                "No provisioning network selected for template '{}' (location {idx})",
                template.name
            ))
        })?;

        let mut custom_vm_fields = req.custom_vm_fields.clone();
        let mut custom_additional_values = req.custom_additional_values.clone();
        location.apply(&mut custom_vm_fields, &mut custom_additional_values);

        let classifier = NetworkClassifier::new(
            self.collaborators.inventory,
            self.collaborators.profiles,
            &self.config,
            &self.server_version,
        );
        let placement = classifier.placement(network_name, template).await?;

        Ok(ProvisionRequestPlan {
            version: self.config.request_version.clone(),
            template_fields: TemplateFields::from_spec(template),
            vm_fields: VmFields::merge(
                &placement.fields,
                &custom_vm_fields,
                &req.dialog_options,
                vms_per_request,
            ),
            requester: validated.requester.clone(),
            tags: req.tags.clone(),
            additional_values: AdditionalValues::merge(
                &req.service_id,
                &placement.network.name,
                &custom_additional_values,
                &req.dialog_options,
                vms_per_request,
            ),
            ems_custom_attrs: FieldMap::new(),
            miq_custom_attrs: FieldMap::new(),
        })
    }

    /// Validate, build and submit every request. Handles are returned in
    /// submission order with duplicates removed.
    pub async fn plan_and_submit(
        &self,
        req: &PlanRequest,
    ) -> Result<Vec<ProvisionRequestHandle>, PlanFailure> {
        let validated = self.validate(req).map_err(PlanFailure::before_submission)?;
        self.log_inputs(req, &validated);

        let mut handles: Vec<ProvisionRequestHandle> = Vec::new();
        for (idx, &count) in validated.allocation.iter().enumerate() {
            let template = &req.templates[idx];
            if count == 0 {
                log::info!("Template '{}' gets no VMs, skipping", template.name);
                continue;
            }

            let (requests, per_request) = if validated.separate_requests {
                (count, 1)
            } else {
                (1, count)
            };

            let plan = match self.build_plan(req, &validated, idx, per_request).await {
                Ok(plan) => plan,
                Err(error) => return Err(PlanFailure { error, submitted: handles }),
            };

            log::info!(
                "Execute '{requests}' provision request(s) for '{per_request}' VM(s) each from template '{}'",
                template.name
            );
            if self.config.debug {
                log::info!("payload => {}", serde_json::to_string(&plan).unwrap_or_default());
            }

            for _ in 0..requests {
                match self.collaborators.engine.submit(&plan).await {
                    Ok(handle) => {
                        log::info!("Created provision request {}", handle.id);
                        if !handles.iter().any(|h| h.id == handle.id) {
                            handles.push(handle);
                        }
                    }
                    Err(error) => {
                        log::error!(
                            "Provision request for template '{}' failed: {error}",
                            template.name
                        );
                        return Err(PlanFailure { error, submitted: handles });
                    }
                }
            }
        }

        if self.config.debug {
            let ids: Vec<&str> = handles.iter().map(|h| h.id.as_str()).collect();
            log::info!("requests => {ids:?}");
        }
        Ok(handles)
    }

    fn log_inputs(&self, req: &PlanRequest, validated: &ValidatedPlan) {
        if !self.config.debug {
            return;
        }
        log::info!("number_of_vms            => {}", validated.total_vm_count);
        log::info!("allocation               => {:?}", validated.allocation);
        log::info!("separate_requests        => {}", validated.separate_requests);
        log::info!("templates                => {:?}", req.templates);
        log::info!("locations                => {:?}", req.locations);
        log::info!("dialog_options           => {:?}", req.dialog_options);
        log::info!("tags                     => {:?}", req.tags);
        log::info!("custom_vm_fields         => {:?}", req.custom_vm_fields);
        log::info!("custom_additional_values => {:?}", req.custom_additional_values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticInventory;
    use crate::error::ProvisionErrorKind;
    use crate::profile::NoProfileResolver;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Engine that records payloads and hands out sequential ids; fails on
    /// the submission numbered `fail_on` (1-based) when set.
    struct RecordingEngine {
        submitted: Mutex<Vec<ProvisionRequestPlan>>,
        fail_on: Option<usize>,
    }

    impl RecordingEngine {
        fn new() -> Self {
            Self { submitted: Mutex::new(Vec::new()), fail_on: None }
        }

        fn failing_on(n: usize) -> Self {
            Self { submitted: Mutex::new(Vec::new()), fail_on: Some(n) }
        }

        fn plans(&self) -> Vec<ProvisionRequestPlan> {
            self.submitted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProvisioningEngine for RecordingEngine {
        async fn submit(&self, plan: &ProvisionRequestPlan) -> ProvisionResult<ProvisionRequestHandle> {
            let mut submitted = self.submitted.lock().unwrap();
            if self.fail_on == Some(submitted.len() + 1) {
                return Err(ProvisionError::submission("backend rejected payload"));
            }
            submitted.push(plan.clone());
            Ok(ProvisionRequestHandle::new(format!("req-{}", submitted.len())))
        }
    }

    fn inventory() -> StaticInventory {
        StaticInventory::new()
            .with_lan(LanRecord { name: "prod".into(), switch_shared: true })
            .with_template(TemplateRecord { guid: "g1".into(), name: "t1".into(), ems: None })
            .with_template(TemplateRecord { guid: "g2".into(), name: "t2".into(), ems: None })
    }

    fn location(net: &str) -> LocationSettings {
        LocationSettings {
            provisioning_network: Some(net.into()),
            ..LocationSettings::default()
        }
    }

    fn request(total: u32, separate: bool) -> PlanRequest {
        PlanRequest {
            service_id: "svc-1".into(),
            requester: Requester::new("jdoe"),
            total_vm_count: Some(total),
            templates: vec![TemplateSpec::new("t1", "g1"), TemplateSpec::new("t2", "g2")],
            locations: vec![location("prod"), location("prod")],
            separate_requests: Some(separate),
            ..PlanRequest::default()
        }
    }

    fn planner<'a>(inv: &'a StaticInventory, engine: &'a RecordingEngine) -> RequestPlanner<'a> {
        RequestPlanner::new(
            PlannerConfig::default(),
            Collaborators { inventory: inv, profiles: &NoProfileResolver, engine },
            ServerVersion::parse("5.9").unwrap(),
        )
    }

    #[tokio::test]
    async fn one_request_per_template() {
        let inv = inventory();
        let engine = RecordingEngine::new();
        let handles = planner(&inv, &engine).plan_and_submit(&request(5, false)).await.unwrap();
        assert_eq!(handles.len(), 2);
        let counts: Vec<_> = engine.plans().iter().map(|p| p.vm_fields.number_of_vms()).collect();
        assert_eq!(counts, vec![Some(3), Some(2)]);
    }

    #[tokio::test]
    async fn one_request_per_vm() {
        let inv = inventory();
        let engine = RecordingEngine::new();
        let handles = planner(&inv, &engine).plan_and_submit(&request(5, true)).await.unwrap();
        assert_eq!(handles.len(), 5);
        let plans = engine.plans();
        assert_eq!(plans.len(), 5);
        assert!(plans.iter().all(|p| p.vm_fields.number_of_vms() == Some(1)));
        let guids: Vec<_> = plans
            .iter()
            .map(|p| p.template_fields.get("guid").cloned().unwrap())
            .collect();
        assert_eq!(guids, vec![json!("g1"), json!("g1"), json!("g1"), json!("g2"), json!("g2")]);
    }

    #[tokio::test]
    async fn empty_template_list_submits_nothing() {
        let inv = inventory();
        let engine = RecordingEngine::new();
        let mut req = request(2, false);
        req.templates.clear();
        let failure = planner(&inv, &engine).plan_and_submit(&req).await.unwrap_err();
        assert_eq!(failure.error.kind, ProvisionErrorKind::MissingTemplates);
        assert!(failure.submitted.is_empty());
        assert!(engine.plans().is_empty());
    }

    #[tokio::test]
    async fn missing_network_fails_validation_before_submitting() {
        let inv = inventory();
        let engine = RecordingEngine::new();
        let mut req = request(4, true);
        req.locations.truncate(1);
        let failure = planner(&inv, &engine).plan_and_submit(&req).await.unwrap_err();
        assert_eq!(failure.error.kind, ProvisionErrorKind::InvalidInput);
        assert!(engine.plans().is_empty());
    }

    #[tokio::test]
    async fn zero_vm_templates_are_skipped() {
        let inv = inventory();
        let engine = RecordingEngine::new();
        let mut req = request(1, false);
        req.locations.truncate(1);
        let handles = planner(&inv, &engine).plan_and_submit(&req).await.unwrap();
        assert_eq!(handles.len(), 1);
        assert_eq!(engine.plans()[0].template_fields.get("guid"), Some(&json!("g1")));
    }

    #[tokio::test]
    async fn submission_failure_keeps_partial_results() {
        let inv = inventory();
        let engine = RecordingEngine::failing_on(4);
        let failure = planner(&inv, &engine).plan_and_submit(&request(5, true)).await.unwrap_err();
        assert_eq!(failure.error.kind, ProvisionErrorKind::SubmissionError);
        let ids: Vec<_> = failure.submitted.iter().map(|h| h.id.to_string()).collect();
        assert_eq!(ids, vec!["req-1", "req-2", "req-3"]);
    }

    #[tokio::test]
    async fn location_fields_stay_with_their_template() {
        let inv = inventory();
        let engine = RecordingEngine::new();
        let mut req = request(2, false);
        req.locations[0].cloud_flavor = Some("m1.large".into());
        req.locations[0].domain_name = Some("east.example.com".into());
        planner(&inv, &engine).plan_and_submit(&req).await.unwrap();
        let plans = engine.plans();
        assert_eq!(plans[0].vm_fields.get("instance_type"), Some(&json!("m1.large")));
        assert_eq!(plans[0].additional_values.get("domain_name"), Some(&json!("east.example.com")));
        assert_eq!(plans[1].vm_fields.get("instance_type"), None);
        assert_eq!(plans[1].additional_values.get("domain_name"), None);
    }

    #[tokio::test]
    async fn payload_sections() {
        let inv = inventory();
        let engine = RecordingEngine::new();
        let mut req = request(2, false);
        req.custom_vm_fields = match json!({"number_of_vms": 99, "vm_memory": 2048}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        planner(&inv, &engine).plan_and_submit(&req).await.unwrap();
        let plan = &engine.plans()[0];
        assert_eq!(plan.version, "1.1");
        assert_eq!(plan.vm_fields.number_of_vms(), Some(1));
        assert_eq!(plan.vm_fields.get("vm_memory"), Some(&json!("2048")));
        assert_eq!(plan.vm_fields.get("vlan"), Some(&json!("dvs_prod")));
        assert_eq!(plan.additional_values.get("service_id"), Some(&json!("svc-1")));
        assert_eq!(plan.additional_values.get("network_name"), Some(&json!("dvs_prod")));
        assert_eq!(plan.template_fields.get("request_type"), Some(&json!("template")));
        assert_eq!(plan.requester.user_name, "jdoe");
        assert!(plan.ems_custom_attrs.is_empty() && plan.miq_custom_attrs.is_empty());
    }

    #[tokio::test]
    async fn total_derived_from_options_when_not_given() {
        let inv = inventory();
        let engine = RecordingEngine::new();
        let mut req = request(0, false);
        req.total_vm_count = None;
        req.dialog_options.insert("number_of_vms".into(), json!("4"));
        let planner = planner(&inv, &engine);
        let validated = planner.validate(&req).unwrap();
        assert_eq!(validated.total_vm_count, 4);
        assert_eq!(validated.allocation, vec![2, 2]);
    }
}
