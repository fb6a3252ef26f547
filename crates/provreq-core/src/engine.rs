//! Provisioning payload and the engine it is submitted to.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProvisionResult;
use crate::fields::{AdditionalValues, RequesterFields, TemplateFields, VmFields};
use crate::types::{FieldMap, ProvisionRequestHandle};

/// One provisioning request, exactly as handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionRequestPlan {
    pub version: String,
    pub template_fields: TemplateFields,
    pub vm_fields: VmFields,
    pub requester: RequesterFields,
    pub tags: FieldMap,
    pub additional_values: AdditionalValues,
    pub ems_custom_attrs: FieldMap,
    pub miq_custom_attrs: FieldMap,
}

/// External provisioning engine.
#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    /// Submit one request. Rejections surface as `SubmissionError`.
    async fn submit(&self, plan: &ProvisionRequestPlan) -> ProvisionResult<ProvisionRequestHandle>;
}
