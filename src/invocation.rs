//! Automation entry point: read the task, plan, submit, record.

use provreq_core::config::PlannerConfig;
use provreq_core::error::{ProvisionError, ProvisionResult};
use provreq_core::ledger::RequestIdLedger;
use provreq_core::planner::{Collaborators, PlanFailure, PlanRequest, RequestPlanner};
use provreq_core::task::{ProvisioningTask, TaskResult};
use provreq_core::types::{ProvisionRequestId, Requester, ServerVersion};

use crate::options::TaskOptions;

/// The only task type this entry point handles.
pub const SERVICE_TEMPLATE_PROVISION_TASK: &str = "service_template_provision_task";

/// Who is invoking, on what, against which server.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    /// Automation object type (`vmdb_object_type`)
    pub object_type: String,
    pub requester: Requester,
    pub server_version: ServerVersion,
}

/// Create provisioning requests for every template selected on `task`.
///
/// Returns the ids created by this call. On failure the reason is recorded
/// on the task; ids of requests that were submitted before the failure are
/// still appended to the task's ledger.
pub async fn create_provision_requests(
    ctx: &InvocationContext,
    task: &mut dyn ProvisioningTask,
    collaborators: Collaborators<'_>,
    config: &PlannerConfig,
) -> ProvisionResult<Vec<ProvisionRequestId>> {
    log::debug!("vmdb_object_type => '{}'", ctx.object_type);
    if ctx.object_type != SERVICE_TEMPLATE_PROVISION_TASK {
        let error = ProvisionError::invalid_input(format!(
            "Can not handle vmdb_object_type: {}",
            ctx.object_type
        ));
        return Err(record_error(task, error));
    }

    let request = match plan_request(ctx, task) {
        Ok(request) => request,
        Err(error) => return Err(record_error(task, error)),
    };
    // A ledger that cannot be decoded must stop us before anything is created.
    let ledger = match RequestIdLedger::load(task) {
        Ok(ledger) => ledger,
        Err(error) => return Err(record_error(task, error)),
    };

    let planner = RequestPlanner::new(config.clone(), collaborators, ctx.server_version.clone());
    submit(&planner, task, ledger, &request).await
}

/// Build the planner input from the task's options.
pub fn plan_request(
    ctx: &InvocationContext,
    task: &dyn ProvisioningTask,
) -> ProvisionResult<PlanRequest> {
    let options = TaskOptions::load(task)?;
    let templates = options.templates()?;
    let service_id = task
        .destination_service_id()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ProvisionError::invalid_input("Task has no destination service"))?;

    Ok(PlanRequest {
        service_id,
        requester: ctx.requester.clone(),
        total_vm_count: None,
        locations: options.locations(templates.len()),
        templates,
        dialog_options: options.dialog_options,
        tags: options.tags,
        custom_vm_fields: options.custom_vm_fields,
        custom_additional_values: options.custom_additional_values,
        separate_requests: None,
    })
}

/// Run `request` through `planner` and record the outcome on `task`.
///
/// New ids are appended to `ledger`, which must already hold the task's
/// stored ids, and written back with one `set_option`.
pub async fn submit(
    planner: &RequestPlanner<'_>,
    task: &mut dyn ProvisioningTask,
    mut ledger: RequestIdLedger,
    request: &PlanRequest,
) -> ProvisionResult<Vec<ProvisionRequestId>> {
    match planner.plan_and_submit(request).await {
        Ok(handles) => {
            let ids: Vec<ProvisionRequestId> = handles.into_iter().map(|h| h.id).collect();
            ledger.append(ids.iter().cloned());
            ledger.store(task);
            log::info!(
                "Created {} provision request(s), {} recorded on the task",
                ids.len(),
                ledger.len()
            );
            task.set_result(TaskResult::Ok);
            Ok(ids)
        }
        Err(PlanFailure { error, submitted }) => {
            if !submitted.is_empty() {
                let ids: Vec<ProvisionRequestId> = submitted.into_iter().map(|h| h.id).collect();
                log::warn!(
                    "{} provision request(s) were created before the failure and are kept",
                    ids.len()
                );
                ledger.append(ids);
                ledger.store(task);
            }
            Err(record_error(task, error))
        }
    }
}

fn record_error(task: &mut dyn ProvisioningTask, error: ProvisionError) -> ProvisionError {
    if error.is_validation() {
        log::warn!("Rejected: {}", error.message);
    } else {
        log::error!("{}", error.message);
    }
    task.set_result(TaskResult::Error { reason: error.message.clone() });
    error
}
