//! # provreq
//!
//! Bulk VM provisioning for service provisioning tasks: one order for N VMs
//! across several templates becomes one provisioning request per template
//! (or per VM), each placed on its location's network, and the created
//! request ids are appended to the task.
//!
//! - **options** — Decoding of the task's dialog/custom option bags
//! - **invocation** — Automation entry point
//! - **logging** — Subscriber setup for the `log`/`tracing` output
//!
//! Planning itself lives in `provreq-core`; the oVirt vNIC profile lookup in
//! `provreq-ovirt`.

pub mod invocation;
pub mod logging;
pub mod options;

pub use invocation::{create_provision_requests, InvocationContext, SERVICE_TEMPLATE_PROVISION_TASK};
pub use logging::init_logging;
pub use options::TaskOptions;

pub use provreq_core;
pub use provreq_ovirt;
