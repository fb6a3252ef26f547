//! # provreq – Bulk VM provisioning request planning
//!
//! Turns a single "provision N VMs across these templates" order into one
//! provisioning request per template (or per VM), each with a fully merged
//! payload, and records the resulting request ids on the owning task.
//!
//! ## Modules
//!
//! - **types** — Shared data structures (requester, templates, catalog records, ids)
//! - **error** — Crate-specific error types
//! - **config** — Planner configuration (batching, debug, network policies)
//! - **distribute** — Even VM-count distribution across templates
//! - **catalog** — Inventory lookups for networks and templates
//! - **profile** — Network (vNIC) profile resolution seam
//! - **network** — Network classification and placement fields
//! - **fields** — Payload sections and merge precedence
//! - **engine** — Request payload + provisioning engine seam
//! - **task** — Owning service task and its option store
//! - **ledger** — Append-only request-id ledger on the task
//! - **planner** — Validate, build and submit requests

pub mod types;
pub mod error;
pub mod config;
pub mod distribute;
pub mod catalog;
pub mod profile;
pub mod network;
pub mod fields;
pub mod engine;
pub mod task;
pub mod ledger;
pub mod planner;
