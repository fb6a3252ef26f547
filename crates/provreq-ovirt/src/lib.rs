//! # provreq – oVirt / RHV integration
//!
//! Resolves provisioning network names to vNIC profile ids through the
//! oVirt engine REST API (`https://{host}/ovirt-engine/api`).
//!
//! ## Modules
//!
//! - **types** — Connection config and API payloads
//! - **error** — Crate-specific error types
//! - **client** — REST client with basic auth
//! - **vnic** — vNIC profile listing
//! - **resolver** — `NetworkProfileResolver` implementation

pub mod types;
pub mod error;
pub mod client;
pub mod vnic;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_server;
