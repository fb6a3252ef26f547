//! Error types for the provisioning-request planner.

use serde::{Deserialize, Serialize};

/// Categorised error kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProvisionErrorKind {
    /// Malformed or unsupported input (bad VM count, wrong task type, ...)
    InvalidInput,
    /// No templates were selected
    MissingTemplates,
    /// Network, template or network profile could not be found
    NotFound,
    /// Management API unreachable
    ConnectionError,
    /// Management API rejected the credentials
    AuthenticationError,
    /// Provisioning engine rejected a payload
    SubmissionError,
    /// Stored option or API payload could not be decoded
    ParseError,
    /// External call timed out
    Timeout,
    /// Generic
    Other,
}

/// Crate error type carrying a kind + human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("[{kind:?}] {message}")]
pub struct ProvisionError {
    pub kind: ProvisionErrorKind,
    pub message: String,
}

impl ProvisionError {
    pub fn new(kind: ProvisionErrorKind, msg: impl Into<String>) -> Self {
        Self { kind, message: msg.into() }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ProvisionErrorKind::InvalidInput, msg)
    }

    pub fn missing_templates() -> Self {
        Self::new(
            ProvisionErrorKind::MissingTemplates,
            "Selected templates must be specified",
        )
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ProvisionErrorKind::NotFound, msg)
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::new(ProvisionErrorKind::ConnectionError, msg)
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::new(ProvisionErrorKind::AuthenticationError, msg)
    }

    pub fn submission(msg: impl Into<String>) -> Self {
        Self::new(ProvisionErrorKind::SubmissionError, msg)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(ProvisionErrorKind::ParseError, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(ProvisionErrorKind::Timeout, msg)
    }

    /// Validation failures abort the invocation before anything is submitted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind,
            ProvisionErrorKind::InvalidInput | ProvisionErrorKind::MissingTemplates
        )
    }
}

impl From<ProvisionError> for String {
    fn from(e: ProvisionError) -> String {
        e.to_string()
    }
}

impl From<serde_json::Error> for ProvisionError {
    fn from(e: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {e}"))
    }
}

/// Convenience alias.
pub type ProvisionResult<T> = Result<T, ProvisionError>;
