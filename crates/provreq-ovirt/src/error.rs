//! Error types for the oVirt integration crate.

use provreq_core::error::{ProvisionError, ProvisionErrorKind};

/// Categorised error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OvirtErrorKind {
    /// Engine unreachable or connection test failed
    ConnectionError,
    /// Authentication failed (401) or no credentials on record
    AuthenticationError,
    /// Resource not found (404)
    NotFound,
    /// HTTP / API error with status code
    ApiError(u16),
    /// JSON parse / deserialization error
    ParseError,
    /// Timeout
    Timeout,
    /// Generic
    Other,
}

/// Crate error type carrying a kind + human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{kind:?}] {message}")]
pub struct OvirtError {
    pub kind: OvirtErrorKind,
    pub message: String,
}

impl OvirtError {
    pub fn new(kind: OvirtErrorKind, msg: impl Into<String>) -> Self {
        Self { kind, message: msg.into() }
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::new(OvirtErrorKind::ConnectionError, msg)
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::new(OvirtErrorKind::AuthenticationError, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(OvirtErrorKind::NotFound, msg)
    }

    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        Self::new(OvirtErrorKind::ApiError(status), msg)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(OvirtErrorKind::ParseError, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(OvirtErrorKind::Timeout, msg)
    }
}

impl From<OvirtError> for String {
    fn from(e: OvirtError) -> String {
        e.to_string()
    }
}

impl From<reqwest::Error> for OvirtError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(format!("HTTP timeout: {e}"))
        } else if e.is_connect() {
            Self::connection(format!("Connection failed: {e}"))
        } else {
            Self::new(OvirtErrorKind::Other, format!("HTTP error: {e}"))
        }
    }
}

impl From<serde_json::Error> for OvirtError {
    fn from(e: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {e}"))
    }
}

impl From<url::ParseError> for OvirtError {
    fn from(e: url::ParseError) -> Self {
        Self::connection(format!("Invalid engine URL: {e}"))
    }
}

impl From<OvirtError> for ProvisionError {
    fn from(e: OvirtError) -> Self {
        let kind = match e.kind {
            OvirtErrorKind::ConnectionError => ProvisionErrorKind::ConnectionError,
            OvirtErrorKind::AuthenticationError => ProvisionErrorKind::AuthenticationError,
            OvirtErrorKind::NotFound => ProvisionErrorKind::NotFound,
            OvirtErrorKind::ParseError => ProvisionErrorKind::ParseError,
            OvirtErrorKind::Timeout => ProvisionErrorKind::Timeout,
            OvirtErrorKind::ApiError(_) => ProvisionErrorKind::ConnectionError,
            OvirtErrorKind::Other => ProvisionErrorKind::Other,
        };
        ProvisionError::new(kind, format!("oVirt: {}", e.message))
    }
}

/// Convenience alias.
pub type OvirtResult<T> = Result<T, OvirtError>;
