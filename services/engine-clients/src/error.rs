//! Error types for the client broker
//!
//! `ClientError` is what callers of the broker see. `SdkError` is what the
//! wrapped service SDKs report back to the broker. `ContextError` covers
//! building a `SecurityContext` from a flat context record.

use thiserror::Error;

use crate::ServiceKind;

/// Errors surfaced by the broker accessors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Neither password nor delegated token credentials are present
    #[error("{service} connection failed, no password or auth_token")]
    MissingCredentials { service: ServiceKind },

    /// The underlying SDK refused the credentials or failed to connect
    #[error("{service} authentication failed: {reason}")]
    AuthenticationFailed { service: ServiceKind, reason: String },

    /// The identity catalog did not hold exactly one endpoint for the service type
    #[error("expected exactly one endpoint for {service_type} service type, found {found}")]
    AmbiguousEndpoint { service_type: String, found: usize },

    /// The optional SDK for this service is not part of this deployment
    #[error("{service} client is not available in this deployment")]
    CapabilityUnavailable { service: ServiceKind },
}

impl ClientError {
    /// Service the failure belongs to
    pub fn service(&self) -> ServiceKind {
        match self {
            ClientError::MissingCredentials { service }
            | ClientError::AuthenticationFailed { service, .. }
            | ClientError::CapabilityUnavailable { service } => *service,
            ClientError::AmbiguousEndpoint { .. } => ServiceKind::Storage,
        }
    }

    /// Whether calling the same accessor again, unchanged, can succeed.
    ///
    /// Only SDK-side authentication failures qualify: nothing failed is
    /// cached, so the next call starts over.
    pub fn is_retriable(&self) -> bool {
        matches!(self, ClientError::AuthenticationFailed { .. })
    }
}

/// Errors reported by a wrapped service SDK
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    /// The SDK does not understand a connection option it was given
    #[error("incompatible connection option: {0}")]
    IncompatibleOption(String),

    /// The remote service rejected the credentials
    #[error("credentials rejected: {0}")]
    Rejected(String),

    /// Any other SDK failure
    #[error("{0}")]
    Failed(String),
}

impl From<anyhow::Error> for SdkError {
    fn from(err: anyhow::Error) -> Self {
        SdkError::Failed(format!("{:#}", err))
    }
}

/// Errors building a `SecurityContext` from a context record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// A field required by the selected credential shape is absent
    #[error("context record is missing required field: {0}")]
    MissingField(&'static str),
}
