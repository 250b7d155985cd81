//! Security context
//!
//! The read-only input a broker is bound to. A context carries either the
//! caller's own password credentials or a delegated token that the engine's
//! service account presents on the caller's behalf, never both.

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ContextError;

/// Password credentials of the requesting user
#[derive(Debug, Clone)]
pub struct PasswordCredentials {
    pub username: String,
    pub password: SecretString,
    /// Tenant name
    pub tenant: String,
    pub tenant_id: Option<String>,
}

impl PasswordCredentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        tenant: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            tenant: tenant.into(),
            tenant_id: None,
        }
    }

    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }
}

/// Delegated token credentials
///
/// The service account authenticates as itself and presents `auth_token`
/// to act for the tenant identified by `tenant_id`.
#[derive(Debug, Clone)]
pub struct TokenCredentials {
    pub service_user: String,
    pub service_password: SecretString,
    pub service_tenant: String,
    pub auth_token: SecretString,
    pub tenant_id: Option<String>,
}

impl TokenCredentials {
    pub fn new(
        service_user: impl Into<String>,
        service_password: impl Into<String>,
        service_tenant: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            service_user: service_user.into(),
            service_password: SecretString::from(service_password.into()),
            service_tenant: service_tenant.into(),
            auth_token: SecretString::from(auth_token.into()),
            tenant_id: None,
        }
    }

    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }
}

/// The credential shape a context carries
#[derive(Debug, Clone)]
pub enum Credentials {
    Password(PasswordCredentials),
    Token(TokenCredentials),
    None,
}

impl Credentials {
    /// Name of the authentication strategy these credentials select
    pub fn strategy(&self) -> &'static str {
        match self {
            Credentials::Password(_) => "password",
            Credentials::Token(_) => "token",
            Credentials::None => "none",
        }
    }
}

/// Read-only security context a broker is bound to
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "ContextRecord")]
pub struct SecurityContext {
    auth_url: String,
    credentials: Credentials,
}

impl SecurityContext {
    pub fn new(auth_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            auth_url: auth_url.into(),
            credentials,
        }
    }

    pub fn with_password(auth_url: impl Into<String>, credentials: PasswordCredentials) -> Self {
        Self::new(auth_url, Credentials::Password(credentials))
    }

    pub fn with_token(auth_url: impl Into<String>, credentials: TokenCredentials) -> Self {
        Self::new(auth_url, Credentials::Token(credentials))
    }

    pub fn without_credentials(auth_url: impl Into<String>) -> Self {
        Self::new(auth_url, Credentials::None)
    }

    /// Identity service endpoint
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

/// Flat context record as passed between engine components
///
/// Every field may be absent. A password wins over a token, and neither
/// yields `Credentials::None`.
#[derive(Default, Clone, Deserialize)]
pub struct ContextRecord {
    pub auth_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tenant: Option<String>,
    pub tenant_id: Option<String>,
    pub auth_token: Option<String>,
    pub service_user: Option<String>,
    pub service_password: Option<String>,
    pub service_tenant: Option<String>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ContextError> {
    value.ok_or(ContextError::MissingField(field))
}

impl TryFrom<ContextRecord> for SecurityContext {
    type Error = ContextError;

    fn try_from(record: ContextRecord) -> Result<Self, Self::Error> {
        let auth_url = required(record.auth_url, "auth_url")?;

        let credentials = if let Some(password) = record.password {
            Credentials::Password(PasswordCredentials {
                username: required(record.username, "username")?,
                password: SecretString::from(password),
                tenant: required(record.tenant, "tenant")?,
                tenant_id: record.tenant_id,
            })
        } else if let Some(auth_token) = record.auth_token {
            Credentials::Token(TokenCredentials {
                service_user: required(record.service_user, "service_user")?,
                service_password: SecretString::from(required(
                    record.service_password,
                    "service_password",
                )?),
                service_tenant: required(record.service_tenant, "service_tenant")?,
                auth_token: SecretString::from(auth_token),
                tenant_id: record.tenant_id,
            })
        } else {
            Credentials::None
        };

        Ok(SecurityContext {
            auth_url,
            credentials,
        })
    }
}
