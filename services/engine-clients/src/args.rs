//! Connection argument sets
//!
//! Each service SDK expects its own argument names for the same two
//! credential shapes. The builders here do the mapping; the broker decides
//! when to call them.

use secrecy::SecretString;

use crate::context::{Credentials, PasswordCredentials, SecurityContext, TokenCredentials};
use crate::error::ClientError;
use crate::ServiceKind;

/// Default compute API variant
pub const DEFAULT_COMPUTE_SERVICE_TYPE: &str = "compute";

/// Service type requested from the network SDK
pub const NETWORK_SERVICE_TYPE: &str = "network";

/// Identity API version the storage SDK authenticates against
pub const STORAGE_AUTH_VERSION: &str = "2";

fn missing_credentials(service: ServiceKind) -> ClientError {
    ClientError::MissingCredentials { service }
}

/// Arguments for authenticating an identity client
#[derive(Debug, Clone)]
pub struct IdentityArgs {
    pub auth_url: String,
    pub username: String,
    pub password: SecretString,
    pub tenant_name: String,
    /// Set for password credentials only
    pub tenant_id: Option<String>,
    /// Set for delegated token credentials only
    pub token: Option<SecretString>,
}

impl IdentityArgs {
    pub fn from_context(context: &SecurityContext) -> Result<Self, ClientError> {
        let auth_url = context.auth_url().to_string();
        match context.credentials() {
            Credentials::Password(creds) => Ok(Self {
                auth_url,
                username: creds.username.clone(),
                password: creds.password.clone(),
                tenant_name: creds.tenant.clone(),
                tenant_id: creds.tenant_id.clone(),
                token: None,
            }),
            Credentials::Token(creds) => Ok(Self {
                auth_url,
                username: creds.service_user.clone(),
                password: creds.service_password.clone(),
                tenant_name: creds.service_tenant.clone(),
                tenant_id: None,
                token: Some(creds.auth_token.clone()),
            }),
            Credentials::None => Err(missing_credentials(ServiceKind::Identity)),
        }
    }
}

/// Options passed alongside compute arguments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComputeOptions {
    /// Ask the SDK not to use its local credential cache
    pub no_cache: bool,
}

impl ComputeOptions {
    pub fn no_cache() -> Self {
        Self { no_cache: true }
    }
}

/// Arguments for authenticating a compute client
#[derive(Debug, Clone)]
pub struct ComputeArgs {
    pub auth_url: String,
    pub service_type: String,
    pub username: String,
    pub api_key: SecretString,
    pub project_id: String,
    pub proxy_token: Option<SecretString>,
    pub proxy_tenant_id: Option<String>,
}

impl ComputeArgs {
    pub fn from_context(context: &SecurityContext, service_type: &str) -> Result<Self, ClientError> {
        let auth_url = context.auth_url().to_string();
        let service_type = service_type.to_string();
        match context.credentials() {
            Credentials::Password(creds) => Ok(Self {
                auth_url,
                service_type,
                username: creds.username.clone(),
                api_key: creds.password.clone(),
                project_id: creds.tenant.clone(),
                proxy_token: None,
                proxy_tenant_id: None,
            }),
            Credentials::Token(creds) => Ok(Self {
                auth_url,
                service_type,
                username: creds.service_user.clone(),
                api_key: creds.service_password.clone(),
                project_id: creds.service_tenant.clone(),
                proxy_token: Some(creds.auth_token.clone()),
                proxy_tenant_id: creds.tenant_id.clone(),
            }),
            Credentials::None => Err(missing_credentials(ServiceKind::Compute)),
        }
    }
}

/// Arguments for constructing an object storage connection
///
/// Password connections authenticate themselves against `auth_url`.
/// Token connections skip authentication and go straight to `preauth_url`
/// with `preauth_token`.
#[derive(Debug, Clone)]
pub struct StorageArgs {
    pub auth_version: &'static str,
    pub user: Option<String>,
    pub key: Option<SecretString>,
    pub auth_url: Option<String>,
    pub tenant_name: Option<String>,
    pub preauth_token: Option<SecretString>,
    pub preauth_url: Option<String>,
}

impl StorageArgs {
    pub fn with_password(auth_url: &str, creds: &PasswordCredentials) -> Self {
        Self {
            auth_version: STORAGE_AUTH_VERSION,
            user: Some(creds.username.clone()),
            key: Some(creds.password.clone()),
            auth_url: Some(auth_url.to_string()),
            tenant_name: Some(creds.tenant.clone()),
            preauth_token: None,
            preauth_url: None,
        }
    }

    /// `preauth_url` comes from the identity service catalog
    pub fn with_token(creds: &TokenCredentials, preauth_url: impl Into<String>) -> Self {
        Self {
            auth_version: STORAGE_AUTH_VERSION,
            user: None,
            key: None,
            auth_url: None,
            tenant_name: None,
            preauth_token: Some(creds.auth_token.clone()),
            preauth_url: Some(preauth_url.into()),
        }
    }
}

/// Arguments for authenticating a network client
#[derive(Debug, Clone)]
pub struct NetworkArgs {
    pub auth_url: String,
    pub service_type: &'static str,
    pub username: String,
    pub password: SecretString,
    pub tenant_name: String,
    pub token: Option<SecretString>,
}

impl NetworkArgs {
    pub fn from_context(context: &SecurityContext) -> Result<Self, ClientError> {
        let auth_url = context.auth_url().to_string();
        match context.credentials() {
            Credentials::Password(creds) => Ok(Self {
                auth_url,
                service_type: NETWORK_SERVICE_TYPE,
                username: creds.username.clone(),
                password: creds.password.clone(),
                tenant_name: creds.tenant.clone(),
                token: None,
            }),
            Credentials::Token(creds) => Ok(Self {
                auth_url,
                service_type: NETWORK_SERVICE_TYPE,
                username: creds.service_user.clone(),
                password: creds.service_password.clone(),
                tenant_name: creds.service_tenant.clone(),
                token: Some(creds.auth_token.clone()),
            }),
            Credentials::None => Err(missing_credentials(ServiceKind::Network)),
        }
    }
}
