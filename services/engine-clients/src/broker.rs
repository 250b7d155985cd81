//! Client broker
//!
//! One `ClientBroker` is created per unit of work (a resource operation)
//! and bound to that work's `SecurityContext`. It lazily authenticates each
//! service client the first time it is asked for, caches the handle, and
//! hands the cached handle back on every later call.
//!
//! ## Caching rules
//!
//! - A successful authentication is cached for the broker's lifetime.
//! - A failed one is not: the next call authenticates from scratch.
//! - Concurrent first calls for the same slot are serialized, so at most
//!   one authentication is ever cached per slot.
//! - Compute handles are cached per service type, so several compute API
//!   variants can be held at once.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, error};

use crate::args::{
    ComputeArgs, ComputeOptions, IdentityArgs, NetworkArgs, StorageArgs,
    DEFAULT_COMPUTE_SERVICE_TYPE,
};
use crate::capabilities::{Capabilities, ServiceKind};
use crate::catalog::OBJECT_STORE_SERVICE_TYPE;
use crate::context::{Credentials, SecurityContext};
use crate::error::{ClientError, SdkError};
use crate::sdk::{CloudSdk, IdentityClient};

type Slot<T> = OnceCell<Arc<T>>;

fn authentication_failed(service: ServiceKind, err: SdkError) -> ClientError {
    ClientError::AuthenticationFailed {
        service,
        reason: err.to_string(),
    }
}

/// Return the cached handle in `slot`, or run `connect` and cache its result
async fn cached<T, F, Fut>(
    slot: &Slot<T>,
    service: ServiceKind,
    connect: F,
) -> Result<Arc<T>, ClientError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    if let Some(client) = slot.get() {
        debug!(service = %service, "Using existing client");
        return Ok(Arc::clone(client));
    }

    slot.get_or_try_init(|| async move { connect().await.map(Arc::new) })
        .await
        .map(Arc::clone)
        .inspect_err(|err| error!(service = %service, error = %err, "Client connection failed"))
}

/// Process-wide source of brokers
///
/// Pairs the deployment's SDKs with the optional-service availability
/// decided at startup. Create one at startup and call `broker` once per
/// unit of work.
pub struct ClientFactory<S> {
    sdk: Arc<S>,
    capabilities: Capabilities,
}

impl<S: CloudSdk> ClientFactory<S> {
    pub fn new(sdk: S, capabilities: Capabilities) -> Self {
        Self {
            sdk: Arc::new(sdk),
            capabilities,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn sdk(&self) -> &S {
        &self.sdk
    }

    /// New broker bound to `context`, with an empty cache
    pub fn broker(&self, context: SecurityContext) -> ClientBroker<S> {
        ClientBroker::new(Arc::clone(&self.sdk), self.capabilities, context)
    }
}

/// Per-context cache of authenticated service clients
pub struct ClientBroker<S: CloudSdk> {
    sdk: Arc<S>,
    capabilities: Capabilities,
    context: Arc<SecurityContext>,
    identity: Slot<S::Identity>,
    compute: Mutex<HashMap<String, Arc<Slot<S::Compute>>>>,
    storage: Slot<S::Storage>,
    network: Slot<S::Network>,
}

impl<S: CloudSdk> ClientBroker<S> {
    pub fn new(sdk: Arc<S>, capabilities: Capabilities, context: SecurityContext) -> Self {
        Self {
            sdk,
            capabilities,
            context: Arc::new(context),
            identity: OnceCell::new(),
            compute: Mutex::new(HashMap::new()),
            storage: OnceCell::new(),
            network: OnceCell::new(),
        }
    }

    pub fn context(&self) -> &SecurityContext {
        &self.context
    }

    /// Whether a handle for `service` is cached (any variant, for compute)
    pub async fn is_cached(&self, service: ServiceKind) -> bool {
        match service {
            ServiceKind::Identity => self.identity.initialized(),
            ServiceKind::Compute => self
                .compute
                .lock()
                .await
                .values()
                .any(|slot| slot.initialized()),
            ServiceKind::Storage => self.storage.initialized(),
            ServiceKind::Network => self.network.initialized(),
        }
    }

    /// Whether a compute handle for `service_type` is cached
    pub async fn is_compute_cached(&self, service_type: &str) -> bool {
        self.compute
            .lock()
            .await
            .get(service_type)
            .is_some_and(|slot| slot.initialized())
    }

    /// Authenticated identity client
    pub async fn identity(&self) -> Result<Arc<S::Identity>, ClientError> {
        cached(&self.identity, ServiceKind::Identity, || async {
            let args = IdentityArgs::from_context(&self.context)?;
            debug!(service = %ServiceKind::Identity, ?args, "Authenticating client");

            self.sdk
                .authenticate_identity(&args)
                .await
                .map_err(|err| authentication_failed(ServiceKind::Identity, err))
        })
        .await
    }

    /// Authenticated client for the default compute API
    pub async fn compute_default(&self) -> Result<Arc<S::Compute>, ClientError> {
        self.compute(DEFAULT_COMPUTE_SERVICE_TYPE).await
    }

    /// Authenticated compute client for the `service_type` API variant
    pub async fn compute(&self, service_type: &str) -> Result<Arc<S::Compute>, ClientError> {
        let slot = {
            let mut slots = self.compute.lock().await;
            Arc::clone(slots.entry(service_type.to_string()).or_default())
        };

        cached(&*slot, ServiceKind::Compute, || self.authenticate_compute(service_type)).await
    }

    async fn authenticate_compute(&self, service_type: &str) -> Result<S::Compute, ClientError> {
        let args = ComputeArgs::from_context(&self.context, service_type)?;
        debug!(service = %ServiceKind::Compute, ?args, "Authenticating client");

        match self
            .sdk
            .authenticate_compute(&args, ComputeOptions::no_cache())
            .await
        {
            Ok(client) => Ok(client),
            // Older compute SDKs predate the no_cache option
            Err(SdkError::IncompatibleOption(option)) => {
                debug!(
                    service = %ServiceKind::Compute,
                    option = %option,
                    "Retrying compute authentication without no_cache"
                );
                self.sdk
                    .authenticate_compute(&args, ComputeOptions::default())
                    .await
                    .map_err(|err| authentication_failed(ServiceKind::Compute, err))
            }
            Err(err) => Err(authentication_failed(ServiceKind::Compute, err)),
        }
    }

    /// Object storage connection
    ///
    /// With a delegated token the storage endpoint is looked up in the
    /// identity catalog, so this may authenticate the identity client first.
    pub async fn storage(&self) -> Result<Arc<S::Storage>, ClientError> {
        self.ensure_available(ServiceKind::Storage)?;
        cached(&self.storage, ServiceKind::Storage, || self.connect_storage()).await
    }

    async fn connect_storage(&self) -> Result<S::Storage, ClientError> {
        let args = match self.context.credentials() {
            Credentials::Password(creds) => StorageArgs::with_password(self.context.auth_url(), creds),
            Credentials::Token(creds) => {
                let preauth_url = self.object_store_url().await?;
                StorageArgs::with_token(creds, preauth_url)
            }
            Credentials::None => {
                return Err(ClientError::MissingCredentials {
                    service: ServiceKind::Storage,
                })
            }
        };
        debug!(service = %ServiceKind::Storage, ?args, "Connecting client");

        self.sdk
            .connect_storage(&args)
            .map_err(|err| authentication_failed(ServiceKind::Storage, err))
    }

    async fn object_store_url(&self) -> Result<String, ClientError> {
        let identity = self.identity().await?;
        let url = identity
            .service_catalog()
            .unique_public_url(OBJECT_STORE_SERVICE_TYPE)?;

        debug!(url = %url, "Resolved object-store endpoint from service catalog");
        Ok(url.to_string())
    }

    /// Authenticated network client
    pub async fn network(&self) -> Result<Arc<S::Network>, ClientError> {
        self.ensure_available(ServiceKind::Network)?;
        cached(&self.network, ServiceKind::Network, || async {
            let args = NetworkArgs::from_context(&self.context)?;
            debug!(service = %ServiceKind::Network, ?args, "Authenticating client");

            self.sdk
                .authenticate_network(&args)
                .await
                .map_err(|err| authentication_failed(ServiceKind::Network, err))
        })
        .await
    }

    fn ensure_available(&self, service: ServiceKind) -> Result<(), ClientError> {
        if self.capabilities.is_available(service) {
            return Ok(());
        }
        let err = ClientError::CapabilityUnavailable { service };
        error!(service = %service, "{}", err);
        Err(err)
    }
}
