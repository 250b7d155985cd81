//! Recording fake of the service SDKs
//!
//! Every call is recorded with the exact argument set it received. Failures
//! can be scripted per service and are consumed one call at a time.

#![allow(dead_code)]

use async_trait::async_trait;
use engine_clients::{
    Capabilities, ClientBroker, ClientFactory, CloudSdk, ComputeArgs, ComputeOptions, Endpoint,
    IdentityArgs, IdentityClient, NetworkArgs, PasswordCredentials, SdkError, SecurityContext,
    ServiceCatalog, ServiceKind, StorageArgs, TokenCredentials, OBJECT_STORE_SERVICE_TYPE,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

pub const AUTH_URL: &str = "http://id/";
pub const SWIFT_URL: &str = "http://swift:8080/v1/AUTH_42";

#[derive(Debug)]
pub struct FakeIdentity {
    pub catalog: ServiceCatalog,
}

impl IdentityClient for FakeIdentity {
    fn service_catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }
}

#[derive(Debug)]
pub struct FakeCompute {
    pub service_type: String,
    pub no_cache: bool,
}

#[derive(Debug)]
pub struct FakeStorage {
    pub preauth_url: Option<String>,
}

#[derive(Debug)]
pub struct FakeNetwork;

pub struct FakeSdk {
    pub catalog: ServiceCatalog,
    /// Reject `no_cache` the way pre-option SDK releases do
    pub legacy_compute: bool,
    pub identity_delay: Option<Duration>,
    pub identity_calls: Mutex<Vec<IdentityArgs>>,
    pub compute_calls: Mutex<Vec<(ComputeArgs, ComputeOptions)>>,
    pub storage_calls: Mutex<Vec<StorageArgs>>,
    pub network_calls: Mutex<Vec<NetworkArgs>>,
    pub failures: Mutex<HashMap<ServiceKind, VecDeque<SdkError>>>,
}

impl Default for FakeSdk {
    fn default() -> Self {
        Self {
            catalog: single_swift_catalog(),
            legacy_compute: false,
            identity_delay: None,
            identity_calls: Mutex::default(),
            compute_calls: Mutex::default(),
            storage_calls: Mutex::default(),
            network_calls: Mutex::default(),
            failures: Mutex::default(),
        }
    }
}

impl FakeSdk {
    pub fn with_catalog(catalog: ServiceCatalog) -> Self {
        Self {
            catalog,
            ..Default::default()
        }
    }

    /// Make the next call for `service` fail with `err`
    pub fn fail_next(&self, service: ServiceKind, err: SdkError) {
        self.failures
            .lock()
            .unwrap()
            .entry(service)
            .or_default()
            .push_back(err);
    }

    pub fn calls(&self, service: ServiceKind) -> usize {
        match service {
            ServiceKind::Identity => self.identity_calls.lock().unwrap().len(),
            ServiceKind::Compute => self.compute_calls.lock().unwrap().len(),
            ServiceKind::Storage => self.storage_calls.lock().unwrap().len(),
            ServiceKind::Network => self.network_calls.lock().unwrap().len(),
        }
    }

    pub fn total_calls(&self) -> usize {
        ServiceKind::ALL.into_iter().map(|s| self.calls(s)).sum()
    }

    fn scripted_failure(&self, service: ServiceKind) -> Result<(), SdkError> {
        match self
            .failures
            .lock()
            .unwrap()
            .get_mut(&service)
            .and_then(VecDeque::pop_front)
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CloudSdk for FakeSdk {
    type Identity = FakeIdentity;
    type Compute = FakeCompute;
    type Storage = FakeStorage;
    type Network = FakeNetwork;

    async fn authenticate_identity(&self, args: &IdentityArgs) -> Result<FakeIdentity, SdkError> {
        self.identity_calls.lock().unwrap().push(args.clone());
        if let Some(delay) = self.identity_delay {
            tokio::time::sleep(delay).await;
        }
        self.scripted_failure(ServiceKind::Identity)?;
        Ok(FakeIdentity {
            catalog: self.catalog.clone(),
        })
    }

    async fn authenticate_compute(
        &self,
        args: &ComputeArgs,
        options: ComputeOptions,
    ) -> Result<FakeCompute, SdkError> {
        self.compute_calls
            .lock()
            .unwrap()
            .push((args.clone(), options));
        if self.legacy_compute && options.no_cache {
            return Err(SdkError::IncompatibleOption("no_cache".to_string()));
        }
        self.scripted_failure(ServiceKind::Compute)?;
        Ok(FakeCompute {
            service_type: args.service_type.clone(),
            no_cache: options.no_cache,
        })
    }

    fn connect_storage(&self, args: &StorageArgs) -> Result<FakeStorage, SdkError> {
        self.storage_calls.lock().unwrap().push(args.clone());
        self.scripted_failure(ServiceKind::Storage)?;
        Ok(FakeStorage {
            preauth_url: args.preauth_url.clone(),
        })
    }

    async fn authenticate_network(&self, args: &NetworkArgs) -> Result<FakeNetwork, SdkError> {
        self.network_calls.lock().unwrap().push(args.clone());
        self.scripted_failure(ServiceKind::Network)?;
        Ok(FakeNetwork)
    }
}

pub fn single_swift_catalog() -> ServiceCatalog {
    ServiceCatalog::default()
        .service(
            "compute",
            "nova",
            vec![Endpoint::public("http://nova:8774/v2/42")],
        )
        .service(
            OBJECT_STORE_SERVICE_TYPE,
            "swift",
            vec![Endpoint::public(SWIFT_URL).region("RegionOne")],
        )
}

pub fn password_context() -> SecurityContext {
    SecurityContext::with_password(AUTH_URL, PasswordCredentials::new("u", "p", "t").tenant_id("1"))
}

pub fn token_context() -> SecurityContext {
    SecurityContext::with_token(
        AUTH_URL,
        TokenCredentials::new("heat", "svc-pass", "service", "abc123").tenant_id("42"),
    )
}

pub fn empty_context() -> SecurityContext {
    SecurityContext::without_credentials(AUTH_URL)
}

pub fn broker(
    sdk: FakeSdk,
    capabilities: Capabilities,
    context: SecurityContext,
) -> (ClientFactory<FakeSdk>, ClientBroker<FakeSdk>) {
    let factory = ClientFactory::new(sdk, capabilities);
    let broker = factory.broker(context);
    (factory, broker)
}
