//! Service SDK capability interface
//!
//! The broker never speaks a service protocol itself. A `CloudSdk`
//! implementation wraps the actual client libraries and hands back their
//! authenticated handles, which the broker caches opaquely.

use async_trait::async_trait;

use crate::args::{ComputeArgs, ComputeOptions, IdentityArgs, NetworkArgs, StorageArgs};
use crate::catalog::ServiceCatalog;
use crate::error::SdkError;

/// An authenticated identity client
pub trait IdentityClient: Send + Sync {
    /// Catalog returned with the client's token
    fn service_catalog(&self) -> &ServiceCatalog;
}

/// Trait for the set of service SDKs a deployment ships
#[async_trait]
pub trait CloudSdk: Send + Sync + 'static {
    type Identity: IdentityClient + 'static;
    type Compute: Send + Sync + 'static;
    type Storage: Send + Sync + 'static;
    type Network: Send + Sync + 'static;

    /// Authenticate against the identity service
    async fn authenticate_identity(&self, args: &IdentityArgs) -> Result<Self::Identity, SdkError>;

    /// Authenticate a compute client.
    ///
    /// SDK versions that do not understand an option in `options` must
    /// fail with `SdkError::IncompatibleOption`.
    async fn authenticate_compute(
        &self,
        args: &ComputeArgs,
        options: ComputeOptions,
    ) -> Result<Self::Compute, SdkError>;

    /// Construct an object storage connection; there is no separate
    /// authenticate step
    fn connect_storage(&self, args: &StorageArgs) -> Result<Self::Storage, SdkError>;

    /// Authenticate a network client
    async fn authenticate_network(&self, args: &NetworkArgs) -> Result<Self::Network, SdkError>;
}
