//! Engine Clients Library
//!
//! Authenticated cloud service clients for the orchestration engine's
//! resource layer, brokered per security context.
//!
//! ## Services
//!
//! - `identity`: always available; its service catalog drives endpoint discovery
//! - `compute`: always available, cached per API service type
//! - `storage`: optional (`storage` feature), object storage
//! - `network`: optional (`network` feature)
//!
//! ## Credentials
//!
//! A `SecurityContext` carries either the user's password credentials or a
//! delegated token presented through the engine's service account. A context
//! with neither fails every accessor with `ClientError::MissingCredentials`
//! before any SDK is touched.
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine_clients::{Capabilities, ClientFactory, PasswordCredentials, SecurityContext};
//!
//! // Once, at startup
//! let factory = ClientFactory::new(sdk, Capabilities::detect());
//!
//! // Per resource operation
//! let context = SecurityContext::with_password(
//!     "http://identity:5000/v2.0",
//!     PasswordCredentials::new("demo", password, "demo").tenant_id(tenant_id),
//! );
//! let clients = factory.broker(context);
//! let compute = clients.compute_default().await?;
//! let storage = clients.storage().await?;
//! ```

pub mod args;
pub mod broker;
pub mod capabilities;
pub mod catalog;
pub mod context;
pub mod error;
pub mod sdk;

pub use args::{
    ComputeArgs, ComputeOptions, IdentityArgs, NetworkArgs, StorageArgs,
    DEFAULT_COMPUTE_SERVICE_TYPE,
};
pub use broker::{ClientBroker, ClientFactory};
pub use capabilities::{Capabilities, ServiceKind};
pub use catalog::{CatalogService, Endpoint, ServiceCatalog, OBJECT_STORE_SERVICE_TYPE};
pub use context::{ContextRecord, Credentials, PasswordCredentials, SecurityContext, TokenCredentials};
pub use error::{ClientError, ContextError, SdkError};
pub use sdk::{CloudSdk, IdentityClient};
