//! Identity service catalog
//!
//! The catalog returned with an identity token lists every service the
//! tenant can reach and the endpoints it is published on. The broker only
//! reads it to locate object storage for delegated-token connections.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ClientError;

/// Service type object storage is registered under
pub const OBJECT_STORE_SERVICE_TYPE: &str = "object-store";

/// One published endpoint of a catalog service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "publicURL")]
    pub public_url: String,
    #[serde(rename = "internalURL", default, skip_serializing_if = "Option::is_none")]
    pub internal_url: Option<String>,
    #[serde(rename = "adminURL", default, skip_serializing_if = "Option::is_none")]
    pub admin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Endpoint {
    pub fn public(url: impl Into<String>) -> Self {
        Self {
            public_url: url.into(),
            internal_url: None,
            admin_url: None,
            region: None,
        }
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

/// A catalog entry: one service and its endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogService {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// Service catalog attached to an authenticated identity client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceCatalog {
    pub services: Vec<CatalogService>,
}

impl ServiceCatalog {
    /// Parse the `serviceCatalog` array of an identity token response
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Add a service with its endpoints
    pub fn service(
        mut self,
        service_type: impl Into<String>,
        name: impl Into<String>,
        endpoints: Vec<Endpoint>,
    ) -> Self {
        self.services.push(CatalogService {
            service_type: service_type.into(),
            name: name.into(),
            endpoints,
        });
        self
    }

    /// Endpoints of every service registered under `service_type`
    pub fn endpoints(&self, service_type: &str) -> Vec<&Endpoint> {
        self.services
            .iter()
            .filter(|s| s.service_type == service_type)
            .flat_map(|s| s.endpoints.iter())
            .collect()
    }

    /// Endpoints keyed by the requested service type
    ///
    /// The map always holds exactly one key, `service_type`, even when no
    /// endpoint matched.
    pub fn get_endpoints(&self, service_type: &str) -> HashMap<String, Vec<Endpoint>> {
        let endpoints = self.endpoints(service_type).into_iter().cloned().collect();
        HashMap::from([(service_type.to_string(), endpoints)])
    }

    /// Public URL of the only endpoint for `service_type`.
    ///
    /// Zero or several endpoints is an error: picking one of several could
    /// connect to the wrong region.
    pub fn unique_public_url(&self, service_type: &str) -> Result<&str, ClientError> {
        let endpoints = self.endpoints(service_type);
        match endpoints[..] {
            [endpoint] => Ok(endpoint.public_url.as_str()),
            _ => Err(ClientError::AmbiguousEndpoint {
                service_type: service_type.to_string(),
                found: endpoints.len(),
            }),
        }
    }
}
