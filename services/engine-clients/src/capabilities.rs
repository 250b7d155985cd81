//! Service kinds and optional-SDK availability
//!
//! Object storage and network are optional integrations: a deployment may
//! ship without their SDKs. Availability is fixed at startup and never
//! changes for the lifetime of the process.

use serde::Serialize;

/// The cloud services the broker hands out clients for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Identity,
    Compute,
    Storage,
    Network,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::Identity,
        ServiceKind::Compute,
        ServiceKind::Storage,
        ServiceKind::Network,
    ];

    /// Whether a deployment may run without this service's SDK
    pub fn is_optional(self) -> bool {
        matches!(self, ServiceKind::Storage | ServiceKind::Network)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::Identity => "identity",
            ServiceKind::Compute => "compute",
            ServiceKind::Storage => "storage",
            ServiceKind::Network => "network",
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Process-wide availability of the optional service SDKs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub storage: bool,
    pub network: bool,
}

impl Capabilities {
    pub fn new(storage: bool, network: bool) -> Self {
        Self { storage, network }
    }

    /// Every optional service available
    pub fn all() -> Self {
        Self::new(true, true)
    }

    /// Availability as compiled into this build (`storage` / `network` features)
    pub fn detect() -> Self {
        Self::new(cfg!(feature = "storage"), cfg!(feature = "network"))
    }

    pub fn is_available(&self, service: ServiceKind) -> bool {
        match service {
            ServiceKind::Identity | ServiceKind::Compute => true,
            ServiceKind::Storage => self.storage,
            ServiceKind::Network => self.network,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_kind_display() {
        assert_eq!(ServiceKind::Identity.to_string(), "identity");
        assert_eq!(ServiceKind::Network.to_string(), "network");
    }

    #[test]
    fn test_required_services_are_always_available() {
        let caps = Capabilities::new(false, false);
        assert!(caps.is_available(ServiceKind::Identity));
        assert!(caps.is_available(ServiceKind::Compute));
        assert!(!caps.is_available(ServiceKind::Storage));
        assert!(!caps.is_available(ServiceKind::Network));
    }

    #[test]
    fn test_only_storage_and_network_are_optional() {
        let optional: Vec<_> = ServiceKind::ALL
            .into_iter()
            .filter(|kind| kind.is_optional())
            .collect();
        assert_eq!(optional, vec![ServiceKind::Storage, ServiceKind::Network]);
    }

    #[test]
    fn test_detect_follows_cargo_features() {
        let caps = Capabilities::detect();
        assert_eq!(caps.storage, cfg!(feature = "storage"));
        assert_eq!(caps.network, cfg!(feature = "network"));
    }
}
