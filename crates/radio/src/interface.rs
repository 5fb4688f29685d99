//! Managed radio interfaces and the registry that lists them.
//!
//! The registry is consulted on every push; the controller never caches
//! its membership.

use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

use crate::country::CountryCode;

/// Failure reported by a single interface while applying a code.
#[derive(Debug, Error)]
pub enum InterfaceError {
    /// Driver refused the code
    #[error("Interface {interface} rejected country code {code}")]
    Rejected {
        /// Interface name
        interface: String,
        /// Code that was refused
        code: String,
    },

    /// Interface could not be reached
    #[error("Interface unavailable: {0}")]
    Unavailable(String),
}

/// A radio interface that can apply a regulatory country code.
pub trait ManagedInterface: Send + Sync {
    /// Interface name, used in logs
    fn name(&self) -> &str;

    /// Apply the code to the underlying driver
    fn set_country_code(&self, code: &CountryCode) -> Result<(), InterfaceError>;
}

/// Source of the interfaces currently under management.
pub trait InterfaceRegistry: Send + Sync {
    /// Snapshot of the managed interfaces at the time of the call
    fn managed_interfaces(&self) -> Vec<Arc<dyn ManagedInterface>>;
}

/// Registry backed by an in-memory list, mutable at runtime.
#[derive(Default)]
pub struct StaticRegistry {
    interfaces: RwLock<Vec<Arc<dyn ManagedInterface>>>,
}

impl StaticRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Start managing an interface
    pub fn add(&self, interface: Arc<dyn ManagedInterface>) {
        tracing::debug!(interface = interface.name(), "Interface added to registry");
        self.interfaces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(interface);
    }

    /// Stop managing every interface with the given name. Returns how many were removed.
    pub fn remove(&self, name: &str) -> usize {
        let mut interfaces = self
            .interfaces
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = interfaces.len();
        interfaces.retain(|iface| iface.name() != name);
        let removed = before - interfaces.len();
        if removed > 0 {
            tracing::debug!(interface = name, "Interface removed from registry");
        }
        removed
    }

    /// Number of interfaces under management
    pub fn len(&self) -> usize {
        self.interfaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing is under management
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InterfaceRegistry for StaticRegistry {
    fn managed_interfaces(&self) -> Vec<Arc<dyn ManagedInterface>> {
        self.interfaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NamedInterface(&'static str);

    impl ManagedInterface for NamedInterface {
        fn name(&self) -> &str {
            self.0
        }

        fn set_country_code(&self, _code: &CountryCode) -> Result<(), InterfaceError> {
            Ok(())
        }
    }

    #[test]
    fn test_registry_add_remove() {
        let registry = StaticRegistry::new();
        assert!(registry.is_empty());

        registry.add(Arc::new(NamedInterface("wlan0")));
        registry.add(Arc::new(NamedInterface("wlan1")));
        assert_eq!(registry.len(), 2);

        assert_eq!(registry.remove("wlan0"), 1);
        assert_eq!(registry.remove("wlan0"), 0);

        let names: Vec<String> = registry
            .managed_interfaces()
            .iter()
            .map(|iface| iface.name().to_string())
            .collect();
        assert_eq!(names, vec!["wlan1".to_string()]);
    }

    #[test]
    fn test_snapshot_is_detached_from_registry() {
        let registry = StaticRegistry::new();
        registry.add(Arc::new(NamedInterface("wlan0")));

        let snapshot = registry.managed_interfaces();
        registry.add(Arc::new(NamedInterface("wlan1")));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.managed_interfaces().len(), 2);
    }

    #[test]
    fn test_rejected_error_message() {
        let err = InterfaceError::Rejected {
            interface: "wlan0".to_string(),
            code: "XX".to_string(),
        };
        assert_eq!(err.to_string(), "Interface wlan0 rejected country code XX");
    }
}
