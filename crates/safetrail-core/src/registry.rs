//! Service and API-key registries consulted during authentication.
//!
//! Both registries are external collaborators behind trait seams so the
//! orchestrator can be tested against in-memory fixtures. Lookups are
//! read-only; this subsystem never mutates either registry.

use std::collections::{HashMap, HashSet};

use crate::events::EmergencyType;

/// Registry entry describing a registered emergency service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    /// Jurisdiction the service is registered in.
    pub jurisdiction: String,
    /// Kind of emergency service.
    pub emergency_type: EmergencyType,
}

/// Read-only lookup of registered emergency services.
pub trait ServiceRegistry: Send + Sync {
    /// Returns the record for a service id, if registered.
    fn lookup(&self, service_id: &str) -> Option<ServiceRecord>;
}

/// Read-only membership check against the API-key allow-list.
pub trait ApiKeyRegistry: Send + Sync {
    /// Returns true if the key is on the allow-list.
    fn contains(&self, api_key: &str) -> bool;
}

/// In-memory service registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryServiceRegistry {
    services: HashMap<String, ServiceRecord>,
}

impl InMemoryServiceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service.
    pub fn insert(&mut self, service_id: impl Into<String>, record: ServiceRecord) {
        self.services.insert(service_id.into(), record);
    }

    /// Registry seeded with the development fixtures.
    pub fn development_fixture() -> Self {
        let mut registry = Self::new();
        registry.insert(
            "FIRE_DEPT_001",
            ServiceRecord {
                jurisdiction: "NYC".into(),
                emergency_type: EmergencyType::Fire,
            },
        );
        registry.insert(
            "POLICE_001",
            ServiceRecord {
                jurisdiction: "NYC".into(),
                emergency_type: EmergencyType::Police,
            },
        );
        registry.insert(
            "AMBULANCE_001",
            ServiceRecord {
                jurisdiction: "NYC".into(),
                emergency_type: EmergencyType::Medical,
            },
        );
        registry
    }
}

impl ServiceRegistry for InMemoryServiceRegistry {
    fn lookup(&self, service_id: &str) -> Option<ServiceRecord> {
        self.services.get(service_id).cloned()
    }
}

/// In-memory API-key allow-list.
#[derive(Debug, Clone, Default)]
pub struct InMemoryApiKeyRegistry {
    keys: HashSet<String>,
}

impl InMemoryApiKeyRegistry {
    /// Creates an empty allow-list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key to the allow-list.
    pub fn insert(&mut self, api_key: impl Into<String>) {
        self.keys.insert(api_key.into());
    }

    /// Allow-list seeded with the development fixtures.
    pub fn development_fixture() -> Self {
        let mut registry = Self::new();
        registry.insert("emergency-api-key-123");
        registry.insert("emergency-api-key-456");
        registry.insert("emergency-api-key-789");
        registry
    }
}

impl ApiKeyRegistry for InMemoryApiKeyRegistry {
    fn contains(&self, api_key: &str) -> bool {
        self.keys.contains(api_key)
    }
}
