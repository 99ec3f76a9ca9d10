use std::sync::Arc;

use dashmap::DashMap;

use crate::engine::{Engine, EngineError};
use crate::limits::*;

/// Manages per-tenant engines. Each tenant gets its own independent Engine,
/// so occupancy at one tenant's locations never leaks into another's.
pub struct TenantManager {
    engines: DashMap<String, Arc<Engine>>,
}

impl Default for TenantManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TenantManager {
    pub fn new() -> Self {
        Self {
            engines: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn get(&self, tenant: &str) -> Option<Arc<Engine>> {
        self.engines.get(tenant).map(|e| e.value().clone())
    }

    /// Get or lazily create an engine for the given tenant.
    pub fn get_or_create(&self, tenant: &str) -> Result<Arc<Engine>, EngineError> {
        if let Some(engine) = self.get(tenant) {
            return Ok(engine);
        }
        if tenant.len() > MAX_TENANT_NAME_LEN {
            return Err(EngineError::LimitExceeded("tenant name too long"));
        }
        if !tenant
            .chars()
            .any(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(EngineError::InvalidTenant(tenant.to_string()));
        }
        if self.engines.len() >= MAX_TENANTS {
            return Err(EngineError::LimitExceeded("too many tenants"));
        }

        let engine = self
            .engines
            .entry(tenant.to_string())
            .or_insert_with(|| Arc::new(Engine::new()))
            .value()
            .clone();
        metrics::gauge!(crate::observability::TENANTS_ACTIVE).set(self.engines.len() as f64);
        tracing::info!(tenant, "engine created");
        Ok(engine)
    }
}
