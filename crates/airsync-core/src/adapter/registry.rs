use std::collections::HashMap;
use std::sync::Arc;

use super::{MerakiAdapter, VendorAdapter};
use crate::config::EngineSettings;
use crate::error::CoreError;
use crate::model::Vendor;

/// Vendor id → adapter. Resolved once per integration lookup.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<Vendor, Arc<dyn VendorAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every adapter that ships in this crate.
    pub fn with_defaults(settings: &EngineSettings) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MerakiAdapter::new(
            settings.meraki_base_url.clone(),
            settings.transport(),
        )));
        registry
    }

    /// Register (or replace) the adapter for its vendor.
    pub fn register(&mut self, adapter: Arc<dyn VendorAdapter>) {
        self.adapters.insert(adapter.vendor(), adapter);
    }

    pub fn resolve(&self, vendor: Vendor) -> Result<Arc<dyn VendorAdapter>, CoreError> {
        self.adapters
            .get(&vendor)
            .cloned()
            .ok_or_else(|| CoreError::VendorUnavailable {
                vendor: vendor.to_string(),
            })
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("vendors", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}
