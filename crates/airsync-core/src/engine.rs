// ── Engine facade ──
//
// Owns the store, the credential vault and the adapter registry, and hands
// out the services that work on them. Nothing here is global: tests build
// as many engines as they like, each with its own database and key.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::adapter::{AdapterRegistry, VendorAdapter};
use crate::config::EngineSettings;
use crate::discovery::Discovery;
use crate::error::CoreError;
use crate::integrations::Integrations;
use crate::model::{Credentials, Integration};
use crate::provisioning::Provisioner;
use crate::reconciler::Reconciler;
use crate::store::Store;
use crate::vault::CredentialVault;

// ── Engine ───────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<EngineInner>`.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    store: Store,
    vault: CredentialVault,
    registry: AdapterRegistry,
    settings: EngineSettings,
    locks: NetworkLocks,
}

impl Engine {
    /// Engine with every built-in vendor adapter registered.
    pub fn new(store: Store, vault: CredentialVault, settings: EngineSettings) -> Self {
        let registry = AdapterRegistry::with_defaults(&settings);
        Self::with_registry(store, vault, registry, settings)
    }

    /// Engine with a caller-supplied adapter set.
    pub fn with_registry(
        store: Store,
        vault: CredentialVault,
        registry: AdapterRegistry,
        settings: EngineSettings,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                store,
                vault,
                registry,
                settings,
                locks: NetworkLocks::default(),
            }),
        }
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn vault(&self) -> &CredentialVault {
        &self.inner.vault
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.inner.registry
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.inner.settings
    }

    // ── Services ─────────────────────────────────────────────────────

    pub fn integrations(&self) -> Integrations<'_> {
        Integrations::new(self)
    }

    pub fn discovery(&self) -> Discovery<'_> {
        Discovery::new(self)
    }

    pub fn provisioner(&self) -> Provisioner<'_> {
        Provisioner::new(self)
    }

    pub fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(self)
    }

    // ── Internals shared by services ─────────────────────────────────

    /// Load an integration, scoped to its workspace.
    pub(crate) fn integration(
        &self,
        workspace_id: Uuid,
        integration_id: Uuid,
    ) -> Result<Integration, CoreError> {
        self.store()
            .get_integration(workspace_id, integration_id)?
            .ok_or_else(|| CoreError::not_found("Integration", integration_id))
    }

    /// Resolve the adapter and decrypt credentials for one unit of work.
    pub(crate) fn open_session(&self, integration: &Integration) -> Result<VendorSession, CoreError> {
        let adapter = self.registry().resolve(integration.vendor)?;
        let credentials = self.vault().open(&integration.credentials)?;
        Ok(VendorSession {
            adapter,
            credentials,
        })
    }

    /// Serialise work on one network within this engine.
    pub(crate) async fn lock_network(&self, network_id: Uuid) -> NetworkGuard {
        self.inner.locks.acquire(network_id).await
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.inner.registry)
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

// ── VendorSession ────────────────────────────────────────────────────

/// An adapter paired with decrypted credentials. Plaintext is zeroized
/// when the session is dropped, so keep it scoped to a single operation.
pub(crate) struct VendorSession {
    pub adapter: Arc<dyn VendorAdapter>,
    pub credentials: Credentials,
}

// ── NetworkLocks ─────────────────────────────────────────────────────

/// Per-network async locks. An entry lives only while someone holds or
/// waits on it, so the map stays as small as the in-flight work.
#[derive(Default)]
struct NetworkLocks {
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl NetworkLocks {
    async fn acquire(&self, network_id: Uuid) -> NetworkGuard {
        // Clone the Arc out so the DashMap shard guard is released before awaiting.
        let lock = Arc::clone(self.locks.entry(network_id).or_default().value());
        let guard = lock.lock_owned().await;
        NetworkGuard {
            guard: Some(guard),
            network_id,
            locks: Arc::clone(&self.locks),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Held for the duration of one network's reconciliation.
pub(crate) struct NetworkGuard {
    guard: Option<OwnedMutexGuard<()>>,
    network_id: Uuid,
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl Drop for NetworkGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own reference left: nobody is waiting.
        self.locks
            .remove_if(&self.network_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
