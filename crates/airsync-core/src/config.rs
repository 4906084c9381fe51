// ── Runtime engine configuration ──
//
// Tuning knobs for vendor calls and reconciliation fan-out. Never touches
// disk: the CLI resolves its config file and hands an `EngineSettings` in.

use std::time::Duration;

use airsync_api::{MerakiClient, TlsMode, TransportConfig};

/// Settings shared by every component of an [`Engine`](crate::Engine).
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Upper bound on a single vendor API call.
    pub vendor_timeout: Duration,
    /// How many networks a deploy/rename batch works on at once.
    pub concurrency: usize,
    /// Meraki Dashboard API base URL (overridable for testing).
    pub meraki_base_url: String,
    /// TLS verification for vendor endpoints.
    pub tls: TlsMode,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            vendor_timeout: Duration::from_secs(30),
            concurrency: 4,
            meraki_base_url: MerakiClient::DEFAULT_BASE_URL.into(),
            tls: TlsMode::System,
        }
    }
}

impl EngineSettings {
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.vendor_timeout,
        }
    }

    /// Fan-out used by the reconciler; never zero.
    pub(crate) fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}
