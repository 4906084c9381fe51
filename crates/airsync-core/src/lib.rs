// airsync-core: Vendor integrations, SSID mapping and reconciliation.

pub mod adapter;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod integrations;
pub mod model;
pub mod provisioning;
pub mod reconciler;
pub mod store;
pub mod vault;

// ── Primary re-exports ──────────────────────────────────────────────
pub use adapter::{AdapterRegistry, AuthMode, SplashPage, SsidPatch, VendorAdapter};
pub use config::EngineSettings;
pub use discovery::{Discovery, SsidMismatch};
pub use engine::Engine;
pub use error::{CoreError, VendorError, VendorErrorCategory};
pub use integrations::Integrations;
pub use provisioning::{
    FlowStep, ProvisionOutcome, ProvisionRequest, Provisioner, ProvisioningFlow,
    ResourceSelection,
};
pub use reconciler::{GuestWifiStatus, NetworkFailure, ReconcileReport, Reconciler};
pub use store::Store;
pub use vault::CredentialVault;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Credentials, EncryptedCredentials, Integration, Network, NetworkRole, NewNetwork,
    Organization, ProvisioningStatus, Ssid, SsidBinding, SsidMapping, Vendor, VendorInfo,
    VendorNetwork, VendorSnapshot,
};
