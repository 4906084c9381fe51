// ── Domain model ──
//
// Persisted entities (Integration, Network) plus the read-only vendor
// projections returned by adapters. Vendor projections are never the
// source of truth for local decisions; the persisted records are.

pub mod credentials;
pub mod integration;
pub mod network;
pub mod ssid_mapping;
pub mod vendor;

pub use credentials::{Credentials, EncryptedCredentials};
pub use integration::Integration;
pub use network::{Network, NewNetwork, ProvisioningStatus, VendorSnapshot};
pub use ssid_mapping::{NetworkRole, SsidBinding, SsidMapping};
pub use vendor::{Organization, Ssid, Vendor, VendorInfo, VendorNetwork};
