// airsync-api: Async Rust client for wireless controller vendor APIs

pub mod error;
pub mod meraki;
pub mod transport;

pub use error::Error;
pub use meraki::MerakiClient;
pub use transport::{TlsMode, TransportConfig};
