// Meraki Dashboard API v1.
//
// Base path: /api/v1/
// Auth: `Authorization: Bearer <api key | oauth access token>`

mod client;
pub mod types;

pub use client::MerakiClient;
