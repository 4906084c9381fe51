// ── Core error types ──
//
// User-facing errors from airsync-core. Vendor failures are reduced to a
// category decided by HTTP status (never by message text) so callers can
// tell "unauthorized" from "rate limited" without string matching.

use std::time::Duration;

use serde::Serialize;
use strum::Display;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Credentials ──────────────────────────────────────────────────
    /// Encryption/decryption failure, or credentials rejected by the vendor.
    #[error("Credential error: {message}")]
    Credential { message: String },

    // ── Vendor ───────────────────────────────────────────────────────
    #[error(transparent)]
    Vendor(#[from] VendorError),

    #[error("Vendor '{vendor}' is not available")]
    VendorUnavailable { vendor: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} already exists: {identifier}")]
    Conflict {
        entity_type: String,
        identifier: String,
    },

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Cannot {action} while in step '{step}'")]
    InvalidTransition { action: String, step: String },

    // ── Storage ──────────────────────────────────────────────────────
    #[error("Storage error: {message}")]
    Storage { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn not_found(entity_type: &str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    pub(crate) fn credential(message: impl Into<String>) -> Self {
        Self::Credential {
            message: message.into(),
        }
    }

    /// The vendor error category, if this error came from a vendor call.
    pub fn vendor_category(&self) -> Option<VendorErrorCategory> {
        match self {
            Self::Vendor(e) => Some(e.category),
            _ => None,
        }
    }
}

// ── Vendor errors ────────────────────────────────────────────────────

/// Coarse classification of a failed vendor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum VendorErrorCategory {
    Unauthorized,
    NotFound,
    RateLimited,
    Server,
    Timeout,
    Transport,
    InvalidResponse,
    Other,
}

impl VendorErrorCategory {
    /// Classify an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            500..=599 => Self::Server,
            _ => Self::Other,
        }
    }
}

/// A non-success response (or no response at all) from a vendor API.
#[derive(Debug, Clone, Error)]
#[error("Vendor API error ({category}): {message}")]
pub struct VendorError {
    pub category: VendorErrorCategory,
    /// HTTP status, when the vendor answered.
    pub status: Option<u16>,
    pub message: String,
}

impl VendorError {
    pub fn timeout(after: Duration) -> Self {
        Self {
            category: VendorErrorCategory::Timeout,
            status: None,
            message: format!("timeout after {}ms", after.as_millis()),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<airsync_api::Error> for VendorError {
    fn from(err: airsync_api::Error) -> Self {
        use airsync_api::Error as ApiError;

        let status = err.status();
        let category = match &err {
            ApiError::Api { status, .. } => VendorErrorCategory::from_status(*status),
            ApiError::RateLimited { .. } => VendorErrorCategory::RateLimited,
            ApiError::Timeout { .. } => VendorErrorCategory::Timeout,
            ApiError::Transport(e) if e.is_timeout() => VendorErrorCategory::Timeout,
            ApiError::Transport(e) => e
                .status()
                .map_or(VendorErrorCategory::Transport, |s| {
                    VendorErrorCategory::from_status(s.as_u16())
                }),
            ApiError::InvalidUrl(_) | ApiError::Tls(_) | ApiError::InvalidCredential { .. } => {
                VendorErrorCategory::Transport
            }
            ApiError::Deserialization { .. } => VendorErrorCategory::InvalidResponse,
        };
        let message = match err {
            ApiError::Api { message, .. } => message,
            ApiError::Timeout { timeout } => return Self::timeout(timeout),
            other => other.to_string(),
        };

        Self {
            category,
            status,
            message,
        }
    }
}

impl From<airsync_api::Error> for CoreError {
    fn from(err: airsync_api::Error) -> Self {
        match err {
            airsync_api::Error::InvalidCredential { message } => CoreError::Credential { message },
            other => CoreError::Vendor(other.into()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Storage {
            message: format!("malformed stored document: {err}"),
        }
    }
}
