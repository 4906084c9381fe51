//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use airsync_config::ConfigError;
use airsync_core::{CoreError, VendorErrorCategory};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    /// Some networks were updated, some failed.
    pub const PARTIAL: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Credentials ──────────────────────────────────────────────────
    #[error("Credential error: {message}")]
    #[diagnostic(
        code(airsync::credentials),
        help(
            "Check the API key or OAuth token for this integration.\n\
             Meraki keys are created under Organization > API & Webhooks."
        )
    )]
    Credential { message: String },

    #[error("No vault key configured")]
    #[diagnostic(
        code(airsync::no_vault_key),
        help(
            "Set ${env_var}, or create one with: airsync config gen-key --store\n\
             The same key must be used for every run against the same database."
        )
    )]
    NoVaultKey { env_var: String },

    // ── Vendor ───────────────────────────────────────────────────────
    #[error("Vendor API error ({category}): {message}")]
    #[diagnostic(code(airsync::vendor))]
    Vendor {
        category: VendorErrorCategory,
        message: String,
    },

    #[error("Vendor '{vendor}' is not available")]
    #[diagnostic(
        code(airsync::vendor_unavailable),
        help("Run: airsync vendors to see which vendors can be selected")
    )]
    VendorUnavailable { vendor: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(airsync::not_found),
        help("Run: airsync {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{resource_type} '{identifier}' already exists")]
    #[diagnostic(code(airsync::conflict))]
    Conflict {
        resource_type: String,
        identifier: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(airsync::validation))]
    Validation { field: String, reason: String },

    #[error("No workspace selected")]
    #[diagnostic(
        code(airsync::no_workspace),
        help("Pass --workspace <UUID>, set AIRSYNC_WORKSPACE, or set default_workspace in the config.")
    )]
    NoWorkspace,

    #[error("Cannot {action} while in step '{step}'")]
    #[diagnostic(code(airsync::flow))]
    InvalidTransition { action: String, step: String },

    // ── Reconciliation ───────────────────────────────────────────────
    #[error("{operation}: {failed} network(s) failed, {updated} updated")]
    #[diagnostic(
        code(airsync::reconcile_failed),
        help("Failed networks were left unchanged locally; re-run the command to retry them.")
    )]
    ReconcileFailed {
        operation: String,
        failed: usize,
        updated: usize,
    },

    // ── Configuration / storage ──────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(airsync::config),
        help("Run: airsync config show to inspect the effective configuration")
    )]
    Config { message: String },

    #[error("Storage error: {message}")]
    #[diagnostic(
        code(airsync::storage),
        help("Check the database path (--database or `database` in the config).")
    )]
    Storage { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(airsync::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal / IO ────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(airsync::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Credential { .. } | Self::NoVaultKey { .. } => exit_code::AUTH,
            Self::Vendor { category, .. } => match category {
                VendorErrorCategory::Unauthorized => exit_code::AUTH,
                VendorErrorCategory::NotFound => exit_code::NOT_FOUND,
                VendorErrorCategory::Timeout => exit_code::TIMEOUT,
                VendorErrorCategory::Transport => exit_code::CONNECTION,
                _ => exit_code::GENERAL,
            },
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::VendorUnavailable { .. }
            | Self::Validation { .. }
            | Self::NoWorkspace
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::ReconcileFailed { updated, .. } if *updated > 0 => exit_code::PARTIAL,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Credential { message } => CliError::Credential { message },

            CoreError::Vendor(e) => CliError::Vendor {
                category: e.category,
                message: e.message,
            },

            CoreError::VendorUnavailable { vendor } => CliError::VendorUnavailable { vendor },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{}s list", entity_type.to_lowercase()),
                resource_type: entity_type.to_lowercase(),
                identifier,
            },

            CoreError::Conflict {
                entity_type,
                identifier,
            } => CliError::Conflict {
                resource_type: entity_type.to_lowercase(),
                identifier,
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::InvalidTransition { action, step } => {
                CliError::InvalidTransition { action, step }
            }

            CoreError::Storage { message } => CliError::Storage { message },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoVaultKey { env_var } => CliError::NoVaultKey { env_var },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
