//! Configuration for the airsync CLI.
//!
//! TOML config file, `AIRSYNC_*` environment overrides, vault key
//! resolution (env + keyring + plaintext), and translation to
//! `airsync_core::EngineSettings`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use airsync_api::TlsMode;
use airsync_core::{CredentialVault, EngineSettings};

/// Keyring service and entry holding the base64 vault key.
pub const KEYRING_SERVICE: &str = "airsync";
pub const KEYRING_ENTRY: &str = "vault-key";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no vault key configured (checked ${env_var}, the OS keyring and `vault_key`)")]
    NoVaultKey { env_var: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// SQLite database file. Defaults to the platform data dir.
    pub database: Option<PathBuf>,

    /// Workspace used when `--workspace` is not given.
    pub default_workspace: Option<String>,

    /// Environment variable holding the base64 vault key.
    #[serde(default = "default_vault_key_env")]
    pub vault_key_env: String,

    /// Plaintext vault key (prefer the env var or keyring).
    pub vault_key: Option<String>,

    /// Per vendor call timeout, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Networks reconciled in parallel by deploy/rename.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// PEM CA certificate for vendor endpoints behind a TLS proxy.
    pub ca_cert: Option<PathBuf>,

    #[serde(default)]
    pub vendors: Vendors,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            default_workspace: None,
            vault_key_env: default_vault_key_env(),
            vault_key: None,
            timeout: default_timeout(),
            concurrency: default_concurrency(),
            ca_cert: None,
            vendors: Vendors::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Vendors {
    #[serde(default)]
    pub meraki: MerakiSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MerakiSettings {
    #[serde(default = "default_meraki_base_url")]
    pub base_url: String,
}

impl Default for MerakiSettings {
    fn default() -> Self {
        Self {
            base_url: default_meraki_base_url(),
        }
    }
}

fn default_vault_key_env() -> String {
    "AIRSYNC_VAULT_KEY".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_concurrency() -> usize {
    4
}
fn default_meraki_base_url() -> String {
    airsync_api::MerakiClient::DEFAULT_BASE_URL.into()
}

impl Config {
    /// The database path, falling back to the platform data dir.
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(default_database_path)
    }

    pub fn default_workspace_id(&self) -> Result<Option<Uuid>, ConfigError> {
        self.default_workspace
            .as_deref()
            .map(|raw| {
                Uuid::parse_str(raw.trim())
                    .map_err(|e| invalid("default_workspace", format!("{raw}: {e}")))
            })
            .transpose()
    }

    /// Validate and translate into engine settings.
    pub fn engine_settings(&self) -> Result<EngineSettings, ConfigError> {
        if self.timeout == 0 {
            return Err(invalid("timeout", "must be at least 1 second"));
        }
        if self.concurrency == 0 {
            return Err(invalid("concurrency", "must be at least 1"));
        }
        let base_url = &self.vendors.meraki.base_url;
        url::Url::parse(base_url)
            .map_err(|e| invalid("vendors.meraki.base_url", format!("{base_url}: {e}")))?;

        Ok(EngineSettings {
            vendor_timeout: Duration::from_secs(self.timeout),
            concurrency: self.concurrency,
            meraki_base_url: base_url.clone(),
            tls: self
                .ca_cert
                .clone()
                .map_or(TlsMode::System, TlsMode::CustomCa),
        })
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "airsync", "airsync")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "airsync", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

pub fn default_database_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "airsync", "airsync.db"]),
        |dirs| dirs.data_dir().join("airsync.db"),
    )
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load config from the canonical path plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` (missing file is fine) plus `AIRSYNC_*` env.
///
/// Nested keys use a double underscore:
/// `AIRSYNC_VENDORS__MERAKI__BASE_URL`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed("AIRSYNC_")
                .ignore(&["workspace", "config"])
                .split("__"),
        )
        .extract()?;
    Ok(config)
}

/// Write `cfg` as TOML to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

// ── Vault key resolution ────────────────────────────────────────────

/// Resolve the vault key: env var → OS keyring → plaintext config.
pub fn resolve_vault(cfg: &Config) -> Result<CredentialVault, ConfigError> {
    let from_env = std::env::var(&cfg.vault_key_env).ok();
    let from_keyring = || {
        keyring::Entry::new(KEYRING_SERVICE, KEYRING_ENTRY)
            .and_then(|entry| entry.get_password())
            .ok()
    };
    resolve_vault_from(cfg, from_env, from_keyring)
}

fn resolve_vault_from(
    cfg: &Config,
    from_env: Option<String>,
    from_keyring: impl FnOnce() -> Option<String>,
) -> Result<CredentialVault, ConfigError> {
    let key = from_env
        .filter(|k| !k.trim().is_empty())
        .or_else(from_keyring)
        .or_else(|| cfg.vault_key.clone())
        .ok_or_else(|| ConfigError::NoVaultKey {
            env_var: cfg.vault_key_env.clone(),
        })?;

    CredentialVault::from_base64(&key).map_err(|e| invalid("vault key", e.to_string()))
}

/// Store a base64 vault key in the OS keyring.
pub fn store_vault_key(key: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, KEYRING_ENTRY)?.set_password(key)?;
    Ok(())
}
