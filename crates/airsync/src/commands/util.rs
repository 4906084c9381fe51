//! Shared helpers for command handlers.

use std::io::IsTerminal;

use uuid::Uuid;

use airsync_config::Config;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load config from `--config` (or the canonical path) plus `AIRSYNC_*` env.
pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let cfg = match &global.config {
        Some(path) => airsync_config::load_config_from(path)?,
        None => airsync_config::load_config()?,
    };
    Ok(cfg)
}

/// `--workspace` / `AIRSYNC_WORKSPACE`, then `default_workspace` from config.
pub fn resolve_workspace(global: &GlobalOpts, cfg: &Config) -> Result<Uuid, CliError> {
    if let Some(raw) = global.workspace.as_deref() {
        return parse_uuid("workspace", raw);
    }
    cfg.default_workspace_id()?.ok_or(CliError::NoWorkspace)
}

pub fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, CliError> {
    Uuid::parse_str(raw.trim()).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("'{raw}' is not a UUID ({e})"),
    })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Status line on stderr, suppressed by `--quiet`.
pub fn notice(global: &GlobalOpts, message: impl std::fmt::Display) {
    if !global.quiet {
        eprintln!("{message}");
    }
}
