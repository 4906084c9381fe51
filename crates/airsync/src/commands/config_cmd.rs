//! Config subcommand handlers. None of these touch the database.

use std::path::PathBuf;

use airsync_config::{self as config, Config};
use airsync_core::CredentialVault;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

fn target_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config::config_path)
}

/// Copy of `cfg` safe to print.
fn redacted(cfg: &Config) -> Config {
    let mut shown = cfg.clone();
    if shown.vault_key.is_some() {
        shown.vault_key = Some("****".into());
    }
    shown
}

fn to_toml(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init {
            generate_key,
            force,
        } => {
            let path = target_path(global);
            if path.exists() && !force {
                return Err(CliError::Conflict {
                    resource_type: "config file".into(),
                    identifier: path.display().to_string(),
                });
            }

            let mut cfg = Config::default();
            if let Some(raw) = global.workspace.as_deref() {
                cfg.default_workspace = Some(util::parse_uuid("workspace", raw)?.to_string());
            }
            if generate_key {
                let key = CredentialVault::generate_key_base64();
                match config::store_vault_key(&key) {
                    Ok(()) => util::notice(global, "Vault key stored in the OS keyring"),
                    Err(e) => {
                        util::notice(
                            global,
                            format!("Keyring unavailable ({e}); writing the vault key to the config file"),
                        );
                        cfg.vault_key = Some(key);
                    }
                }
            }

            config::save_config_to(&cfg, &path)?;
            util::notice(global, format!("Config written to {}", path.display()));
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(&util::load_config(global)?);
            let out = output::render_single(&global.output, &cfg, to_toml, |_| {
                target_path(global).display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&target_path(global).display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::GenKey { store } => {
            let key = CredentialVault::generate_key_base64();
            if store {
                config::store_vault_key(&key)?;
                util::notice(global, "Vault key stored in the OS keyring");
            } else {
                output::print_output(&key, global.quiet);
            }
            Ok(())
        }
    }
}
