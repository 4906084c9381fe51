//! Command dispatch: CLI args -> engine services -> output formatting.

pub mod config_cmd;
pub mod discover;
pub mod integrations;
pub mod networks;
pub mod provision;
pub mod reconcile;
pub mod util;
pub mod vendors;

use std::time::Duration;

use uuid::Uuid;

use airsync_core::{Engine, Store};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Everything a workspace-bound command needs.
pub struct Context {
    pub engine: Engine,
    pub workspace: Uuid,
    pub color: bool,
}

impl Context {
    /// Load config, resolve workspace and vault key, open the database.
    pub fn build(global: &GlobalOpts) -> Result<Self, CliError> {
        let cfg = util::load_config(global)?;
        let workspace = util::resolve_workspace(global, &cfg)?;

        let mut settings = cfg.engine_settings()?;
        if let Some(secs) = global.timeout {
            if secs == 0 {
                return Err(CliError::Validation {
                    field: "timeout".into(),
                    reason: "must be at least 1 second".into(),
                });
            }
            settings.vendor_timeout = Duration::from_secs(secs);
        }

        let vault = airsync_config::resolve_vault(&cfg)?;
        let path = global
            .database
            .clone()
            .unwrap_or_else(|| cfg.database_path());
        tracing::debug!(database = %path.display(), "opening store");
        let store = Store::open(&path)?;

        Ok(Self {
            engine: Engine::new(store, vault, settings),
            workspace,
            color: output::should_color(&global.color),
        })
    }
}

/// Dispatch a workspace-bound command to its handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Integrations(args) => integrations::handle(ctx, args, global).await,
        Command::Discover(args) => discover::handle(ctx, args, global).await,
        Command::Provision(args) => provision::handle(ctx, args, global).await,
        Command::Networks(args) => networks::handle(ctx, args, global),
        Command::Deploy(args) => reconcile::deploy(ctx, args, global).await,
        Command::Rename(args) => reconcile::rename(ctx, args, global).await,
        Command::GuestStatus => reconcile::guest_status(ctx, global),
        // Handled before dispatch
        Command::Vendors | Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
