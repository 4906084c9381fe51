//! Integration command handlers.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tabled::Tabled;

use airsync_core::{Credentials, Integration, Vendor};

use crate::cli::{CreateIntegrationArgs, GlobalOpts, IntegrationsArgs, IntegrationsCommand};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct IntegrationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Integration> for IntegrationRow {
    fn from(i: &Integration) -> Self {
        Self {
            id: i.id.to_string(),
            name: i.name.clone(),
            vendor: i.vendor.to_string(),
            created: i.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn detail(i: &Integration) -> String {
    format!(
        "ID:      {}\nName:    {}\nVendor:  {}\nCreated: {}",
        i.id,
        i.name,
        i.vendor.display_name(),
        i.created_at.to_rfc3339()
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    ctx: &Context,
    args: IntegrationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let integrations = ctx.engine.integrations();

    match args.command {
        IntegrationsCommand::Create(create) => {
            let vendor = parse_vendor(&create.vendor)?;
            let name = create.name.clone();
            let credentials = credentials_from_args(create)?;

            let integration = integrations
                .create(ctx.workspace, vendor, &name, credentials)
                .await?;
            let out = output::render_single(&global.output, &integration, detail, |i| {
                i.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        IntegrationsCommand::List => {
            let all = integrations.list(ctx.workspace)?;
            let out = output::render_list(
                &global.output,
                &all,
                |i| IntegrationRow::from(i),
                |i| i.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        IntegrationsCommand::Delete { id } => {
            let id = util::parse_uuid("integration", &id)?;
            let integration = integrations.get(ctx.workspace, id)?;
            if !util::confirm(
                "integrations delete",
                &format!(
                    "Delete integration '{}' and every network imported through it?",
                    integration.name
                ),
                global.yes,
            )? {
                return Ok(());
            }

            let removed = integrations.delete(ctx.workspace, id)?;
            util::notice(
                global,
                format!(
                    "Integration '{}' deleted ({removed} network(s) removed)",
                    integration.name
                ),
            );
            Ok(())
        }
    }
}

// ── Argument parsing ────────────────────────────────────────────────

pub(crate) fn parse_vendor(raw: &str) -> Result<Vendor, CliError> {
    Vendor::from_str(raw.trim()).map_err(|_| CliError::Validation {
        field: "vendor".into(),
        reason: format!("unknown vendor '{raw}' (run: airsync vendors)"),
    })
}

fn credentials_from_args(args: CreateIntegrationArgs) -> Result<Credentials, CliError> {
    let token_expires_at = args
        .expires_at
        .as_deref()
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| CliError::Validation {
                    field: "expires-at".into(),
                    reason: format!("'{raw}' is not an RFC 3339 timestamp ({e})"),
                })
        })
        .transpose()?;

    let secret = |value: Option<String>| {
        value
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::from)
    };

    Ok(Credentials {
        api_key: secret(args.api_key),
        client_id: secret(args.client_id),
        client_secret: secret(args.client_secret),
        access_token: secret(args.access_token),
        refresh_token: secret(args.refresh_token),
        token_expires_at,
    })
}
