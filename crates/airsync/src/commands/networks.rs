//! Managed network command handlers (local state only).

use tabled::Tabled;

use airsync_core::Network;

use crate::cli::{GlobalOpts, NetworksArgs, NetworksCommand};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Vendor ID")]
    external_id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Guest SSID")]
    guest: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl NetworkRow {
    fn new(n: &Network, color: bool) -> Self {
        let guest = n.ssid_mapping.guest_wifi().map_or_else(
            || "-".to_owned(),
            |b| {
                format!(
                    "#{} {} ({})",
                    b.ssid_number,
                    b.ssid_name,
                    if b.enabled { "on" } else { "off" }
                )
            },
        );
        Self {
            id: n.id.to_string(),
            name: n.name.clone(),
            external_id: n.external_id.clone(),
            status: output::paint_status(&n.status.to_string(), color),
            guest,
            tags: n.tags.join(", "),
        }
    }
}

fn detail(n: &Network) -> String {
    let mut lines = vec![
        format!("ID:           {}", n.id),
        format!("Name:         {}", n.name),
        format!("Vendor ID:    {}", n.external_id),
        format!("Integration:  {}", n.integration_id),
        format!("Status:       {}", n.status),
        format!("Tags:         {}", n.tags.join(", ")),
        format!(
            "Organization: {}",
            n.vendor_snapshot.organization_id.as_deref().unwrap_or("-")
        ),
        format!("Updated:      {}", n.updated_at.to_rfc3339()),
        "SSID mapping:".to_owned(),
    ];
    if n.ssid_mapping.is_empty() {
        lines.push("  (none)".into());
    }
    for (role, b) in n.ssid_mapping.iter() {
        lines.push(format!(
            "  {role}: #{} {} [{}]",
            b.ssid_number,
            b.ssid_name,
            if b.enabled { "enabled" } else { "disabled" }
        ));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(ctx: &Context, args: NetworksArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = ctx.engine.store();

    match args.command {
        NetworksCommand::List { integration } => {
            let networks = match integration {
                Some(raw) => {
                    let id = util::parse_uuid("integration", &raw)?;
                    store.list_networks_by_integration(ctx.workspace, id)?
                }
                None => store.list_networks(ctx.workspace)?,
            };
            let out = output::render_list(
                &global.output,
                &networks,
                |n| NetworkRow::new(n, ctx.color),
                |n| n.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NetworksCommand::Get { id } => {
            let id = util::parse_uuid("network", &id)?;
            let network = store
                .get_network(ctx.workspace, id)?
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "network".into(),
                    identifier: id.to_string(),
                    list_command: "networks list".into(),
                })?;
            let out = output::render_single(&global.output, &network, detail, |n| {
                n.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
