//! Discovery command handlers: read-only views of the vendor side.

use serde::Serialize;
use tabled::Tabled;

use airsync_core::{Organization, Ssid, VendorNetwork};

use crate::cli::{DiscoverArgs, DiscoverCommand, GlobalOpts, IntegrationRef};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct OrgRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

#[derive(Tabled)]
pub(crate) struct VendorNetworkRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Products")]
    products: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Time zone")]
    time_zone: String,
}

impl From<&VendorNetwork> for VendorNetworkRow {
    fn from(n: &VendorNetwork) -> Self {
        Self {
            id: n.id.clone(),
            name: n.name.clone(),
            products: n.product_types.join(", "),
            tags: n.tags.join(", "),
            time_zone: n.time_zone.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "Tag")]
    tag: String,
}

#[derive(Tabled)]
pub(crate) struct SsidRow {
    #[tabled(rename = "#")]
    number: u8,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Auth")]
    auth_mode: String,
    #[tabled(rename = "Splash")]
    splash_page: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
}

impl SsidRow {
    pub(crate) fn new(s: &Ssid, color: bool) -> Self {
        Self {
            number: s.number,
            name: s.name.clone(),
            enabled: output::paint_bool(s.enabled, color),
            auth_mode: s.auth_mode.clone().unwrap_or_default(),
            splash_page: s.splash_page.clone().unwrap_or_default(),
            vlan: s.vlan_id.map(|v| v.to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeviceCount {
    network_id: String,
    devices: usize,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: DiscoverArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let discovery = ctx.engine.discovery();
    let ws = ctx.workspace;

    let out = match args.command {
        DiscoverCommand::Orgs { target } => {
            let orgs = discovery.organizations(ws, integration_id(&target)?).await?;
            output::render_list(
                &global.output,
                &orgs,
                |o: &Organization| OrgRow {
                    id: o.id.clone(),
                    name: o.name.clone(),
                },
                |o| o.id.clone(),
            )
        }

        DiscoverCommand::Networks { target, org } => {
            let networks = discovery
                .networks(ws, integration_id(&target)?, &org)
                .await?;
            output::render_list(
                &global.output,
                &networks,
                |n| VendorNetworkRow::from(n),
                |n| n.id.clone(),
            )
        }

        DiscoverCommand::Tags { target, org } => {
            let tags = discovery
                .device_tags(ws, integration_id(&target)?, &org)
                .await?;
            output::render_list(
                &global.output,
                &tags,
                |t| TagRow { tag: t.clone() },
                Clone::clone,
            )
        }

        DiscoverCommand::Ssids { target, network } => {
            let ssids = discovery
                .ssids(ws, integration_id(&target)?, &network)
                .await?;
            output::render_list(
                &global.output,
                &ssids,
                |s| SsidRow::new(s, ctx.color),
                |s| format!("{}\t{}", s.number, s.name),
            )
        }

        DiscoverCommand::Devices { target, network } => {
            let devices = discovery
                .device_count(ws, integration_id(&target)?, &network)
                .await?;
            let count = DeviceCount {
                network_id: network,
                devices,
            };
            output::render_single(
                &global.output,
                &count,
                |c| format!("{} device(s) on {}", c.devices, c.network_id),
                |c| c.devices.to_string(),
            )
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}

fn integration_id(target: &IntegrationRef) -> Result<uuid::Uuid, CliError> {
    util::parse_uuid("integration", &target.integration)
}
