//! `provision`: walk the provisioning flow non-interactively.
//!
//! The mapping is read from the first `--network` and applied to all of
//! them; `--check-consistency` reports networks whose SSID slots differ.

use owo_colors::OwoColorize;
use serde::Serialize;

use airsync_core::{
    NetworkRole, ProvisioningFlow, ResourceSelection, SsidMapping, SsidMismatch, VendorNetwork,
};

use crate::cli::{GlobalOpts, ProvisionArgs};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProvisionSummary {
    count: usize,
    organization_id: String,
    networks: Vec<String>,
    ssid_mapping: Option<SsidMapping>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ssid_mismatches: Vec<SsidMismatch>,
}

fn detail(s: &ProvisionSummary) -> String {
    let mut lines = vec![format!(
        "Provisioned {} network(s) from organization {}",
        s.count, s.organization_id
    )];
    match &s.ssid_mapping {
        Some(mapping) if !mapping.is_empty() => {
            for (role, binding) in mapping.iter() {
                lines.push(format!(
                    "  {role}: SSID {} ({})",
                    binding.ssid_number, binding.ssid_name
                ));
            }
        }
        _ => lines.push("  no SSID roles assigned".into()),
    }
    lines.join("\n")
}

pub async fn handle(ctx: &Context, args: ProvisionArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ws = ctx.workspace;
    let integration_id = util::parse_uuid("integration", &args.target.integration)?;
    let integration = ctx.engine.integrations().get(ws, integration_id)?;

    let mut flow = ProvisioningFlow::start(ws, integration.vendor)?;
    flow.use_existing_integration(&ctx.engine, integration_id)?;

    let available = ctx
        .engine
        .discovery()
        .networks(ws, integration_id, &args.org)
        .await?;
    let networks = pick_networks(&available, &args.networks)?;
    let network_ids: Vec<String> = networks.iter().map(|n| n.id.clone()).collect();
    flow.select_resources(ResourceSelection {
        organization_id: args.org.clone(),
        networks,
        tags: args.tags.clone(),
    })?;

    let assignments = role_assignments(&args);
    if assignments.is_empty() {
        flow.skip_mapping()?;
    } else {
        let candidates = flow.mapping_candidates(&ctx.engine).await?;
        flow.map_ssids(SsidMapping::from_assignments(&assignments, &candidates)?)?;
    }

    let ssid_mismatches = if args.check_consistency {
        let mismatches = ctx
            .engine
            .discovery()
            .check_ssid_consistency(ws, integration_id, &network_ids)
            .await?;
        for m in &mismatches {
            warn_mismatch(m, ctx.color);
        }
        mismatches
    } else {
        Vec::new()
    };

    let outcome = flow.provision(&ctx.engine)?;
    let summary = ProvisionSummary {
        count: outcome.count,
        organization_id: args.org,
        networks: network_ids,
        ssid_mapping: flow.mapping().cloned(),
        ssid_mismatches,
    };
    let out = output::render_single(&global.output, &summary, detail, |s| s.count.to_string());
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Resolve `--network` ids against the organization's wireless networks,
/// keeping the order they were given in.
fn pick_networks(
    available: &[VendorNetwork],
    wanted: &[String],
) -> Result<Vec<VendorNetwork>, CliError> {
    wanted
        .iter()
        .map(|id| {
            available
                .iter()
                .find(|n| n.id == *id)
                .cloned()
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "vendor network".into(),
                    identifier: id.clone(),
                    list_command: "discover networks".into(),
                })
        })
        .collect()
}

fn role_assignments(args: &ProvisionArgs) -> Vec<(NetworkRole, u8)> {
    [
        (NetworkRole::GuestWifi, args.guest_ssid),
        (NetworkRole::Iot, args.iot_ssid),
        (NetworkRole::Employees, args.employees_ssid),
    ]
    .into_iter()
    .filter_map(|(role, number)| number.map(|n| (role, n)))
    .collect()
}

fn warn_mismatch(m: &SsidMismatch, color: bool) {
    let numbers = m
        .differing_numbers
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let label = if color {
        "warning:".yellow().to_string()
    } else {
        "warning:".to_owned()
    };
    eprintln!(
        "{label} network {} differs from {} on SSID slot(s) {numbers}",
        m.network_id, m.reference_network_id
    );
}
