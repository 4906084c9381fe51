//! Deploy / rename / guest-status handlers.
//!
//! Both batch commands print the updated count and every failure, then
//! exit non-zero when anything failed.

use tabled::{Table, Tabled, settings::Style};
use uuid::Uuid;

use airsync_core::{GuestWifiStatus, NetworkFailure, ReconcileReport};

use crate::cli::{DeployArgs, GlobalOpts, OutputFormat, RenameArgs};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

// ── Report rendering ────────────────────────────────────────────────

#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "Network")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Error")]
    error: String,
}

impl From<&NetworkFailure> for FailureRow {
    fn from(f: &NetworkFailure) -> Self {
        Self {
            name: f.network_name.clone(),
            id: f.network_id.to_string(),
            category: f.category.map(|c| c.to_string()).unwrap_or_default(),
            error: f.error.clone(),
        }
    }
}

fn report_detail(verb: &str, report: &ReconcileReport) -> String {
    let mut out = format!("{verb} {} network(s)", report.updated);
    if report.skipped > 0 {
        out.push_str(&format!(", skipped {} without a guest SSID", report.skipped));
    }
    if !report.errors.is_empty() {
        let rows: Vec<FailureRow> = report.errors.iter().map(FailureRow::from).collect();
        out.push_str(&format!(
            "\n{} failure(s):\n{}",
            report.errors.len(),
            Table::new(rows).with(Style::rounded())
        ));
    }
    out
}

fn finish(
    operation: &str,
    verb: &str,
    report: &ReconcileReport,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = output::render_single(
        &global.output,
        report,
        |r| report_detail(verb, r),
        |r| r.updated.to_string(),
    );
    output::print_output(&out, global.quiet);

    // Plain output carries only the count; failures go to stderr.
    if matches!(global.output, OutputFormat::Plain) {
        for f in &report.errors {
            eprintln!("{}\t{}\t{}", f.network_id, f.network_name, f.error);
        }
    }

    if report.errors.is_empty() {
        Ok(())
    } else {
        Err(CliError::ReconcileFailed {
            operation: operation.into(),
            failed: report.errors.len(),
            updated: report.updated,
        })
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn deploy(ctx: &Context, args: DeployArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ids: Vec<Uuid> = if args.all {
        ctx.engine
            .store()
            .list_networks(ctx.workspace)?
            .into_iter()
            .map(|n| n.id)
            .collect()
    } else {
        args.networks
            .iter()
            .map(|raw| util::parse_uuid("network", raw))
            .collect::<Result<_, _>>()?
    };

    let report = ctx.engine.reconciler().deploy(ctx.workspace, &ids).await?;
    finish("deploy", "Deployed guest WiFi to", &report, global)
}

pub async fn rename(ctx: &Context, args: RenameArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let report = ctx
        .engine
        .reconciler()
        .rename(ctx.workspace, &args.name)
        .await?;
    finish("rename", "Renamed guest SSID on", &report, global)
}

pub fn guest_status(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let status = ctx.engine.reconciler().guest_wifi_status(ctx.workspace)?;
    let out = output::render_single(
        &global.output,
        &status,
        |s: &GuestWifiStatus| {
            format!(
                "Networks:          {}\nGuest SSID mapped: {}\nGuest SSID on:     {}",
                s.networks, s.mapped, s.enabled
            )
        },
        |s| s.enabled.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
