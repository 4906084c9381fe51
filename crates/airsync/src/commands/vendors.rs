//! Vendor catalog.

use tabled::Tabled;

use airsync_core::{Vendor, VendorInfo};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct VendorRow {
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Available")]
    available: String,
}

#[allow(clippy::unnecessary_wraps)]
pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let catalog = Vendor::catalog();
    let out = output::render_list(
        &global.output,
        &catalog,
        |v: &VendorInfo| VendorRow {
            vendor: v.vendor.to_string(),
            name: v.display_name,
            available: output::paint_bool(v.available, color),
        },
        |v| v.vendor.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
