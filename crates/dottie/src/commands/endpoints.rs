//! `dottie endpoints`: list the catalog.

use serde::Serialize;
use tabled::Tabled;

use dottie_api::{EndpointDescriptor, ServiceFamily};
use dottie_core::catalog;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Serialize, Tabled)]
struct EndpointRow {
    #[tabled(rename = "ID")]
    id: &'static str,
    #[tabled(rename = "Service")]
    service: &'static str,
    #[tabled(rename = "Params")]
    params: String,
    #[tabled(rename = "Path")]
    template: &'static str,
}

impl From<&EndpointDescriptor> for EndpointRow {
    fn from(d: &EndpointDescriptor) -> Self {
        Self {
            id: d.id(),
            service: match d.service_family() {
                Some(ServiceFamily::Traffic) => "traffic",
                Some(ServiceFamily::Ferries) => "ferries",
                None => "-",
            },
            params: d.placeholders().join(", "),
            template: d.template(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let rows: Vec<EndpointRow> = catalog::ALL.iter().map(EndpointRow::from).collect();
    let out = output::render_list(global.output, &rows, |r| r.id.to_owned())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
