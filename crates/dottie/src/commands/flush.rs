//! `dottie flush-dates`: one-shot read of every group's flush marker.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use dottie_core::SourceGroup;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize, Tabled)]
struct FlushRow {
    #[tabled(rename = "Group")]
    group: SourceGroup,
    #[tabled(rename = "Last flushed (UTC)")]
    flushed: String,
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let settings = config::load(global)?;
    let dottie = config::connect(&settings)?;

    let mut rows = Vec::new();
    for group in SourceGroup::iter() {
        let flushed = dottie.cache_flush_date(group).await?;
        rows.push(FlushRow {
            group,
            flushed: flushed.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        });
    }

    let out = output::render_list(global.output, &rows, |r| {
        format!("{}\t{}", r.group, r.flushed)
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
