//! `dottie fetch <id> -p key=value [--raw]`: call one endpoint.

use dottie_api::{FetchMode, Params};
use dottie_core::{CoreError, catalog};

use crate::cli::{FetchArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: FetchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Resolve the endpoint before touching credentials.
    let descriptor = catalog::find(&args.id).ok_or_else(|| CoreError::UnknownEndpoint {
        id: args.id.clone(),
    })?;

    let settings = config::load(global)?;
    let dottie = config::connect(&settings)?;

    let params: Params = args.params.into_iter().collect();
    let mode = if args.raw {
        FetchMode::Raw
    } else {
        FetchMode::Native
    };

    let value = dottie.call_descriptor(descriptor, &params, mode).await?;
    let out = output::render_value(global.output, &value)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
