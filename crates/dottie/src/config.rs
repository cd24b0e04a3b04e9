//! CLI configuration: thin wrapper around `dottie_config` that applies
//! `GlobalOpts` flag overrides (--base-url, --transport, --timeout).

use std::path::PathBuf;

use dottie_api::Client;
use dottie_config::{Config, config_path, load_config_from, to_client_config};
use dottie_core::Dottie;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The config file in effect: `--config` / `DOTTIE_CONFIG`, else the default.
pub fn effective_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load the file + env configuration, then apply flag overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut config = load_config_from(&effective_path(global))?;

    if let Some(ref base_url) = global.base_url {
        config.base_url = Some(base_url.clone());
    }
    if let Some(transport) = global.transport {
        config.transport = transport.as_config_value().to_owned();
    }
    if let Some(timeout) = global.timeout {
        config.timeout = timeout;
    }

    Ok(config)
}

/// Build a ready-to-use service handle from the effective configuration.
pub fn connect(config: &Config) -> Result<Dottie, CliError> {
    let credential = config.credential()?;
    let client = Client::new(to_client_config(config, credential)?)?;
    tracing::debug!(?client, "client configured");
    Ok(Dottie::new(client))
}
