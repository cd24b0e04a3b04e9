//! Configuration for dottie.
//!
//! A single TOML file, overridable by `DOTTIE_*` environment variables,
//! plus access code resolution (env var, keyring, plaintext) and
//! translation to `dottie_api::ClientConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use dottie_api::{ClientConfig, DEFAULT_BASE_URL, TransportConfig, TransportMode};

/// Environment variable checked first for the access code.
pub const ACCESS_CODE_ENV: &str = "WSDOT_ACCESS_TOKEN";

const ENV_PREFIX: &str = "DOTTIE_";
const KEYRING_SERVICE: &str = "dottie";
const KEYRING_ENTRY: &str = "access-token";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no access code configured (set WSDOT_ACCESS_TOKEN or store one in the keyring)")]
    NoCredentials,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config struct ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Service host; unset means the production host.
    pub base_url: Option<String>,

    /// Access code in plaintext. Prefer the env var or the keyring.
    pub access_code: Option<String>,

    /// Alternate environment variable holding the access code.
    pub access_code_env: Option<String>,

    /// "auto", "direct", or "jsonp".
    #[serde(default = "default_transport")]
    pub transport: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Hard limit for script-injection calls, in seconds.
    #[serde(default = "default_timeout")]
    pub script_timeout: u64,

    /// Seconds between cache flush polls.
    #[serde(default = "default_flush_interval")]
    pub flush_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            access_code: None,
            access_code_env: None,
            transport: default_transport(),
            timeout: default_timeout(),
            script_timeout: default_timeout(),
            flush_interval: default_flush_interval(),
        }
    }
}

fn default_transport() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_flush_interval() -> u64 {
    300
}

impl Config {
    /// The configured host, or the production host.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        raw.parse().map_err(|e| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("{e}: {raw}"),
        })
    }

    /// Resolve the access code from the credential chain.
    pub fn credential(&self) -> Result<SecretString, ConfigError> {
        resolve_credential_with(self, |name| std::env::var(name).ok(), keyring_lookup)
    }

    pub fn transport_mode(&self) -> Result<TransportMode, ConfigError> {
        self.transport
            .parse()
            .map_err(|_| ConfigError::Validation {
                field: "transport".into(),
                reason: format!(
                    "expected 'auto', 'direct', or 'jsonp', got '{}'",
                    self.transport
                ),
            })
    }

    pub fn flush_interval(&self) -> Result<Duration, ConfigError> {
        positive_secs("flush_interval", self.flush_interval)
    }

    /// Render as TOML with the plaintext access code masked.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        if shown.access_code.is_some() {
            shown.access_code = Some("********".into());
        }
        Ok(toml::to_string_pretty(&shown)?)
    }
}

fn positive_secs(field: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be at least 1 second".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "dottie", "dottie").map_or_else(
        || PathBuf::from(".dottie").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Layered sources: defaults, then the TOML file, then `DOTTIE_*` env vars.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
}

/// Load from `path` (a missing file is not an error) and the environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment(path).extract()?;
    debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Load from the canonical config path and the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_lookup() -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, KEYRING_ENTRY)
        .and_then(|entry| entry.get_password())
        .ok()
}

/// Resolve the access code with injectable env and keyring lookups.
///
/// Order: `access_code_env` (if set) or `WSDOT_ACCESS_TOKEN`, then the
/// keyring, then plaintext in the config. Empty values count as unset.
pub fn resolve_credential_with(
    config: &Config,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn() -> Option<String>,
) -> Result<SecretString, ConfigError> {
    let env_name = config.access_code_env.as_deref().unwrap_or(ACCESS_CODE_ENV);
    let non_empty = |v: &String| !v.trim().is_empty();

    if let Some(code) = env(env_name).filter(non_empty) {
        debug!(source = env_name, "access code from environment");
        return Ok(SecretString::from(code));
    }

    if let Some(code) = keyring().filter(non_empty) {
        debug!(source = "keyring", "access code from keyring");
        return Ok(SecretString::from(code));
    }

    if let Some(code) = config.access_code.clone().filter(non_empty) {
        debug!(source = "config", "access code from config file");
        return Ok(SecretString::from(code));
    }

    Err(ConfigError::NoCredentials)
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ClientConfig` from loaded settings and a resolved credential.
pub fn to_client_config(
    config: &Config,
    credential: SecretString,
) -> Result<ClientConfig, ConfigError> {
    let transport = TransportConfig {
        mode: config.transport_mode()?,
        timeout: positive_secs("timeout", config.timeout)?,
        script_timeout: positive_secs("script_timeout", config.script_timeout)?,
        ..TransportConfig::default()
    };

    Ok(ClientConfig::new(credential)
        .with_base_url(config.base_url()?)
        .with_transport(transport))
}
