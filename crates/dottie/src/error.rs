//! CLI error types with miette diagnostics.
//!
//! Maps pipeline, core, and config failures into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use dottie_api::ErrorKind;
use dottie_config::ConfigError;
use dottie_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const RATE_LIMIT: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("No access code configured")]
    #[diagnostic(
        code(dottie::no_credentials),
        help(
            "Set the WSDOT_ACCESS_TOKEN environment variable,\n\
             or add access_code to the config file (see: dottie config path)."
        )
    )]
    NoCredentials,

    #[error("Access code rejected: {message}")]
    #[diagnostic(
        code(dottie::auth_failed),
        help("Check your access code at https://wsdot.wa.gov/traffic/api/")
    )]
    AuthFailed { message: String },

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("Unknown endpoint '{id}'")]
    #[diagnostic(code(dottie::not_found), help("Run: dottie endpoints"))]
    UnknownEndpoint { id: String },

    // ── Requests ─────────────────────────────────────────────────────
    #[error("{source}")]
    #[diagnostic(code(dottie::request_failed), help("{help}"))]
    Request {
        #[source]
        source: dottie_api::Error,
        help: String,
    },

    // ── Validation / configuration ───────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(dottie::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(dottie::config), help("Config file: {path}"))]
    Config { message: String, path: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(dottie::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoCredentials | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::UnknownEndpoint { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Request { source, .. } => match source.kind() {
                ErrorKind::Network | ErrorKind::Cors => exit_code::CONNECTION,
                ErrorKind::Timeout => exit_code::TIMEOUT,
                ErrorKind::RateLimit => exit_code::RATE_LIMIT,
                ErrorKind::Api | ErrorKind::Transform | ErrorKind::InvalidResponse => {
                    exit_code::GENERAL
                }
            },
            Self::Config { .. } | Self::Io(_) | Self::Json(_) => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<dottie_api::Error> for CliError {
    fn from(err: dottie_api::Error) -> Self {
        if err.is_auth_failure() {
            return Self::AuthFailed {
                message: err.message().to_owned(),
            };
        }
        let help = match err.kind() {
            ErrorKind::Network => "Check your network connection and the configured base_url.".into(),
            ErrorKind::Timeout => "Increase the timeout with --timeout or try again later.".into(),
            ErrorKind::RateLimit => match err.retry_after_secs() {
                Some(secs) => format!("Retry after {secs}s."),
                None => "Wait a moment before retrying.".into(),
            },
            ErrorKind::Cors => "Use --transport jsonp in browser-like runtimes.".into(),
            ErrorKind::Api => "The service rejected the request; check the parameters.".into(),
            ErrorKind::Transform | ErrorKind::InvalidResponse => {
                "The service returned data in an unexpected shape. Try --raw to inspect it.".into()
            }
        };
        Self::Request { source: err, help }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownEndpoint { id } => Self::UnknownEndpoint { id },
            CoreError::InvalidParams(e) => Self::Validation {
                field: e.path().unwrap_or("params").to_owned(),
                reason: e.message().to_owned(),
            },
            CoreError::Api(e) => e.into(),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials => Self::NoCredentials,
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config {
                message: other.to_string(),
                path: dottie_config::config_path().display().to_string(),
            },
        }
    }
}
