// ── Request pipeline ──
//
// One logical call: resolve the URL (template + params + access code),
// execute it on the selected transport, parse the body as JSON, optionally
// normalize wrapper dates, and classify any failure into a single `Error`.
// No retries happen here; that is caller policy.

use std::sync::Arc;

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::dates::normalize_dates;
use crate::endpoint::EndpointDescriptor;
use crate::error::{Error, ErrorKind};
use crate::params::Params;
use crate::transport::{
    Failure, RuntimeEnvironment, StrategyKind, Transport, TransportConfig, select_strategy,
};
use crate::url_builder::{self, redact};
use crate::validate::{SerdeSchema, Validate};

/// Production host shared by the traffic and ferries services.
pub const DEFAULT_BASE_URL: &str = "https://www.wsdot.wa.gov";

const BODY_PREVIEW_CHARS: usize = 200;

/// Whether wrapper-format dates are converted before the payload is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Payload exactly as the upstream sent it.
    Raw,
    /// Wrapper dates rewritten as RFC 3339 strings.
    #[default]
    Native,
}

/// Everything the pipeline needs from configuration, passed in explicitly.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base host; `None` means [`DEFAULT_BASE_URL`].
    pub base_url: Option<Url>,
    pub credential: SecretString,
    pub transport: TransportConfig,
}

impl ClientConfig {
    pub fn new(credential: SecretString) -> Self {
        Self {
            base_url: None,
            credential,
            transport: TransportConfig::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }
}

/// Async client for the WSDOT REST services.
///
/// Cheaply cloneable; clones share the HTTP connection pool and the
/// selected transport.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base_url: Url,
    credential: SecretString,
    transport: Transport,
    environment: RuntimeEnvironment,
}

impl Client {
    /// Create a client for the detected runtime environment.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        Self::with_environment(config, RuntimeEnvironment::detect())
    }

    /// Create a client as if running in `environment`.
    pub fn with_environment(
        config: ClientConfig,
        environment: RuntimeEnvironment,
    ) -> Result<Self, Error> {
        let base_url = match config.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL).map_err(|e| {
                Error::new(ErrorKind::Transform, "client", "invalid default base URL")
                    .with_source(e)
            })?,
        };

        let http = config.transport.build_client().map_err(|e| {
            Error::new(ErrorKind::Network, "client", "failed to build HTTP client").with_source(e)
        })?;

        let kind = select_strategy(config.transport.mode, environment);
        debug!(strategy = ?kind, ?environment, base_url = %base_url, "client ready");

        Ok(Self {
            inner: Arc::new(ClientInner {
                base_url,
                credential: config.credential,
                transport: Transport::new(kind, http, &config.transport),
                environment,
            }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn environment(&self) -> RuntimeEnvironment {
        self.inner.environment
    }

    pub fn strategy(&self) -> StrategyKind {
        self.inner.transport.kind()
    }

    // ── URL resolution ───────────────────────────────────────────────

    /// Resolve a template against this client's base host (no access code).
    pub fn build_url(&self, template: &str, params: &Params) -> Result<Url, url::ParseError> {
        url_builder::build_url(&self.inner.base_url, template, params)
    }

    /// Append this client's access code under the family-specific name.
    pub fn inject_auth(&self, url: Url) -> Url {
        url_builder::inject_auth(url, &self.inner.credential)
    }

    /// Fully resolved request URL for an endpoint, access code included.
    pub fn resolve(&self, descriptor: &EndpointDescriptor, params: &Params) -> Result<Url, Error> {
        let url = self.build_url(descriptor.template(), params).map_err(|e| {
            Error::new(
                ErrorKind::Transform,
                descriptor.id(),
                format!("cannot build URL from template: {e}"),
            )
            .with_source(e)
        })?;
        Ok(self.inject_auth(url))
    }

    // ── Execution ────────────────────────────────────────────────────

    /// Execute one call and return the parsed JSON payload.
    pub async fn execute(
        &self,
        descriptor: &EndpointDescriptor,
        params: &Params,
        mode: FetchMode,
    ) -> Result<Value, Error> {
        let url = self.resolve(descriptor, params)?;
        let shown = redact(&url);
        debug!(endpoint = descriptor.id(), url = %shown, strategy = ?self.strategy(), "GET");

        let body = self.inner.transport.execute(&url).await.map_err(|failure| {
            classify(
                failure,
                descriptor.id(),
                self.inner.environment,
                self.strategy(),
            )
            .with_url(shown.clone())
        })?;

        let mut value = parse_body(descriptor.id(), &body).map_err(|e| e.with_url(shown.clone()))?;

        if mode == FetchMode::Native {
            let converted = convert_dates(descriptor.id(), &mut value)
                .map_err(|e| e.with_url(shown.clone()))?;
            debug!(endpoint = descriptor.id(), converted, "normalized wrapper dates");
        }

        Ok(value)
    }

    /// Execute in native mode and deserialize into `T`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        descriptor: &EndpointDescriptor,
        params: &Params,
    ) -> Result<T, Error> {
        self.fetch_with(descriptor, params, FetchMode::Native, &SerdeSchema::<T>::new())
            .await
    }

    /// Execute and run the payload through an output validator.
    pub async fn fetch_with<V>(
        &self,
        descriptor: &EndpointDescriptor,
        params: &Params,
        mode: FetchMode,
        schema: &V,
    ) -> Result<V::Output, Error>
    where
        V: Validate + Sync,
    {
        let value = self.execute(descriptor, params, mode).await?;
        schema.validate(value).map_err(|e| {
            Error::new(
                ErrorKind::InvalidResponse,
                descriptor.id(),
                format!("response failed validation: {e}"),
            )
            .with_source(e)
        })
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("environment", &self.inner.environment)
            .field("strategy", &self.strategy())
            .finish_non_exhaustive()
    }
}

// ── Pipeline steps ───────────────────────────────────────────────────

/// Map a raw transport failure onto the closed error taxonomy.
fn classify(
    failure: Failure,
    endpoint: &str,
    environment: RuntimeEnvironment,
    strategy: StrategyKind,
) -> Error {
    match failure {
        Failure::Request(e) => {
            if environment == RuntimeEnvironment::Browser && strategy == StrategyKind::Direct {
                Error::new(
                    ErrorKind::Cors,
                    endpoint,
                    format!("cross-origin request failed: {e}"),
                )
                .with_source(e)
            } else {
                Error::new(ErrorKind::Network, endpoint, format!("request failed: {e}"))
                    .with_source(e)
            }
        }
        Failure::Timeout(after) => Error::new(
            ErrorKind::Timeout,
            endpoint,
            format!(
                "request timed out after {}",
                humantime::format_duration(after)
            ),
        ),
        Failure::Status {
            status: 429,
            retry_after_secs,
            ..
        } => {
            let err = rate_limited(endpoint);
            match retry_after_secs {
                Some(secs) => err.with_retry_after(secs),
                None => err,
            }
        }
        Failure::ScriptLoad {
            status: Some(429), ..
        } => rate_limited(endpoint),
        Failure::Status { status, body, .. } => {
            Error::new(ErrorKind::Api, endpoint, status_message(status, &body)).with_status(status)
        }
        Failure::ScriptLoad { status, reason } => {
            let err = Error::new(ErrorKind::Network, endpoint, reason);
            match status {
                Some(status) => err.with_status(status),
                None => err,
            }
        }
        Failure::MalformedScript(reason) => Error::new(ErrorKind::Transform, endpoint, reason),
        Failure::CallbackNotInvoked => Error::new(
            ErrorKind::InvalidResponse,
            endpoint,
            "script completed without invoking its callback",
        ),
        Failure::PayloadMessage(message) => Error::new(ErrorKind::Api, endpoint, message),
    }
}

fn rate_limited(endpoint: &str) -> Error {
    Error::new(ErrorKind::RateLimit, endpoint, "rate limited by upstream").with_status(429)
}

/// Parse a response body; failures here are transform errors, never network ones.
fn parse_body(endpoint: &str, body: &str) -> Result<Value, Error> {
    serde_json::from_str(body).map_err(|e| {
        Error::new(
            ErrorKind::Transform,
            endpoint,
            format!("response is not valid JSON: {e} (body preview: {:?})", preview(body)),
        )
        .with_source(e)
    })
}

fn convert_dates(endpoint: &str, value: &mut Value) -> Result<usize, Error> {
    normalize_dates(value).map_err(|e| {
        Error::new(
            ErrorKind::Transform,
            endpoint,
            format!("malformed date in response: {e}"),
        )
        .with_source(e)
    })
}

/// Upstream error bodies usually look like `{"Message": "..."}`.
fn status_message(status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("Message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| preview(body));

    if detail.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {detail}")
    }
}

fn preview(body: &str) -> String {
    body.trim().chars().take(BODY_PREVIEW_CHARS).collect()
}
