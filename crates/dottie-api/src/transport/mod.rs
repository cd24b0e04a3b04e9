// Transport strategies and the policy that picks between them.
//
// Script injection is emulated natively: the callback-bearing script is
// fetched over HTTP and its invocation dispatched through the callback
// registry. There is no DOM variant, so a browser-like runtime is never
// detected; hosts that front the upstream without CORS access declare it
// with `Client::with_environment`.
//
// Both strategies take a fully resolved URL and hand back the raw response
// body as text, so everything downstream is transport-agnostic. Failures are
// reported as a crate-private `Failure` and classified by the pipeline.

mod direct;
mod jsonp;

use std::time::Duration;

use strum::{Display, EnumString};
use url::Url;

pub use jsonp::{CALLBACK_PARAM, CallbackRegistry};

pub(crate) use direct::DirectTransport;
pub(crate) use jsonp::JsonpTransport;

/// Environment variable whose presence marks an automated-test run.
pub const TEST_ENV_MARKER: &str = "DOTTIE_TEST";

/// Hard limit for a script-injection call, including cleanup.
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("dottie/", env!("CARGO_PKG_VERSION"));

/// The runtime the client is executing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    /// Automated tests; always uses the direct strategy.
    Test,
    /// Host without a usable cross-origin request path. Never detected,
    /// only declared by the embedding host.
    Browser,
    /// Native / server-side runtime.
    Server,
}

impl RuntimeEnvironment {
    /// Detect from the process environment: the test marker wins,
    /// everything else runs as a server.
    pub fn detect() -> Self {
        Self::from_test_marker(std::env::var_os(TEST_ENV_MARKER).is_some())
    }

    fn from_test_marker(present: bool) -> Self {
        if present { Self::Test } else { Self::Server }
    }
}

/// User-facing transport override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TransportMode {
    /// Decide from the runtime environment.
    #[default]
    Auto,
    Direct,
    #[strum(to_string = "jsonp", serialize = "script", serialize = "script-injection")]
    ScriptInjection,
}

/// Which strategy ended up executing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Direct,
    ScriptInjection,
}

/// Pick a strategy: explicit overrides first, then test marker, then a
/// host-declared browser runtime, else direct.
pub fn select_strategy(mode: TransportMode, environment: RuntimeEnvironment) -> StrategyKind {
    match mode {
        TransportMode::Direct => StrategyKind::Direct,
        TransportMode::ScriptInjection => StrategyKind::ScriptInjection,
        TransportMode::Auto => match environment {
            RuntimeEnvironment::Test | RuntimeEnvironment::Server => StrategyKind::Direct,
            RuntimeEnvironment::Browser => StrategyKind::ScriptInjection,
        },
    }
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub mode: TransportMode,
    /// Timeout applied by the underlying HTTP client (direct strategy).
    pub timeout: Duration,
    /// Hard timeout for script-injection calls.
    pub script_timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            mode: TransportMode::Auto,
            timeout: Duration::from_secs(30),
            script_timeout: DEFAULT_SCRIPT_TIMEOUT,
            user_agent: USER_AGENT.to_owned(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
    }
}

/// A raw transport failure, before classification.
#[derive(Debug)]
pub(crate) enum Failure {
    /// Send or body-read failure reported by the HTTP stack.
    Request(reqwest::Error),
    Timeout(Duration),
    Status {
        status: u16,
        retry_after_secs: Option<u64>,
        body: String,
    },
    /// The injected script could not be loaded.
    ScriptLoad {
        status: Option<u16>,
        reason: String,
    },
    /// The script was not a callback invocation we could evaluate.
    MalformedScript(String),
    /// The script loaded but never invoked this call's callback.
    CallbackNotInvoked,
    /// Transport succeeded but the payload carries a failure message.
    PayloadMessage(String),
}

/// The selected strategy, ready to execute requests.
pub(crate) enum Transport {
    Direct(DirectTransport),
    ScriptInjection(JsonpTransport),
}

impl Transport {
    pub(crate) fn new(
        kind: StrategyKind,
        http: reqwest::Client,
        config: &TransportConfig,
    ) -> Self {
        match kind {
            StrategyKind::Direct => Self::Direct(DirectTransport::new(http, config.timeout)),
            StrategyKind::ScriptInjection => Self::ScriptInjection(JsonpTransport::new(
                http,
                config.script_timeout,
                CallbackRegistry::global(),
            )),
        }
    }

    pub(crate) fn kind(&self) -> StrategyKind {
        match self {
            Self::Direct(_) => StrategyKind::Direct,
            Self::ScriptInjection(_) => StrategyKind::ScriptInjection,
        }
    }

    pub(crate) async fn execute(&self, url: &Url) -> Result<String, Failure> {
        match self {
            Self::Direct(t) => t.execute(url).await,
            Self::ScriptInjection(t) => t.execute(url).await,
        }
    }
}
