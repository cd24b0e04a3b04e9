// ── Script-injection (JSONP) transport ──
//
// For runtimes where the upstream's missing CORS headers make a direct
// request impossible. Each call binds a uniquely named callback in a
// process-wide registry, loads the callback-bearing script, and evaluates
// the `name(payload)` invocation by dispatching the payload to whichever
// callback it names. The binding is released on every exit path, including
// the hard timeout.
//
// There is no HTTP status channel on this path, so payloads carrying a
// failure `Message` are treated as failed calls.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use dashmap::DashMap;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};
use url::Url;
use uuid::Uuid;

use super::Failure;

/// Query parameter naming the callback the script must invoke.
pub const CALLBACK_PARAM: &str = "callback";

const CALLBACK_PREFIX: &str = "dottie_cb_";

/// Lowercase fragments that mark a `Message` field as a failure report.
const FAILURE_MARKERS: &[&str] = &[
    "invalid",
    "error",
    "fail",
    "denied",
    "unauthorized",
    "not authorized",
    "exception",
];

static GLOBAL_REGISTRY: LazyLock<Arc<CallbackRegistry>> =
    LazyLock::new(|| Arc::new(CallbackRegistry::new()));

/// Pending script callbacks, keyed by their unique names.
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    pending: DashMap<String, oneshot::Sender<Value>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by clients.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    pub(crate) fn register(self: &Arc<Self>) -> (CallbackBinding, oneshot::Receiver<Value>) {
        let name = format!("{CALLBACK_PREFIX}{}", Uuid::new_v4().simple());
        let (tx, rx) = oneshot::channel();
        self.pending.insert(name.clone(), tx);
        (
            CallbackBinding {
                registry: Arc::clone(self),
                name,
            },
            rx,
        )
    }

    /// Fire a pending callback. Returns `false` if nothing by that name is
    /// bound (already fired, timed out, or never registered).
    pub fn invoke(&self, name: &str, payload: Value) -> bool {
        match self.pending.remove(name) {
            Some((_, tx)) => tx.send(payload).is_ok(),
            None => false,
        }
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.pending.contains_key(name)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// A callback bound for the lifetime of one call. Dropping it unbinds.
pub(crate) struct CallbackBinding {
    registry: Arc<CallbackRegistry>,
    name: String,
}

impl CallbackBinding {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for CallbackBinding {
    fn drop(&mut self) {
        if self.registry.pending.remove(&self.name).is_some() {
            trace!(callback = %self.name, "released unfired callback");
        }
    }
}

pub(crate) struct JsonpTransport {
    http: reqwest::Client,
    timeout: Duration,
    registry: Arc<CallbackRegistry>,
}

impl JsonpTransport {
    pub(crate) fn new(
        http: reqwest::Client,
        timeout: Duration,
        registry: Arc<CallbackRegistry>,
    ) -> Self {
        Self {
            http,
            timeout,
            registry,
        }
    }

    pub(crate) async fn execute(&self, url: &Url) -> Result<String, Failure> {
        let (binding, rx) = self.registry.register();

        let mut script_url = url.clone();
        script_url
            .query_pairs_mut()
            .append_pair(CALLBACK_PARAM, binding.name());
        debug!(callback = binding.name(), "injecting script request");

        let outcome = tokio::time::timeout(self.timeout, self.load_and_run(&script_url, rx)).await;
        drop(binding);

        let payload = match outcome {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    timeout = %humantime::format_duration(self.timeout),
                    "script request timed out"
                );
                return Err(Failure::Timeout(self.timeout));
            }
        };

        if let Some(message) = embedded_failure(&payload) {
            return Err(Failure::PayloadMessage(message));
        }

        serde_json::to_string(&payload).map_err(|e| Failure::MalformedScript(e.to_string()))
    }

    async fn load_and_run(
        &self,
        script_url: &Url,
        mut rx: oneshot::Receiver<Value>,
    ) -> Result<Value, Failure> {
        let script = self.load_script(script_url).await?;
        let (name, payload) = parse_script(&script)?;

        if !self.registry.invoke(name, payload) {
            trace!(callback = name, "script invoked an unbound callback");
        }

        rx.try_recv().map_err(|_| Failure::CallbackNotInvoked)
    }

    async fn load_script(&self, url: &Url) -> Result<String, Failure> {
        let resp = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/javascript, */*;q=0.1")
            .send()
            .await
            .map_err(|e| self.load_failure(&e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Failure::ScriptLoad {
                status: Some(status.as_u16()),
                reason: format!("script load failed with HTTP {status}"),
            });
        }

        resp.text().await.map_err(|e| self.load_failure(&e))
    }

    fn load_failure(&self, err: &reqwest::Error) -> Failure {
        if err.is_timeout() {
            Failure::Timeout(self.timeout)
        } else {
            Failure::ScriptLoad {
                status: None,
                reason: err.to_string(),
            }
        }
    }
}

/// Split `name(payload);` into the callback name and its JSON argument.
fn parse_script(script: &str) -> Result<(&str, Value), Failure> {
    let body = script.trim();
    let body = body.strip_prefix("/**/").unwrap_or(body).trim_start();

    let open = body
        .find('(')
        .ok_or_else(|| Failure::MalformedScript("no callback invocation in script".into()))?;

    let name = body[..open].trim();
    let valid_name = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'));
    if !valid_name {
        return Err(Failure::MalformedScript(format!(
            "invalid callback name {name:?}"
        )));
    }

    let args = body[open + 1..].trim_end();
    let args = args.strip_suffix(';').unwrap_or(args).trim_end();
    let args = args
        .strip_suffix(')')
        .ok_or_else(|| Failure::MalformedScript("unterminated callback invocation".into()))?;

    let payload = serde_json::from_str(args)
        .map_err(|e| Failure::MalformedScript(format!("callback argument is not JSON: {e}")))?;

    Ok((name, payload))
}

/// The `Message` of a payload that reports a failure, if any.
pub(crate) fn embedded_failure(payload: &Value) -> Option<String> {
    let message = payload.get("Message")?.as_str()?;
    let lower = message.to_ascii_lowercase();
    FAILURE_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
        .then(|| message.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn callback_of(req: &Request) -> String {
        req.url
            .query_pairs()
            .find(|(k, _)| k == CALLBACK_PARAM)
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    fn transport(registry: &Arc<CallbackRegistry>, timeout: Duration) -> JsonpTransport {
        JsonpTransport::new(reqwest::Client::new(), timeout, Arc::clone(registry))
    }

    #[test]
    fn parses_plain_invocation() {
        let (name, payload) = parse_script("cb_1({\"a\":1});").unwrap();
        assert_eq!(name, "cb_1");
        assert_eq!(payload, json!({"a": 1}));
    }

    #[test]
    fn parses_guarded_invocation_with_whitespace() {
        let (name, payload) = parse_script("/**/ cb_2 ( [1, 2] ) ;\n").unwrap();
        assert_eq!(name, "cb_2");
        assert_eq!(payload, json!([1, 2]));
    }

    #[test]
    fn rejects_non_invocations() {
        assert!(matches!(
            parse_script("{\"a\":1}"),
            Err(Failure::MalformedScript(_))
        ));
        assert!(matches!(
            parse_script("alert('x')"),
            Err(Failure::MalformedScript(_))
        ));
        assert!(matches!(
            parse_script("cb({\"a\":1}"),
            Err(Failure::MalformedScript(_))
        ));
    }

    #[test]
    fn embedded_failure_detection() {
        assert_eq!(
            embedded_failure(&json!({"Message": "Invalid access code"})).as_deref(),
            Some("Invalid access code")
        );
        assert_eq!(embedded_failure(&json!({"Message": "OK"})), None);
        assert_eq!(embedded_failure(&json!([{"Message": "error"}])), None);
        assert_eq!(embedded_failure(&json!({"VesselID": 1})), None);
    }

    #[test]
    fn registry_names_are_unique_and_released_on_drop() {
        let registry = Arc::new(CallbackRegistry::new());
        let (a, _rx_a) = registry.register();
        let (b, _rx_b) = registry.register();
        assert_ne!(a.name(), b.name());
        assert_eq!(registry.pending_count(), 2);

        let name = a.name().to_owned();
        drop(a);
        assert!(!registry.is_pending(&name));
        assert_eq!(registry.pending_count(), 1);
    }

    #[test]
    fn invoke_delivers_once() {
        let registry = Arc::new(CallbackRegistry::new());
        let (binding, mut rx) = registry.register();
        let name = binding.name().to_owned();

        assert!(registry.invoke(&name, json!(42)));
        assert!(!registry.invoke(&name, json!(43)));
        assert_eq!(rx.try_recv().unwrap(), json!(42));
    }

    #[tokio::test]
    async fn executes_round_trip_through_callback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ferries/api/vessels/rest/vesselbasics"))
            .respond_with(|req: &Request| {
                let cb = callback_of(req);
                ResponseTemplate::new(200)
                    .set_body_string(format!("{cb}([{{\"VesselID\":1}}]);"))
            })
            .mount(&server)
            .await;

        let registry = Arc::new(CallbackRegistry::new());
        let url = Url::parse(&format!("{}/ferries/api/vessels/rest/vesselbasics", server.uri()))
            .unwrap();
        let body = transport(&registry, Duration::from_secs(5))
            .execute(&url)
            .await
            .unwrap();

        assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!([{"VesselID": 1}]));
        assert_eq!(registry.pending_count(), 0);
    }

    #[tokio::test]
    async fn payload_message_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(|req: &Request| {
                let cb = callback_of(req);
                ResponseTemplate::new(200)
                    .set_body_string(format!("{cb}({{\"Message\":\"Invalid access code\"}})"))
            })
            .mount(&server)
            .await;

        let registry = Arc::new(CallbackRegistry::new());
        let url = Url::parse(&format!("{}/ferries/api/x", server.uri())).unwrap();
        let result = transport(&registry, Duration::from_secs(5)).execute(&url).await;

        assert!(
            matches!(result, Err(Failure::PayloadMessage(ref m)) if m == "Invalid access code"),
            "expected payload failure, got: {result:?}"
        );
    }

    #[tokio::test]
    async fn wrong_callback_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("someone_else({})"))
            .mount(&server)
            .await;

        let registry = Arc::new(CallbackRegistry::new());
        let url = Url::parse(&format!("{}/ferries/api/x", server.uri())).unwrap();
        let result = transport(&registry, Duration::from_secs(5)).execute(&url).await;

        assert!(matches!(result, Err(Failure::CallbackNotInvoked)));
        assert_eq!(registry.pending_count(), 0);
    }

    #[tokio::test]
    async fn timeout_releases_binding() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late({})")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let registry = Arc::new(CallbackRegistry::new());
        let url = Url::parse(&format!("{}/ferries/api/x", server.uri())).unwrap();
        let result = transport(&registry, Duration::from_millis(100))
            .execute(&url)
            .await;

        assert!(matches!(result, Err(Failure::Timeout(_))));
        assert_eq!(registry.pending_count(), 0);
    }

    #[tokio::test]
    async fn load_failure_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let registry = Arc::new(CallbackRegistry::new());
        let url = Url::parse(&format!("{}/ferries/api/x", server.uri())).unwrap();
        let result = transport(&registry, Duration::from_secs(5)).execute(&url).await;

        assert!(matches!(
            result,
            Err(Failure::ScriptLoad {
                status: Some(503),
                ..
            })
        ));
    }
}
