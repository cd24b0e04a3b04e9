use std::time::Duration;

use reqwest::header::{ACCEPT, RETRY_AFTER};
use tracing::trace;
use url::Url;

use super::Failure;

/// Plain GET against the network stack; timeouts and cancellation come
/// from the underlying `reqwest::Client`.
pub(crate) struct DirectTransport {
    http: reqwest::Client,
    timeout: Duration,
}

impl DirectTransport {
    pub(crate) fn new(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    pub(crate) async fn execute(&self, url: &Url) -> Result<String, Failure> {
        let resp = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.request_failure(e))?;

        let status = resp.status();
        trace!(%status, "direct transport response");

        if !status.is_success() {
            let retry_after_secs = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            let body = resp.text().await.unwrap_or_default();
            return Err(Failure::Status {
                status: status.as_u16(),
                retry_after_secs,
                body,
            });
        }

        resp.text().await.map_err(|e| self.request_failure(e))
    }

    fn request_failure(&self, err: reqwest::Error) -> Failure {
        if err.is_timeout() {
            Failure::Timeout(self.timeout)
        } else {
            Failure::Request(err)
        }
    }
}
