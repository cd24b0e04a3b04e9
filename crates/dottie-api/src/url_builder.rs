// ── URL construction ──
//
// Endpoint templates are paths with `{name}` placeholders, e.g.
// `/traffic/api/TrafficFlow/TrafficFlowREST.svc/GetTrafficFlowAsJson?FlowDataID={flowDataID}`.
// Resolution substitutes supplied params, strips whatever placeholders are
// left, and drops any query segment that still referenced one. The access
// code is appended last, under a name that depends on the service family.

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::params::Params;

/// Query parameter carrying the access code for traffic services.
pub const TRAFFIC_AUTH_PARAM: &str = "accesscode";

/// Query parameter carrying the access code for ferries services.
pub const FERRIES_AUTH_PARAM: &str = "apiaccesscode";

const REDACTED: &str = "REDACTED";

/// The two upstream service families, which disagree on how the access
/// code is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceFamily {
    Traffic,
    Ferries,
}

impl ServiceFamily {
    /// Detect the family from a path (or full URL) by its fixed segment.
    pub fn detect(path: &str) -> Option<Self> {
        let path = path.to_ascii_lowercase();
        if path.contains("/traffic/") {
            Some(Self::Traffic)
        } else if path.contains("/ferries/") {
            Some(Self::Ferries)
        } else {
            None
        }
    }

    pub fn auth_param(self) -> &'static str {
        match self {
            Self::Traffic => TRAFFIC_AUTH_PARAM,
            Self::Ferries => FERRIES_AUTH_PARAM,
        }
    }
}

/// Substitute params into a template and strip unresolved placeholders.
///
/// Values are percent-encoded. The result is still relative to the base host.
pub fn resolve_template(template: &str, params: &Params) -> String {
    let mut resolved = template.to_owned();
    for (key, value) in params.iter() {
        let token = format!("{{{key}}}");
        if resolved.contains(&token) {
            let encoded = urlencoding::encode(&value.to_string()).into_owned();
            resolved = resolved.replace(&token, &encoded);
        }
    }
    strip_unresolved(&resolved)
}

/// Resolve a template against the base host.
pub fn build_url(base: &Url, template: &str, params: &Params) -> Result<Url, url::ParseError> {
    let resolved = resolve_template(template, params);
    if resolved.starts_with("http://") || resolved.starts_with("https://") {
        return Url::parse(&resolved);
    }

    let base = base.as_str().trim_end_matches('/');
    let sep = if resolved.starts_with('/') { "" } else { "/" };
    Url::parse(&format!("{base}{sep}{resolved}"))
}

/// Append the access code under the family-specific parameter name.
///
/// URLs outside both families are returned untouched; the upstream then
/// rejects the call, which surfaces as an ordinary API error.
pub fn inject_auth(mut url: Url, credential: &SecretString) -> Url {
    let Some(family) = ServiceFamily::detect(url.path()) else {
        return url;
    };
    let name = family.auth_param();
    if url.query_pairs().any(|(k, _)| k == name) {
        return url;
    }
    url.query_pairs_mut()
        .append_pair(name, credential.expose_secret());
    url
}

/// Render a URL for logs and error records with access codes masked.
pub fn redact(url: &Url) -> String {
    let is_secret = |k: &str| k == TRAFFIC_AUTH_PARAM || k == FERRIES_AUTH_PARAM;
    if !url.query_pairs().any(|(k, _)| is_secret(&k)) {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if is_secret(&k) {
                REDACTED.to_owned()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();

    let mut masked = url.clone();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

fn strip_unresolved(resolved: &str) -> String {
    let (path, query) = match resolved.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (resolved, None),
    };

    let had_trailing_slash = path.ends_with('/');
    let mut path = collapse_slashes(&remove_placeholders(path));
    if !had_trailing_slash && path.len() > 1 && path.ends_with('/') {
        path.pop();
    }

    let segments: Vec<&str> = query
        .unwrap_or_default()
        .split('&')
        .filter(|seg| !seg.is_empty() && !seg.contains('{') && !seg.ends_with('='))
        .collect();

    if segments.is_empty() {
        path
    } else {
        format!("{path}?{}", segments.join("&"))
    }
}

fn remove_placeholders(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev = None;
    let mut prev_prev = None;
    for c in path.chars() {
        // Keep the `//` that follows a scheme.
        if c == '/' && prev == Some('/') && prev_prev != Some(':') {
            continue;
        }
        prev_prev = prev;
        prev = Some(c);
        out.push(c);
    }
    out
}
