//! Network fetch facility

use crate::error::{OfflineError, Result};
use crate::models::StoredResponse;
use http::{HeaderMap, Method};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// HTTP client for fetching resources from the network
///
/// Cheap to clone; clones share the same pooled connections, which lets
/// the timeout race move a handle into a spawned task.
#[derive(Clone)]
pub struct NetworkClient {
    http_client: Client,
}

impl Default for NetworkClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkClient {
    /// Create a new NetworkClient with a pooled connection setup
    pub fn new() -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .expect("Failed to create HTTP client");

        NetworkClient { http_client }
    }

    /// Fetch a resource, forwarding the request headers verbatim
    ///
    /// # Returns
    /// * `Ok(StoredResponse)` - snapshot of the network response, any status
    /// * `Err(OfflineError::NetworkFailure)` - transport-level failure
    pub async fn fetch(
        &self,
        method: &Method,
        url: &str,
        headers: &HeaderMap,
    ) -> Result<StoredResponse> {
        debug!("Fetching: {} {}", method, url);

        let response = self
            .http_client
            .request(method.clone(), url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(|e| OfflineError::NetworkFailure(format!("{}: {}", url, e)))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| OfflineError::NetworkFailure(format!("{}: {}", url, e)))?;

        Ok(StoredResponse::new(status, headers, body))
    }
}

/// Canonical form of a URL for cache keying
///
/// Same-origin and path-only URLs reduce to their path plus query so a
/// pre-cached `/js/app.js` and a runtime request for
/// `http://origin/js/app.js` share one key. Foreign absolute URLs keep
/// their full form. Fragments are dropped either way.
pub fn canonical_url(origin: &str, raw: &str) -> String {
    let raw = raw.split('#').next().unwrap_or(raw);

    if let Ok(parsed) = Url::parse(raw) {
        if parsed.has_host() {
            let same_origin = Url::parse(origin)
                .map(|o| {
                    o.host_str() == parsed.host_str()
                        && o.port_or_known_default() == parsed.port_or_known_default()
                })
                .unwrap_or(false);
            if !same_origin {
                return parsed.to_string();
            }
            return match parsed.query() {
                Some(q) => format!("{}?{}", parsed.path(), q),
                None => parsed.path().to_string(),
            };
        }
    }

    raw.to_string()
}

/// Resolve a configured path against the origin base URL
///
/// Absolute URLs pass through untouched; paths are joined onto the origin.
pub fn resolve(origin: &str, path_or_url: &str) -> Result<String> {
    if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
        return Ok(path_or_url.to_string());
    }

    let base = Url::parse(origin)
        .map_err(|e| OfflineError::ConfigError(format!("invalid origin '{}': {}", origin, e)))?;
    let joined = base
        .join(path_or_url)
        .map_err(|e| OfflineError::ParseError(format!("cannot resolve '{}': {}", path_or_url, e)))?;
    Ok(joined.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path_against_origin() {
        let url = resolve("http://127.0.0.1:8080", "/js/app.js").unwrap();
        assert_eq!(url, "http://127.0.0.1:8080/js/app.js");
    }

    #[test]
    fn test_resolve_passes_absolute_urls_through() {
        let url = resolve("http://127.0.0.1:8080", "https://wa.me/5491100000000").unwrap();
        assert_eq!(url, "https://wa.me/5491100000000");
    }

    #[test]
    fn test_resolve_rejects_invalid_origin() {
        assert!(resolve("not a url", "/js/app.js").is_err());
    }

    #[test]
    fn test_canonical_url_same_origin_reduces_to_path() {
        let origin = "http://127.0.0.1:8080";
        assert_eq!(
            canonical_url(origin, "http://127.0.0.1:8080/js/app.js"),
            "/js/app.js"
        );
        assert_eq!(canonical_url(origin, "/js/app.js"), "/js/app.js");
        assert_eq!(
            canonical_url(origin, "http://127.0.0.1:8080/productos?page=2"),
            "/productos?page=2"
        );
    }

    #[test]
    fn test_canonical_url_foreign_host_keeps_full_form() {
        let origin = "http://127.0.0.1:8080";
        assert_eq!(
            canonical_url(origin, "https://wa.me/5491100000000"),
            "https://wa.me/5491100000000"
        );
    }

    #[test]
    fn test_canonical_url_drops_fragment() {
        let origin = "http://127.0.0.1:8080";
        assert_eq!(canonical_url(origin, "/index.html#top"), "/index.html");
    }
}
