//! Core data models for the offline agent

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde::{Deserialize, Serialize};

/// Classification of an intercepted request
///
/// Derived deterministically from the request URL and headers; computed
/// per request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceClass {
    /// Versioned application shell assets (exact list match or css/js/font extension)
    StaticAsset,
    /// Image content (image extension or a configured directory marker)
    Image,
    /// HTML navigation (Accept: text/html)
    Document,
    /// Third-party service on the external-domain allow-list
    ExternalApi,
    /// Everything else
    Other,
}

/// Caching strategy applied to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Serve from the static generation, fetch only on miss
    CacheFirst,
    /// Fetch first, fall back to cached copies when the network fails
    NetworkFirst,
    /// Race the fetch against a timer, never cache
    NetworkWithTimeout,
}

impl Strategy {
    /// Fixed lookup table from resource class to strategy
    pub fn for_class(class: ResourceClass) -> Strategy {
        match class {
            ResourceClass::StaticAsset => Strategy::CacheFirst,
            ResourceClass::Image => Strategy::NetworkFirst,
            ResourceClass::Document => Strategy::NetworkFirst,
            ResourceClass::ExternalApi => Strategy::NetworkWithTimeout,
            ResourceClass::Other => Strategy::NetworkFirst,
        }
    }
}

/// Immutable snapshot of a network response
///
/// Written into a cache generation only after a successful (2xx) fetch;
/// never mutated after write, only overwritten by a newer write under the
/// same key.
#[derive(Debug, Clone)]
pub struct StoredResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
}

impl StoredResponse {
    /// Create a response snapshot
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        StoredResponse {
            status,
            headers,
            body,
        }
    }

    /// Whether the status is in the 200-299 range
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Synthesize a 503 response with a short plain-text explanation
    ///
    /// Used on every unrecoverable failure path so the requester always
    /// receives a well-formed response instead of a raw error.
    pub fn unavailable(message: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        StoredResponse {
            status: StatusCode::SERVICE_UNAVAILABLE,
            headers,
            body: Bytes::from(message.to_string()),
        }
    }
}

/// Normalized cache key for a request
///
/// Keys are `"METHOD url"` with any fragment stripped; two requests with
/// the same method and URL always map to the same key.
pub fn request_key(method: &Method, url: &str) -> String {
    let url = url.split('#').next().unwrap_or(url);
    format!("{} {}", method, url)
}
