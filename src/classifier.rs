//! Request classification into resource classes

use crate::config::OfflineConfig;
use crate::models::ResourceClass;
use http::HeaderMap;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Path extensions treated as static application-shell assets
const STATIC_EXTENSIONS: [&str; 4] = ["css", "js", "woff", "woff2"];

/// Path extensions treated as images
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "svg"];

/// Classifies intercepted requests into a fixed set of resource classes
///
/// Classification is pure, deterministic, and total: every request maps
/// to exactly one class, with no side effects.
pub struct RequestClassifier {
    config: Arc<OfflineConfig>,
}

impl RequestClassifier {
    /// Create a new RequestClassifier with the given configuration
    pub fn new(config: Arc<OfflineConfig>) -> Self {
        RequestClassifier { config }
    }

    /// Classify a request by URL and headers
    ///
    /// Rules, first match wins:
    /// 1. `StaticAsset` - URL exactly matches the static-asset list, or the
    ///    path ends in a static extension (css, js, woff, woff2)
    /// 2. `Image` - path ends in an image extension (jpg, jpeg, png, webp,
    ///    svg) or contains the product/branch image directory marker
    /// 3. `Document` - the Accept header contains `text/html`
    /// 4. `ExternalApi` - the URL host is on the external-domain allow-list
    /// 5. `Other` - everything else
    pub fn classify(&self, url: &str, headers: &HeaderMap) -> ResourceClass {
        let (host, path) = split_host_path(url);

        if self.is_static_asset(url, &path) {
            debug!("Classified as static asset: url={}", url);
            return ResourceClass::StaticAsset;
        }

        if self.is_image(&path) {
            debug!("Classified as image: url={}", url);
            return ResourceClass::Image;
        }

        if accepts_html(headers) {
            debug!("Classified as document: url={}", url);
            return ResourceClass::Document;
        }

        if let Some(host) = host {
            if self
                .config
                .external_api_hosts
                .iter()
                .any(|allowed| allowed == &host)
            {
                debug!("Classified as external API: url={}", url);
                return ResourceClass::ExternalApi;
            }
        }

        debug!("Classified as other: url={}", url);
        ResourceClass::Other
    }

    fn is_static_asset(&self, url: &str, path: &str) -> bool {
        if self
            .config
            .static_assets
            .iter()
            .any(|asset| asset == url || asset == path)
        {
            return true;
        }
        has_extension(path, &STATIC_EXTENSIONS)
    }

    fn is_image(&self, path: &str) -> bool {
        if has_extension(path, &IMAGE_EXTENSIONS) {
            return true;
        }
        path.contains(self.config.product_image_marker.as_str())
            || path.contains(self.config.branch_image_marker.as_str())
    }
}

/// Split a URL into its host (absolute URLs only) and path
///
/// Path-only requests such as `/js/app.js` have no host and therefore can
/// never classify as `ExternalApi`. Query strings and fragments are not
/// part of the returned path.
fn split_host_path(raw: &str) -> (Option<String>, String) {
    if let Ok(parsed) = Url::parse(raw) {
        if parsed.has_host() {
            let host = parsed.host_str().map(|h| h.to_string());
            return (host, parsed.path().to_string());
        }
    }

    let path = raw
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or(raw)
        .to_string();
    (None, path)
}

/// Whether the path's final extension is in the given set (case-insensitive)
fn has_extension(path: &str, extensions: &[&str]) -> bool {
    let Some((stem, ext)) = path.rsplit_once('.') else {
        return false;
    };
    if stem.is_empty() || ext.contains('/') {
        return false;
    }
    extensions.iter().any(|e| ext.eq_ignore_ascii_case(e))
}

/// Whether the Accept header announces an HTML navigation
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(http::header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false)
}
