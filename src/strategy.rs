//! Per-class caching strategies
//!
//! Every intercepted GET runs exactly one of three strategies, selected
//! by resource class. All failure paths end in a synthesized 503; the
//! requester never sees a raw error.

use crate::classifier::RequestClassifier;
use crate::config::OfflineConfig;
use crate::error::OfflineError;
use crate::fetch::{self, NetworkClient};
use crate::metrics::OfflineMetrics;
use crate::models::{request_key, ResourceClass, StoredResponse, Strategy};
use crate::store::{Generation, GenerationStore};
use http::{HeaderMap, Method};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const STATIC_UNAVAILABLE: &str = "resource unavailable offline";
const CONTENT_UNAVAILABLE: &str = "content unavailable offline";
const SERVICE_UNAVAILABLE: &str = "service unavailable";

/// Runs the per-class caching strategy for each intercepted request
pub struct StrategyEngine {
    config: Arc<OfflineConfig>,
    classifier: RequestClassifier,
    store: GenerationStore,
    network: NetworkClient,
    metrics: Arc<OfflineMetrics>,
}

impl StrategyEngine {
    /// Create a new StrategyEngine
    pub fn new(
        config: Arc<OfflineConfig>,
        store: GenerationStore,
        network: NetworkClient,
        metrics: Arc<OfflineMetrics>,
    ) -> Self {
        StrategyEngine {
            classifier: RequestClassifier::new(Arc::clone(&config)),
            config,
            store,
            network,
            metrics,
        }
    }

    /// Classify a request without running a strategy
    pub fn classify(&self, url: &str, headers: &HeaderMap) -> ResourceClass {
        self.classifier.classify(url, headers)
    }

    /// Handle one intercepted request
    ///
    /// Only GET requests participate in caching; every other method is
    /// forwarded directly to the network and never touches a generation.
    /// Always returns a well-formed response.
    pub async fn handle(
        &self,
        method: &Method,
        url: &str,
        headers: &HeaderMap,
    ) -> StoredResponse {
        if method != Method::GET {
            self.metrics.record_request(None);
            return self.passthrough(method, url, headers).await;
        }

        let class = self.classifier.classify(url, headers);
        let strategy = Strategy::for_class(class);
        self.metrics.record_request(Some(strategy));
        debug!(
            "Dispatching: url={}, class={:?}, strategy={:?}",
            url, class, strategy
        );

        match strategy {
            Strategy::CacheFirst => self.cache_first(url, headers).await,
            Strategy::NetworkFirst => self.network_first(url, headers, class).await,
            Strategy::NetworkWithTimeout => self.network_with_timeout(url, headers).await,
        }
    }

    /// Forward a non-GET request untouched
    async fn passthrough(&self, method: &Method, url: &str, headers: &HeaderMap) -> StoredResponse {
        let target = match fetch::resolve(&self.config.origin, url) {
            Ok(target) => target,
            Err(e) => {
                warn!("Cannot resolve {}: {}", url, e);
                self.metrics.record_synthesized_error();
                return StoredResponse::unavailable(SERVICE_UNAVAILABLE);
            }
        };
        match self.network.fetch(method, &target, headers).await {
            Ok(response) => {
                self.metrics.record_fetch(true);
                response
            }
            Err(e) => {
                self.metrics.record_fetch(false);
                self.metrics.record_synthesized_error();
                warn!("Passthrough fetch failed: {} {}: {}", method, url, e);
                StoredResponse::unavailable(SERVICE_UNAVAILABLE)
            }
        }
    }

    /// CacheFirst: static generation lookup, network only on miss
    ///
    /// Static assets are version-stamped, so a hit is always correct and
    /// the network is skipped entirely.
    async fn cache_first(&self, url: &str, headers: &HeaderMap) -> StoredResponse {
        let key = self.key_for(url);

        if let Some(generation) = self.open(&self.config.static_cache_name).await {
            match self.store.get(&generation, &key).await {
                Ok(Some(cached)) => {
                    self.metrics.record_cache_hit();
                    return cached;
                }
                Ok(None) => self.metrics.record_cache_miss(),
                Err(e) => {
                    self.metrics.record_cache_miss();
                    warn!("Cache lookup failed for {}: {}", key, e);
                }
            }

            match self.fetch_resolved(&Method::GET, url, headers).await {
                Ok(response) => {
                    self.metrics.record_fetch(true);
                    if response.is_success() {
                        self.store_best_effort(&generation, &key, &response).await;
                    }
                    response
                }
                Err(e) => {
                    self.metrics.record_fetch(false);
                    self.metrics.record_synthesized_error();
                    warn!("CacheFirst fetch failed for {}: {}", url, e);
                    StoredResponse::unavailable(STATIC_UNAVAILABLE)
                }
            }
        } else {
            self.metrics.record_synthesized_error();
            StoredResponse::unavailable(STATIC_UNAVAILABLE)
        }
    }

    /// NetworkFirst: prefer freshness, degrade to cached copies offline
    async fn network_first(
        &self,
        url: &str,
        headers: &HeaderMap,
        class: ResourceClass,
    ) -> StoredResponse {
        let key = self.key_for(url);

        match self.fetch_resolved(&Method::GET, url, headers).await {
            Ok(response) => {
                self.metrics.record_fetch(true);
                if response.is_success() {
                    if let Some(generation) = self.open(&self.config.dynamic_cache_name).await {
                        self.store_best_effort(&generation, &key, &response).await;
                    }
                }
                response
            }
            Err(e) => {
                self.metrics.record_fetch(false);
                debug!("NetworkFirst falling back to cache for {}: {}", url, e);

                if let Some(cached) = self.lookup_both_generations(&key).await {
                    self.metrics.record_cache_hit();
                    return cached;
                }
                self.metrics.record_cache_miss();

                // Documents degrade one step further, to the offline page
                if class == ResourceClass::Document {
                    let fallback_key =
                        request_key(&Method::GET, &self.config.offline_fallback);
                    if let Some(cached) = self.lookup_both_generations(&fallback_key).await {
                        debug!("Serving offline fallback document for {}", url);
                        self.metrics.record_cache_hit();
                        return cached;
                    }
                }

                self.metrics.record_synthesized_error();
                StoredResponse::unavailable(CONTENT_UNAVAILABLE)
            }
        }
    }

    /// NetworkWithTimeout: race the fetch against a fixed timer
    ///
    /// The fetch runs as its own task; when the timer wins, the in-flight
    /// fetch is discarded, not cancelled, and its eventual result is never
    /// observed. External API responses are never cached.
    async fn network_with_timeout(&self, url: &str, headers: &HeaderMap) -> StoredResponse {
        let target = match fetch::resolve(&self.config.origin, url) {
            Ok(target) => target,
            Err(e) => {
                warn!("Cannot resolve {}: {}", url, e);
                self.metrics.record_synthesized_error();
                return StoredResponse::unavailable(SERVICE_UNAVAILABLE);
            }
        };

        let network = self.network.clone();
        let headers = headers.clone();
        let fetch_url = target.clone();
        let mut fetch_task =
            tokio::spawn(async move { network.fetch(&Method::GET, &fetch_url, &headers).await });

        let timeout = Duration::from_millis(self.config.external_timeout_ms);
        tokio::select! {
            joined = &mut fetch_task => match joined {
                Ok(Ok(response)) => {
                    self.metrics.record_fetch(true);
                    response
                }
                Ok(Err(e)) => {
                    self.metrics.record_fetch(false);
                    self.metrics.record_synthesized_error();
                    warn!("External fetch failed for {}: {}", target, e);
                    StoredResponse::unavailable(SERVICE_UNAVAILABLE)
                }
                Err(e) => {
                    self.metrics.record_synthesized_error();
                    warn!("External fetch task failed for {}: {}", target, e);
                    StoredResponse::unavailable(SERVICE_UNAVAILABLE)
                }
            },
            _ = tokio::time::sleep(timeout) => {
                self.metrics.record_timeout();
                self.metrics.record_synthesized_error();
                debug!(
                    "External fetch for {} lost the race after {} ms, discarding",
                    target, self.config.external_timeout_ms
                );
                StoredResponse::unavailable(SERVICE_UNAVAILABLE)
            }
        }
    }

    fn key_for(&self, url: &str) -> String {
        request_key(
            &Method::GET,
            &fetch::canonical_url(&self.config.origin, url),
        )
    }

    async fn fetch_resolved(
        &self,
        method: &Method,
        url: &str,
        headers: &HeaderMap,
    ) -> Result<StoredResponse, OfflineError> {
        let target = fetch::resolve(&self.config.origin, url)?;
        self.network.fetch(method, &target, headers).await
    }

    async fn open(&self, name: &str) -> Option<Generation> {
        match self.store.open_generation(name).await {
            Ok(generation) => Some(generation),
            Err(e) => {
                warn!("Cannot open generation {}: {}", name, e);
                None
            }
        }
    }

    /// Look a key up in the dynamic generation, then the static one
    async fn lookup_both_generations(&self, key: &str) -> Option<StoredResponse> {
        for name in [
            self.config.dynamic_cache_name.as_str(),
            self.config.static_cache_name.as_str(),
        ] {
            let Some(generation) = self.open(name).await else {
                continue;
            };
            match self.store.get(&generation, key).await {
                Ok(Some(cached)) => return Some(cached),
                Ok(None) => {}
                Err(e) => warn!("Cache lookup failed in {} for {}: {}", name, key, e),
            }
        }
        None
    }

    /// Failing to cache a successful response never fails the request
    async fn store_best_effort(&self, generation: &Generation, key: &str, response: &StoredResponse) {
        if let Err(e) = self.store.put(generation, key, response.clone()).await {
            warn!("Failed to cache {} in {}: {}", key, generation.name(), e);
        }
    }
}
