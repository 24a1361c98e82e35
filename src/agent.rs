//! Root agent wiring all components together
//!
//! `OfflineAgent` owns the store, the network client, the strategy
//! engine, the lifecycle coordinator, and the control channel, and is the
//! object the host invokes from its event entry points (install,
//! activate, fetch, message).

use crate::config::OfflineConfig;
use crate::control::ControlChannel;
use crate::error::Result;
use crate::fetch::NetworkClient;
use crate::lifecycle::{LifecycleCoordinator, LifecycleState};
use crate::metrics::OfflineMetrics;
use crate::models::StoredResponse;
use crate::store::GenerationStore;
use crate::strategy::StrategyEngine;
use http::{HeaderMap, Method};
use std::sync::Arc;

/// The offline-support agent for one origin
pub struct OfflineAgent {
    config: Arc<OfflineConfig>,
    store: GenerationStore,
    metrics: Arc<OfflineMetrics>,
    engine: StrategyEngine,
    lifecycle: Arc<LifecycleCoordinator>,
    control: ControlChannel,
}

impl OfflineAgent {
    /// Create a new OfflineAgent
    ///
    /// # Example
    /// ```
    /// use offline_agent::{OfflineAgent, OfflineConfig};
    /// use std::sync::Arc;
    ///
    /// let agent = OfflineAgent::new(Arc::new(OfflineConfig::default()));
    /// ```
    pub fn new(config: Arc<OfflineConfig>) -> Self {
        let store = GenerationStore::new();
        let network = NetworkClient::new();
        let metrics = Arc::new(OfflineMetrics::new());

        let engine = StrategyEngine::new(
            Arc::clone(&config),
            store.clone(),
            network.clone(),
            Arc::clone(&metrics),
        );
        let lifecycle = Arc::new(LifecycleCoordinator::new(
            Arc::clone(&config),
            store.clone(),
            network,
        ));
        let control = ControlChannel::new(
            Arc::clone(&config),
            store.clone(),
            Arc::clone(&lifecycle),
        );

        OfflineAgent {
            config,
            store,
            metrics,
            engine,
            lifecycle,
            control,
        }
    }

    /// Host install entry point: pre-warm both generations
    pub async fn install(&self) -> Result<()> {
        self.lifecycle.install().await
    }

    /// Host activate entry point: evict stale generations, take control
    pub async fn activate(&self) -> Result<()> {
        self.lifecycle.activate().await
    }

    /// Host fetch entry point: run the caching strategy for one request
    ///
    /// Always resolves to a well-formed response.
    pub async fn handle_request(
        &self,
        method: &Method,
        url: &str,
        headers: &HeaderMap,
    ) -> StoredResponse {
        self.engine.handle(method, url, headers).await
    }

    /// Host message entry point
    pub fn control(&self) -> &ControlChannel {
        &self.control
    }

    /// Current lifecycle state
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &OfflineConfig {
        &self.config
    }

    /// Get a reference to the generation store
    pub fn store(&self) -> &GenerationStore {
        &self.store
    }

    /// Get a reference to the metrics collector
    pub fn metrics(&self) -> &OfflineMetrics {
        &self.metrics
    }

    /// Classify and dispatch helper exposed for inspection
    pub fn engine(&self) -> &StrategyEngine {
        &self.engine
    }
}
