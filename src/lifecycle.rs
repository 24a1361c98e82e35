//! Generation lifecycle: installation, activation, eviction
//!
//! The coordinator walks the `Installing -> Waiting -> Activating ->
//! Active` state machine. Installation pre-warms both generations;
//! activation evicts every generation whose name no longer matches the
//! current version stamps and takes control immediately.

use crate::config::OfflineConfig;
use crate::error::{OfflineError, Result};
use crate::fetch::{self, NetworkClient};
use crate::models::{request_key, StoredResponse};
use crate::store::{Generation, GenerationStore};
use futures::future::{join_all, try_join_all};
use http::{HeaderMap, Method};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Lifecycle states of the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Installing,
    Waiting,
    Activating,
    Active,
}

/// Coordinates generation creation, pre-warming, and stale eviction
pub struct LifecycleCoordinator {
    config: Arc<OfflineConfig>,
    store: GenerationStore,
    network: NetworkClient,
    state: RwLock<LifecycleState>,
}

impl LifecycleCoordinator {
    /// Create a new LifecycleCoordinator
    pub fn new(config: Arc<OfflineConfig>, store: GenerationStore, network: NetworkClient) -> Self {
        LifecycleCoordinator {
            config,
            store,
            network,
            state: RwLock::new(LifecycleState::Installing),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.state
            .read()
            .map(|s| *s)
            .unwrap_or(LifecycleState::Installing)
    }

    fn set_state(&self, state: LifecycleState) {
        if let Ok(mut current) = self.state.write() {
            debug!("Lifecycle transition: {:?} -> {:?}", *current, state);
            *current = state;
        }
    }

    /// Install: pre-warm both generations
    ///
    /// Bulk-populates the static generation from the configured asset
    /// list (all-or-nothing: every asset is fetched before anything is
    /// committed, and a single failure aborts the step with nothing
    /// retained) while concurrently priming the dynamic generation with
    /// the leading product and branch images (best-effort, failures are
    /// logged and non-fatal). A successful install requests immediate
    /// activation instead of waiting for old instances to finish.
    pub async fn install(&self) -> Result<()> {
        self.set_state(LifecycleState::Installing);
        info!(
            "Installing: populating {} and priming {}",
            self.config.static_cache_name, self.config.dynamic_cache_name
        );

        let (population, _) = tokio::join!(self.populate_static(), self.prime_dynamic());

        match population {
            Ok(count) => {
                info!("Static population complete: {} assets cached", count);
                self.set_state(LifecycleState::Waiting);
                // Skip the normal hand-off; the host activates right away
                self.skip_waiting();
                Ok(())
            }
            Err(e) => {
                warn!("Installation aborted: {}", e);
                Err(e)
            }
        }
    }

    /// Fetch the full static-asset list, then commit it in one pass
    async fn populate_static(&self) -> Result<usize> {
        let generation = self
            .store
            .open_generation(&self.config.static_cache_name)
            .await?;

        let fetches = self
            .config
            .static_assets
            .iter()
            .map(|asset| self.fetch_asset(asset));
        let responses = try_join_all(fetches)
            .await
            .map_err(|e| OfflineError::PopulationFailure(e.to_string()))?;

        for (asset, response) in self.config.static_assets.iter().zip(responses) {
            let key = request_key(&Method::GET, asset);
            self.store
                .put(&generation, &key, response)
                .await
                .map_err(|e| OfflineError::PopulationFailure(e.to_string()))?;
        }

        Ok(self.config.static_assets.len())
    }

    /// Prime the dynamic generation; each image is its own attempt
    async fn prime_dynamic(&self) {
        let generation = match self
            .store
            .open_generation(&self.config.dynamic_cache_name)
            .await
        {
            Ok(generation) => generation,
            Err(e) => {
                warn!("Cannot open dynamic generation for priming: {}", e);
                return;
            }
        };

        let images: Vec<&String> = self
            .config
            .priming_product_images()
            .iter()
            .chain(self.config.priming_branch_images().iter())
            .collect();

        let results =
            join_all(images.iter().map(|image| self.prime_one(&generation, image.as_str()))).await;
        let primed = results.iter().filter(|ok| **ok).count();
        info!("Dynamic priming complete: {}/{} images", primed, images.len());
    }

    async fn prime_one(&self, generation: &Generation, image: &str) -> bool {
        match self.fetch_asset(image).await {
            Ok(response) => {
                let key = request_key(&Method::GET, image);
                match self.store.put(generation, &key, response).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Priming store failed for {}: {}", image, e);
                        false
                    }
                }
            }
            Err(e) => {
                warn!("Priming fetch failed for {}: {}", image, e);
                false
            }
        }
    }

    /// Fetch one configured asset; non-2xx counts as a failed fetch
    async fn fetch_asset(&self, asset: &str) -> Result<StoredResponse> {
        let target = fetch::resolve(&self.config.origin, asset)?;
        let response = self
            .network
            .fetch(&Method::GET, &target, &HeaderMap::new())
            .await?;
        if !response.is_success() {
            return Err(OfflineError::NetworkFailure(format!(
                "{} returned status {}",
                asset, response.status
            )));
        }
        Ok(response)
    }

    /// Force the transition out of the waiting state
    pub fn skip_waiting(&self) {
        if self.state() == LifecycleState::Waiting {
            self.set_state(LifecycleState::Activating);
        }
    }

    /// Activate: evict stale generations and take control immediately
    ///
    /// Deletes every generation whose name matches neither current stamp.
    /// Idempotent: a second activation deletes nothing further.
    pub async fn activate(&self) -> Result<()> {
        self.set_state(LifecycleState::Activating);

        let current = [
            self.config.static_cache_name.as_str(),
            self.config.dynamic_cache_name.as_str(),
        ];

        let names = self.store.list_generation_names().await?;
        for name in names {
            if !current.contains(&name.as_str()) {
                info!("Evicting stale generation: {}", name);
                self.store.delete_generation(&name).await?;
            }
        }

        // Claim all open client contexts without waiting for a reload
        self.set_state(LifecycleState::Active);
        info!("Activation complete, agent is in control");
        Ok(())
    }
}
