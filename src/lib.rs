//! Offline Agent
//!
//! A client-side offline-support agent for a retail storefront. The agent
//! intercepts requests from the page it serves and decides, per request,
//! whether to answer from a local cache generation, fetch from the
//! network, or do both with a fallback policy.
//!
//! # Overview
//!
//! Every intercepted GET request is classified into one of a fixed set of
//! resource classes (static asset, image, HTML document, external API,
//! other) and handled by the caching strategy assigned to that class:
//!
//! - **CacheFirst** (static assets): serve from the long-lived `static`
//!   generation, fetch only on miss. Static assets are version-stamped,
//!   so a hit is always correct.
//! - **NetworkFirst** (images, documents, everything else): prefer a
//!   fresh network response, cache it into the `dynamic` generation, and
//!   degrade to cached copies (down to the offline page for documents)
//!   when the network fails.
//! - **NetworkWithTimeout** (external APIs): race the fetch against a
//!   fixed timer so third parties can never block the page; losers are
//!   discarded and nothing is cached.
//!
//! Non-GET requests bypass caching entirely. Every failure path resolves
//! to a synthesized 503 with a short plain-text body.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use offline_agent::{OfflineAgent, OfflineConfig};
//! use http::{HeaderMap, Method};
//! use std::sync::Arc;
//!
//! # async fn run() -> offline_agent::Result<()> {
//! let config = OfflineConfig::from_file("offline_agent.yaml")?;
//! let agent = OfflineAgent::new(Arc::new(config));
//!
//! // Host lifecycle events
//! agent.install().await?;
//! agent.activate().await?;
//!
//! // Intercepted request
//! let response = agent
//!     .handle_request(&Method::GET, "/js/app.js", &HeaderMap::new())
//!     .await;
//! assert!(response.status.is_success() || response.status.as_u16() == 503);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`OfflineAgent`]: root object the host's event entry points invoke
//! - [`RequestClassifier`]: pure request-to-class mapping
//! - [`StrategyEngine`]: per-class caching strategies
//! - [`GenerationStore`]: named, versioned cache generations
//! - [`LifecycleCoordinator`]: install-time pre-warming and stale-generation eviction
//! - [`ControlChannel`]: out-of-band page commands (version query, cache clear, skip-wait)
//! - [`OfflineMetrics`]: runtime counters
//!
//! # Configuration
//!
//! Configuration is loaded from a YAML file:
//!
//! ```yaml
//! origin: "https://storefront.example"
//! static_cache_name: "storefront-static-v1"
//! dynamic_cache_name: "storefront-dynamic-v1"
//! static_assets:
//!   - "/"
//!   - "/index.html"
//!   - "/css/styles.css"
//!   - "/js/app.js"
//! external_api_hosts:
//!   - "wa.me"
//!   - "maps.googleapis.com"
//! external_timeout_ms: 5000
//! ```
//!
//! See [`OfflineConfig`] for all options and their defaults.

pub mod agent;
pub mod classifier;
pub mod config;
pub mod control;
pub mod error;
pub mod fetch;
pub mod lifecycle;
pub mod metrics;
pub mod models;
pub mod notification;
pub mod store;
pub mod strategy;

// Re-export commonly used types
pub use agent::OfflineAgent;
pub use classifier::RequestClassifier;
pub use config::OfflineConfig;
pub use control::{ControlChannel, ControlMessage, ControlReply};
pub use error::{OfflineError, Result};
pub use fetch::NetworkClient;
pub use lifecycle::{LifecycleCoordinator, LifecycleState};
pub use metrics::{MetricsSnapshot, OfflineMetrics};
pub use models::{request_key, ResourceClass, StoredResponse, Strategy};
pub use notification::{NotificationDisplay, NotificationPayload};
pub use store::{Generation, GenerationStore, StoreStats};
pub use strategy::StrategyEngine;
