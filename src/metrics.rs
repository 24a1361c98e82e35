//! Metrics collection for the offline agent
//!
//! Thread-safe counters using atomic operations.

use crate::models::Strategy;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for the offline agent
#[derive(Debug, Default)]
pub struct OfflineMetrics {
    // Request statistics
    total_requests: AtomicU64,
    passthrough_requests: AtomicU64,

    // Strategy dispatch
    cache_first_requests: AtomicU64,
    network_first_requests: AtomicU64,
    network_with_timeout_requests: AtomicU64,

    // Cache statistics
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,

    // Network statistics
    network_fetches: AtomicU64,
    failed_fetches: AtomicU64,
    timeouts: AtomicU64,

    // Failure responses handed to the requester
    synthesized_errors: AtomicU64,
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub passthrough_requests: u64,
    pub cache_first_requests: u64,
    pub network_first_requests: u64,
    pub network_with_timeout_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub network_fetches: u64,
    pub failed_fetches: u64,
    pub timeouts: u64,
    pub synthesized_errors: u64,
}

impl OfflineMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an intercepted request
    ///
    /// # Arguments
    /// * `strategy` - the strategy selected, or `None` for a non-GET passthrough
    pub fn record_request(&self, strategy: Option<Strategy>) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        match strategy {
            None => {
                self.passthrough_requests.fetch_add(1, Ordering::Relaxed);
            }
            Some(Strategy::CacheFirst) => {
                self.cache_first_requests.fetch_add(1, Ordering::Relaxed);
            }
            Some(Strategy::NetworkFirst) => {
                self.network_first_requests.fetch_add(1, Ordering::Relaxed);
            }
            Some(Strategy::NetworkWithTimeout) => {
                self.network_with_timeout_requests
                    .fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Record a cache hit
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a network fetch attempt
    ///
    /// # Arguments
    /// * `success` - whether the fetch settled without a transport failure
    pub fn record_fetch(&self, success: bool) {
        self.network_fetches.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.failed_fetches.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record an external-API race lost to the timer
    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a synthesized 503 handed to the requester
    pub fn record_synthesized_error(&self) {
        self.synthesized_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a consistent snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            passthrough_requests: self.passthrough_requests.load(Ordering::Relaxed),
            cache_first_requests: self.cache_first_requests.load(Ordering::Relaxed),
            network_first_requests: self.network_first_requests.load(Ordering::Relaxed),
            network_with_timeout_requests: self
                .network_with_timeout_requests
                .load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            network_fetches: self.network_fetches.load(Ordering::Relaxed),
            failed_fetches: self.failed_fetches.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            synthesized_errors: self.synthesized_errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_requests_by_strategy() {
        let metrics = OfflineMetrics::new();
        metrics.record_request(Some(Strategy::CacheFirst));
        metrics.record_request(Some(Strategy::NetworkFirst));
        metrics.record_request(Some(Strategy::NetworkWithTimeout));
        metrics.record_request(None);

        let snap = metrics.snapshot();
        assert_eq!(snap.total_requests, 4);
        assert_eq!(snap.cache_first_requests, 1);
        assert_eq!(snap.network_first_requests, 1);
        assert_eq!(snap.network_with_timeout_requests, 1);
        assert_eq!(snap.passthrough_requests, 1);
    }

    #[test]
    fn test_record_cache_and_network() {
        let metrics = OfflineMetrics::new();
        metrics.record_cache_hit();
        metrics.record_cache_miss();
        metrics.record_fetch(true);
        metrics.record_fetch(false);
        metrics.record_timeout();
        metrics.record_synthesized_error();

        let snap = metrics.snapshot();
        assert_eq!(snap.cache_hits, 1);
        assert_eq!(snap.cache_misses, 1);
        assert_eq!(snap.network_fetches, 2);
        assert_eq!(snap.failed_fetches, 1);
        assert_eq!(snap.timeouts, 1);
        assert_eq!(snap.synthesized_errors, 1);
    }
}
