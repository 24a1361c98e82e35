//! Configuration management for the offline agent

use crate::error::{OfflineError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for the offline agent
///
/// Every tunable the agent consults lives here; the struct is built once
/// at startup and shared as `Arc<OfflineConfig>`. There is no ambient
/// global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineConfig {
    /// Base URL the agent's own assets are fetched from
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Version-stamped name of the static generation (default: "storefront-static-v1")
    #[serde(default = "default_static_cache_name")]
    pub static_cache_name: String,

    /// Version-stamped name of the dynamic generation (default: "storefront-dynamic-v1")
    #[serde(default = "default_dynamic_cache_name")]
    pub dynamic_cache_name: String,

    /// Paths pre-cached into the static generation at install time
    #[serde(default = "default_static_assets")]
    pub static_assets: Vec<String>,

    /// Product image paths; the leading subset primes the dynamic generation
    #[serde(default)]
    pub product_images: Vec<String>,

    /// Branch image paths; the leading subset primes the dynamic generation
    #[serde(default)]
    pub branch_images: Vec<String>,

    /// Directory marker identifying product images by path
    #[serde(default = "default_product_image_marker")]
    pub product_image_marker: String,

    /// Directory marker identifying branch images by path
    #[serde(default = "default_branch_image_marker")]
    pub branch_image_marker: String,

    /// Allow-list of external third-party hosts (messaging, maps, analytics)
    #[serde(default)]
    pub external_api_hosts: Vec<String>,

    /// Timeout for external API fetches in milliseconds (default: 5000)
    #[serde(default = "default_external_timeout_ms")]
    pub external_timeout_ms: u64,

    /// Document served as the last-resort offline page (default: "/")
    #[serde(default = "default_offline_fallback")]
    pub offline_fallback: String,

    /// How many product images to prime at install time (default: 3)
    #[serde(default = "default_prime_product_count")]
    pub prime_product_count: usize,

    /// How many branch images to prime at install time (default: 2)
    #[serde(default = "default_prime_branch_count")]
    pub prime_branch_count: usize,
}

// Default value functions for serde
fn default_origin() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_static_cache_name() -> String {
    "storefront-static-v1".to_string()
}

fn default_dynamic_cache_name() -> String {
    "storefront-dynamic-v1".to_string()
}

fn default_static_assets() -> Vec<String> {
    vec![
        "/".to_string(),
        "/index.html".to_string(),
        "/css/styles.css".to_string(),
        "/js/app.js".to_string(),
    ]
}

fn default_product_image_marker() -> String {
    "/productos/".to_string()
}

fn default_branch_image_marker() -> String {
    "/sucursales/".to_string()
}

fn default_external_timeout_ms() -> u64 {
    5000
}

fn default_offline_fallback() -> String {
    "/".to_string()
}

fn default_prime_product_count() -> usize {
    3
}

fn default_prime_branch_count() -> usize {
    2
}

impl Default for OfflineConfig {
    fn default() -> Self {
        OfflineConfig {
            origin: default_origin(),
            static_cache_name: default_static_cache_name(),
            dynamic_cache_name: default_dynamic_cache_name(),
            static_assets: default_static_assets(),
            product_images: Vec::new(),
            branch_images: Vec::new(),
            product_image_marker: default_product_image_marker(),
            branch_image_marker: default_branch_image_marker(),
            external_api_hosts: Vec::new(),
            external_timeout_ms: default_external_timeout_ms(),
            offline_fallback: default_offline_fallback(),
            prime_product_count: default_prime_product_count(),
            prime_branch_count: default_prime_branch_count(),
        }
    }
}

impl OfflineConfig {
    /// Load configuration from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Returns
    /// * `Ok(OfflineConfig)` if loading and validation succeed
    /// * `Err(OfflineError)` if the file cannot be read or the config is invalid
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| OfflineError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: OfflineConfig = serde_yaml::from_str(&content)
            .map_err(|e| OfflineError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Validation Rules
    /// - origin must not be empty
    /// - generation names must be non-empty and distinct
    /// - external_timeout_ms must be > 0
    /// - the offline fallback must appear in the static-asset list so it
    ///   exists after a successful install
    pub fn validate(&self) -> Result<()> {
        if self.origin.is_empty() {
            return Err(OfflineError::ConfigError(
                "origin must not be empty".to_string(),
            ));
        }

        if self.static_cache_name.is_empty() || self.dynamic_cache_name.is_empty() {
            return Err(OfflineError::ConfigError(
                "generation names must not be empty".to_string(),
            ));
        }

        if self.static_cache_name == self.dynamic_cache_name {
            return Err(OfflineError::ConfigError(format!(
                "static and dynamic generations must have distinct names, both are '{}'",
                self.static_cache_name
            )));
        }

        if self.external_timeout_ms == 0 {
            return Err(OfflineError::ConfigError(
                "external_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if !self.static_assets.contains(&self.offline_fallback) {
            return Err(OfflineError::ConfigError(format!(
                "offline_fallback '{}' must appear in static_assets",
                self.offline_fallback
            )));
        }

        Ok(())
    }

    /// The product images selected for install-time priming
    pub fn priming_product_images(&self) -> &[String] {
        let n = self.prime_product_count.min(self.product_images.len());
        &self.product_images[..n]
    }

    /// The branch images selected for install-time priming
    pub fn priming_branch_images(&self) -> &[String] {
        let n = self.prime_branch_count.min(self.branch_images.len());
        &self.branch_images[..n]
    }
}
