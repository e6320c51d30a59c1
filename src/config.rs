//! Configuration Module
//!
//! Handles loading and managing configuration from environment variables.

use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use tracing::warn;

use crate::cache::{DEFAULT_MAX_SIZE, DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL};
use crate::portal::Namespace;

/// Sizing of one cache store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// TTL for entries set without an explicit one
    pub default_ttl: Duration,
    /// Maximum number of entries
    pub max_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Interval between background expiration sweeps
    pub sweep_interval: Duration,
    /// Share one backend fetch between concurrent misses on a key
    pub dedupe_in_flight: bool,
    /// Store sizing for namespaces without an override
    pub default_store: StoreConfig,
    /// Per-namespace overrides
    pub stores: BTreeMap<Namespace, StoreConfig>,
    /// Base URL of the backend REST endpoint
    pub backend_url: Option<String>,
    /// API key sent to the backend
    pub backend_api_key: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_DEFAULT_TTL_MS` - Default entry TTL in milliseconds (default: 300000)
    /// - `CACHE_MAX_SIZE` - Default store capacity (default: 100)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Sweep frequency in seconds (default: 300)
    /// - `CACHE_DEDUPE_IN_FLIGHT` - `true`/`false` (default: true)
    /// - `<NAMESPACE>_CACHE_TTL_MS`, `<NAMESPACE>_CACHE_MAX_SIZE` - per-store
    ///   overrides, e.g. `CLIENT_VIDEOS_CACHE_TTL_MS`
    /// - `BACKEND_URL`, `BACKEND_API_KEY` - backend REST endpoint
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parse = |name: &str| lookup(name).and_then(|v| v.trim().parse::<u64>().ok());

        let default_store = StoreConfig {
            default_ttl: parse("CACHE_DEFAULT_TTL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.default_store.default_ttl),
            max_size: parse("CACHE_MAX_SIZE")
                .map(|v| v as usize)
                .unwrap_or(defaults.default_store.max_size),
        };

        let mut stores = BTreeMap::new();
        for namespace in Namespace::ALL {
            let prefix = namespace.env_prefix();
            let ttl = parse(&format!("{prefix}_CACHE_TTL_MS"));
            let max_size = parse(&format!("{prefix}_CACHE_MAX_SIZE"));
            if ttl.is_some() || max_size.is_some() {
                stores.insert(
                    namespace,
                    StoreConfig {
                        default_ttl: ttl
                            .map(Duration::from_millis)
                            .unwrap_or(default_store.default_ttl),
                        max_size: max_size.map(|v| v as usize).unwrap_or(default_store.max_size),
                    },
                );
            }
        }

        let dedupe_in_flight = match lookup("CACHE_DEDUPE_IN_FLIGHT") {
            Some(value) => parse_bool(&value).unwrap_or_else(|| {
                warn!(value = %value, "Ignoring invalid CACHE_DEDUPE_IN_FLIGHT");
                defaults.dedupe_in_flight
            }),
            None => defaults.dedupe_in_flight,
        };

        Self {
            server_port: lookup("SERVER_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.server_port),
            sweep_interval: parse("CACHE_SWEEP_INTERVAL_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            dedupe_in_flight,
            default_store,
            stores,
            backend_url: lookup("BACKEND_URL").filter(|v| !v.trim().is_empty()),
            backend_api_key: lookup("BACKEND_API_KEY").filter(|v| !v.trim().is_empty()),
        }
    }

    /// Sizing for `namespace`, falling back to the default store config.
    pub fn store(&self, namespace: Namespace) -> StoreConfig {
        self.stores
            .get(&namespace)
            .copied()
            .unwrap_or(self.default_store)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            dedupe_in_flight: true,
            default_store: StoreConfig::default(),
            stores: BTreeMap::new(),
            backend_url: None,
            backend_api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.sweep_interval, Duration::from_secs(300));
        assert!(config.dedupe_in_flight);
        assert_eq!(config.default_store.default_ttl, Duration::from_secs(300));
        assert_eq!(config.default_store.max_size, 100);
    }

    #[test]
    fn test_config_from_empty_lookup_matches_default() {
        let config = config_from(&[]);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.store(Namespace::ClientVideos), StoreConfig::default());
        assert!(config.backend_url.is_none());
    }

    #[test]
    fn test_config_reads_values() {
        let config = config_from(&[
            ("SERVER_PORT", "8080"),
            ("CACHE_DEFAULT_TTL_MS", "1000"),
            ("CACHE_MAX_SIZE", "25"),
            ("CACHE_SWEEP_INTERVAL_SECS", "60"),
            ("CACHE_DEDUPE_IN_FLIGHT", "off"),
            ("BACKEND_URL", "https://project.example.co"),
            ("BACKEND_API_KEY", "anon"),
        ]);

        assert_eq!(config.server_port, 8080);
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert!(!config.dedupe_in_flight);
        assert_eq!(
            config.store(Namespace::VideoHistory),
            StoreConfig {
                default_ttl: Duration::from_millis(1000),
                max_size: 25,
            }
        );
        assert_eq!(config.backend_url.as_deref(), Some("https://project.example.co"));
        assert_eq!(config.backend_api_key.as_deref(), Some("anon"));
    }

    #[test]
    fn test_namespace_override_inherits_unset_fields() {
        let config = config_from(&[
            ("CACHE_MAX_SIZE", "50"),
            ("CLIENT_ADS_CACHE_TTL_MS", "2000"),
        ]);

        let ads = config.store(Namespace::ClientAds);
        assert_eq!(ads.default_ttl, Duration::from_millis(2000));
        assert_eq!(ads.max_size, 50);

        let videos = config.store(Namespace::ClientVideos);
        assert_eq!(videos.default_ttl, Duration::from_secs(300));
        assert_eq!(videos.max_size, 50);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("SERVER_PORT", "not-a-port"),
            ("CACHE_SWEEP_INTERVAL_SECS", "0"),
            ("CACHE_DEDUPE_IN_FLIGHT", "maybe"),
        ]);

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.sweep_interval, Duration::from_secs(300));
        assert!(config.dedupe_in_flight);
    }
}
