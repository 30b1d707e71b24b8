//! Store connection configuration
//!
//! Connection and session management belong to the concrete backend
//! client; this only carries the values a client needs to be built with.

use std::env;

/// Connection settings for a remote store backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Backend endpoint URL
    pub endpoint: String,
    /// Data container name
    pub container: String,
    /// Access key for the backend session
    pub access_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            endpoint: "http://localhost:8081".to_string(),
            container: "runmeta".to_string(),
            access_key: String::new(),
        }
    }
}

impl StoreConfig {
    /// Build from environment, falling back to defaults per field
    ///
    /// Reads `RUNMETA_STORE_ENDPOINT`, `RUNMETA_STORE_CONTAINER` and
    /// `RUNMETA_STORE_ACCESS_KEY`.
    pub fn from_env() -> Self {
        let mut cfg = StoreConfig::default();
        if let Ok(endpoint) = env::var("RUNMETA_STORE_ENDPOINT") {
            cfg.endpoint = endpoint;
        }
        if let Ok(container) = env::var("RUNMETA_STORE_CONTAINER") {
            cfg.container = container;
        }
        if let Ok(access_key) = env::var("RUNMETA_STORE_ACCESS_KEY") {
            cfg.access_key = access_key;
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = StoreConfig::default();
        assert_eq!(cfg.container, "runmeta");
        assert!(cfg.access_key.is_empty());
    }
}
