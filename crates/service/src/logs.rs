//! Run log blobs
//!
//! Logs are opaque byte blobs stored verbatim under a flat per-run path;
//! no attributes are derived and no queries run against them.

use std::sync::Arc;

use tracing::debug;

use runmeta_core::{path, Result};
use runmeta_store::StoreClient;

/// Raw log storage over a store client
pub struct LogService {
    store: Arc<dyn StoreClient>,
}

impl LogService {
    /// Build a service over the given store client
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        LogService { store }
    }

    /// Store (replace) a run's log blob
    pub fn store(&self, project: &str, uid: &str, body: &[u8]) -> Result<()> {
        debug!(project, uid, bytes = body.len(), "store log");
        self.store.put_object(&path::log(project, uid), body)
    }

    /// Fetch a run's log blob
    pub fn fetch(&self, project: &str, uid: &str) -> Result<Vec<u8>> {
        self.store.get_object(&path::log(project, uid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runmeta_store::MemoryStore;

    #[test]
    fn test_log_round_trip() {
        let svc = LogService::new(Arc::new(MemoryStore::new()));
        svc.store("iris", "u1", b"epoch 1: loss 0.5\n").unwrap();
        assert_eq!(svc.fetch("iris", "u1").unwrap(), b"epoch 1: loss 0.5\n");
    }

    #[test]
    fn test_missing_log_is_not_found() {
        let svc = LogService::new(Arc::new(MemoryStore::new()));
        assert!(svc.fetch("iris", "u1").unwrap_err().is_not_found());
    }

    #[test]
    fn test_store_replaces_log() {
        let svc = LogService::new(Arc::new(MemoryStore::new()));
        svc.store("iris", "u1", b"first").unwrap();
        svc.store("iris", "u1", b"second").unwrap();
        assert_eq!(svc.fetch("iris", "u1").unwrap(), b"second");
    }
}
