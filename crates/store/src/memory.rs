//! In-memory store backend
//!
//! Implements [`StoreClient`] over a `parking_lot::RwLock<BTreeMap>`,
//! mirroring the remote backend's semantics closely enough for tests and
//! embedded use: attribute upserts merge, reads of missing paths fail
//! `NotFound`, and a query whose prefix has no stored keys at all fails
//! `NotFound` rather than returning an empty batch.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::debug;

use runmeta_core::{AttrMap, AttrValue, Error, Filter, Result, DATA_ATTR, NAME_ATTR};

use crate::client::{Item, ItemCursor, StoreClient};

/// Thread-safe in-memory document store
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<BTreeMap<String, AttrMap>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Number of stored items (test helper)
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl StoreClient for MemoryStore {
    fn put_object(&self, path: &str, body: &[u8]) -> Result<()> {
        let mut attrs = AttrMap::new();
        attrs.insert(DATA_ATTR.to_string(), AttrValue::Blob(body.to_vec()));
        self.items.write().insert(path.to_string(), attrs);
        Ok(())
    }

    fn get_object(&self, path: &str) -> Result<Vec<u8>> {
        let items = self.items.read();
        items
            .get(path)
            .and_then(|attrs| attrs.get(DATA_ATTR))
            .and_then(AttrValue::as_blob)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    fn delete_object(&self, path: &str) -> Result<()> {
        match self.items.write().remove(path) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(path.to_string())),
        }
    }

    fn update_item(&self, path: &str, attrs: AttrMap) -> Result<()> {
        let mut items = self.items.write();
        let entry = items.entry(path.to_string()).or_default();
        for (name, value) in attrs {
            entry.insert(name, value);
        }
        Ok(())
    }

    fn get_item(&self, path: &str, attr_names: &[&str]) -> Result<Item> {
        let items = self.items.read();
        let stored = items
            .get(path)
            .ok_or_else(|| Error::NotFound(path.to_string()))?;
        let mut attrs = AttrMap::new();
        for name in attr_names {
            if let Some(value) = stored.get(*name) {
                attrs.insert((*name).to_string(), value.clone());
            }
        }
        Ok(Item::new(attrs))
    }

    fn query_items(
        &self,
        prefix: &str,
        attr_names: &[&str],
        filter: &Filter,
    ) -> Result<ItemCursor> {
        let items = self.items.read();
        let mut batch = Vec::new();
        let mut prefix_seen = false;
        for (path, stored) in items.range(prefix.to_string()..) {
            if !path.starts_with(prefix) {
                break;
            }
            prefix_seen = true;
            let relative = &path[prefix.len()..];

            // Filters see the full stored attribute set plus __name.
            let mut candidate = stored.clone();
            candidate.insert(NAME_ATTR.to_string(), AttrValue::Str(relative.to_string()));
            if !filter.matches(&candidate) {
                continue;
            }

            let mut attrs = AttrMap::new();
            for name in attr_names {
                if let Some(value) = candidate.get(*name) {
                    attrs.insert((*name).to_string(), value.clone());
                }
            }
            attrs.insert(NAME_ATTR.to_string(), AttrValue::Str(relative.to_string()));
            batch.push(Item::new(attrs));
        }
        if !prefix_seen {
            return Err(Error::NotFound(prefix.to_string()));
        }
        debug!(prefix, matched = batch.len(), "query");
        Ok(ItemCursor::from_batch(batch))
    }
}
