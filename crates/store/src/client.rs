//! Store client abstraction
//!
//! This module defines the [`StoreClient`] trait the service layer is
//! written against, so a remote document store can be swapped for the
//! in-memory implementation without touching upper layers.
//!
//! Thread safety: all methods must be safe to call concurrently from
//! multiple threads (requires Send + Sync). Calls are blocking and are
//! never retried here; a backend failure propagates to the caller.

use runmeta_core::{AttrMap, AttrValue, Filter, Result, NAME_ATTR};

/// One item yielded by a query cursor
///
/// Exposes typed accessors over the attributes the query asked for, plus
/// the reserved `__name` key attribute (the item's name relative to the
/// query prefix).
#[derive(Debug, Clone)]
pub struct Item {
    attrs: AttrMap,
}

impl Item {
    /// Wrap an attribute map
    pub fn new(attrs: AttrMap) -> Self {
        Item { attrs }
    }

    /// String attribute by name
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(AttrValue::as_str)
    }

    /// Integer attribute by name
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.attrs.get(name).and_then(AttrValue::as_int)
    }

    /// Blob attribute by name
    pub fn get_blob(&self, name: &str) -> Option<&[u8]> {
        self.attrs.get(name).and_then(AttrValue::as_blob)
    }

    /// The reserved key attribute
    pub fn name(&self) -> Option<&str> {
        self.get_str(NAME_ATTR)
    }

    /// All attributes
    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }

    /// Consume the item, returning its attributes
    pub fn into_attrs(self) -> AttrMap {
        self.attrs
    }
}

/// Cursor over a query's matching items
///
/// The whole batch is pulled up front (bounded by whatever page size the
/// backend enforces internally); the cursor only hands the items out.
#[derive(Debug)]
pub struct ItemCursor {
    items: std::vec::IntoIter<Item>,
}

impl ItemCursor {
    /// Build a cursor over an already-fetched batch
    pub fn from_batch(items: Vec<Item>) -> Self {
        ItemCursor {
            items: items.into_iter(),
        }
    }

    /// Drain the cursor into a vector
    pub fn all(self) -> Vec<Item> {
        self.items.collect()
    }
}

impl Iterator for ItemCursor {
    type Item = Item;

    fn next(&mut self) -> Option<Item> {
        self.items.next()
    }
}

/// CRUD plus filtered-cursor query over a remote document store
///
/// Paths are hierarchical strings (`/run/{project}/{uid}`). Missing paths
/// fail with [`runmeta_core::Error::NotFound`]; every other backend
/// failure carries the backend's status code in
/// [`runmeta_core::Error::Backend`].
pub trait StoreClient: Send + Sync {
    /// Full object write
    ///
    /// # Errors
    ///
    /// Returns a backend error if the write fails.
    fn put_object(&self, path: &str, body: &[u8]) -> Result<()>;

    /// Full object read
    ///
    /// # Errors
    ///
    /// `NotFound` if the path does not exist.
    fn get_object(&self, path: &str) -> Result<Vec<u8>>;

    /// Delete an object
    ///
    /// # Errors
    ///
    /// `NotFound` if the path does not exist.
    fn delete_object(&self, path: &str) -> Result<()>;

    /// Attribute-level upsert merge at the backend
    ///
    /// Creates the item if absent; existing attributes not named in
    /// `attrs` are left in place.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the update fails.
    fn update_item(&self, path: &str, attrs: AttrMap) -> Result<()>;

    /// Read named attributes of one item
    ///
    /// # Errors
    ///
    /// `NotFound` if the path does not exist.
    fn get_item(&self, path: &str, attr_names: &[&str]) -> Result<Item>;

    /// Query items under a path prefix
    ///
    /// Yields the named attributes of every item matching `filter`, plus
    /// the reserved `__name` attribute.
    ///
    /// # Errors
    ///
    /// `NotFound` if the prefix itself does not exist (callers treat this
    /// as an empty result, not an error).
    fn query_items(&self, prefix: &str, attr_names: &[&str], filter: &Filter)
        -> Result<ItemCursor>;
}
