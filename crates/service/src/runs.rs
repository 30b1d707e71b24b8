//! Run storage operations
//!
//! Each operation takes the store client at construction time and runs as
//! one read-or-write against it. Multi-step sequences (read old, merge,
//! write new) have no compare-and-swap: a concurrent update of the same
//! path between the read and the write is silently lost, last writer
//! wins. Callers needing strict consistency must serialize updates per
//! path themselves.

use std::sync::Arc;

use tracing::{debug, warn};

use runmeta_core::envelope::LAST_UPDATE_EPOCH_ATTR;
use runmeta_core::{
    document, merge, path, EncodeAttrs, Error, Result, RunEnvelope, AttrValue, DATA_ATTR,
    NAME_ATTR,
};
use runmeta_store::StoreClient;

use crate::listing::{render_document, render_listing, sort_and_truncate};
use crate::query::RunQuery;

/// Run CRUD and listing over a store client
pub struct RunService {
    store: Arc<dyn StoreClient>,
}

impl RunService {
    /// Build a service over the given store client
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        RunService { store }
    }

    /// Store (create or fully replace) a run document
    ///
    /// The blob is stored verbatim under the data attribute; index
    /// attributes are derived from the document's own metadata section
    /// and written alongside in the same upsert.
    pub fn store(&self, project: &str, uid: &str, body: &[u8]) -> Result<()> {
        debug!(project, uid, "store run");
        let json = document::to_json(body)?;
        let envelope: RunEnvelope = serde_json::from_slice(&json)
            .map_err(|e| Error::Format(format!("run document: {e}")))?;
        let mut attrs = envelope.attrs();
        attrs.insert(DATA_ATTR.to_string(), AttrValue::Blob(body.to_vec()));
        self.store.update_item(&path::run(project, uid), attrs)
    }

    /// Apply a dot-path merge patch onto a stored run
    ///
    /// The old blob is read, merged with the patch in JSON space and
    /// written back in its original encoding. Index attributes are
    /// recomputed from the fully merged document so they never drift
    /// from the stored blob.
    pub fn update(&self, project: &str, uid: &str, patch_body: &[u8]) -> Result<()> {
        debug!(project, uid, "update run");
        let patch_json = document::to_json(patch_body)?;
        let run_path = path::run(project, uid);

        let item = self.store.get_item(&run_path, &[DATA_ATTR])?;
        let old_blob = item
            .get_blob(DATA_ATTR)
            .ok_or_else(|| Error::NotFound(run_path.clone()))?;
        let format = document::detect(old_blob);
        let old_json = document::to_json(old_blob)?;

        let merged = merge::merge_documents(&old_json, &patch_json)?;
        let envelope: RunEnvelope = serde_json::from_slice(&merged)
            .map_err(|e| Error::Format(format!("merged run document: {e}")))?;
        let mut attrs = envelope.attrs();
        attrs.insert(
            DATA_ATTR.to_string(),
            AttrValue::Blob(document::from_json(&merged, format)?),
        );
        self.store.update_item(&run_path, attrs)
    }

    /// Read a run document, wrapped as `{"data": <blob>}`
    pub fn read(&self, project: &str, uid: &str) -> Result<Vec<u8>> {
        let run_path = path::run(project, uid);
        let item = self.store.get_item(&run_path, &[DATA_ATTR])?;
        let blob = item
            .get_blob(DATA_ATTR)
            .ok_or_else(|| Error::NotFound(run_path))?;
        Ok(render_document(blob))
    }

    /// Delete a single run
    pub fn delete(&self, project: &str, uid: &str) -> Result<()> {
        debug!(project, uid, "delete run");
        self.store.delete_object(&path::run(project, uid))
    }

    /// List runs matching a query, as `{"runs": [...]}`
    ///
    /// A project with no stored runs at all is an empty listing, not an
    /// error.
    pub fn list(&self, query: &RunQuery) -> Result<Vec<u8>> {
        let filter = query.filter();
        let cursor = self.store.query_items(
            &path::runs_prefix(&query.project),
            &[NAME_ATTR, DATA_ATTR, LAST_UPDATE_EPOCH_ATTR],
            &filter,
        );
        match cursor {
            Err(err) if err.is_not_found() => Ok(render_listing("runs", &[])),
            Err(err) => Err(err),
            Ok(cursor) => {
                let blobs = sort_and_truncate(cursor.all(), query.sort, query.limit);
                Ok(render_listing("runs", &blobs))
            }
        }
    }

    /// Delete every run matching a query
    ///
    /// Items are deleted independently; earlier successes are not rolled
    /// back. Returns the number deleted, or an aggregate error naming how
    /// many of the matched items failed.
    pub fn delete_matching(&self, query: &RunQuery) -> Result<usize> {
        let filter = query.filter();
        let cursor = self.store.query_items(
            &path::runs_prefix(&query.project),
            &[NAME_ATTR],
            &filter,
        );
        let items = match cursor {
            Err(err) if err.is_not_found() => return Ok(0),
            Err(err) => return Err(err),
            Ok(cursor) => cursor.all(),
        };

        let total = items.len();
        let mut failed = 0usize;
        let mut first_error = None;
        for item in items {
            let Some(name) = item.name() else { continue };
            debug!(project = query.project.as_str(), name, "delete run");
            if let Err(err) = self.store.delete_object(&path::run(&query.project, name)) {
                warn!(name, %err, "run deletion failed");
                failed += 1;
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            None => Ok(total),
            Some(first) => Err(Error::BatchDelete {
                total,
                failed,
                first: Box::new(first),
            }),
        }
    }
}
