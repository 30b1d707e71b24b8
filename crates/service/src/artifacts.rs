//! Artifact storage operations
//!
//! Every artifact version is written twice: once under its producing run's
//! uid and once under its tag (default `latest`), giving two independent
//! access paths to the same logical version. Point reads and deletes
//! address the tag path; listings filter tag pointer records by suffix of
//! the backend key attribute.

use std::sync::Arc;

use tracing::{debug, warn};

use runmeta_core::envelope::ARTIFACT_NAME_ATTR;
use runmeta_core::path::DEFAULT_ARTIFACT_TAG;
use runmeta_core::{
    document, path, ArtifactEnvelope, AttrValue, EncodeAttrs, Error, Result, DATA_ATTR, NAME_ATTR,
};
use runmeta_store::StoreClient;

use crate::listing::{render_document, render_listing, sort_and_truncate};
use crate::query::ArtifactQuery;

/// Artifact CRUD and listing over a store client
pub struct ArtifactService {
    store: Arc<dyn StoreClient>,
}

impl ArtifactService {
    /// Build a service over the given store client
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        ArtifactService { store }
    }

    /// Store an artifact version under both its uid and its tag
    ///
    /// The artifact key is always written as the `name` attribute so
    /// name filters work even for documents that omit their own key.
    pub fn store(
        &self,
        project: &str,
        uid: &str,
        key: &str,
        tag: Option<&str>,
        body: &[u8],
    ) -> Result<()> {
        let tag = tag.unwrap_or(DEFAULT_ARTIFACT_TAG);
        debug!(project, uid, key, tag, "store artifact");

        let json = document::to_json(body)?;
        let envelope: ArtifactEnvelope = serde_json::from_slice(&json)
            .map_err(|e| Error::Format(format!("artifact document: {e}")))?;
        let mut attrs = envelope.attrs();
        attrs.insert(
            ARTIFACT_NAME_ATTR.to_string(),
            AttrValue::Str(key.to_string()),
        );
        attrs.insert(DATA_ATTR.to_string(), AttrValue::Blob(body.to_vec()));

        self.store
            .update_item(&path::artifact(project, key, uid), attrs.clone())?;
        self.store
            .update_item(&path::artifact(project, key, tag), attrs)
    }

    /// Read an artifact by tag, wrapped as `{"data": <blob>}`
    pub fn read(&self, project: &str, key: &str, tag: Option<&str>) -> Result<Vec<u8>> {
        let tag = tag.unwrap_or(DEFAULT_ARTIFACT_TAG);
        let artifact_path = path::artifact(project, key, tag);
        let item = self.store.get_item(&artifact_path, &[DATA_ATTR])?;
        let blob = item
            .get_blob(DATA_ATTR)
            .ok_or_else(|| Error::NotFound(artifact_path))?;
        Ok(render_document(blob))
    }

    /// Delete an artifact's tag record
    pub fn delete(&self, project: &str, key: &str, tag: Option<&str>) -> Result<()> {
        let tag = tag.unwrap_or(DEFAULT_ARTIFACT_TAG);
        debug!(project, key, tag, "delete artifact");
        self.store.delete_object(&path::artifact(project, key, tag))
    }

    /// List artifacts matching a query, as `{"artifacts": [...]}`
    ///
    /// A project with no stored artifacts is an empty listing, not an
    /// error. Artifact listings are not sorted or truncated.
    pub fn list(&self, query: &ArtifactQuery) -> Result<Vec<u8>> {
        let filter = query.filter();
        let cursor = self.store.query_items(
            &path::artifacts_prefix(&query.project),
            &[NAME_ATTR, DATA_ATTR],
            &filter,
        );
        match cursor {
            Err(err) if err.is_not_found() => Ok(render_listing("artifacts", &[])),
            Err(err) => Err(err),
            Ok(cursor) => {
                let blobs = sort_and_truncate(cursor.all(), false, 0);
                Ok(render_listing("artifacts", &blobs))
            }
        }
    }

    /// Delete every artifact record matching a query
    ///
    /// Same independent-deletion semantics as run batch deletion: no
    /// rollback, aggregate error naming the failure count.
    pub fn delete_matching(&self, query: &ArtifactQuery) -> Result<usize> {
        let filter = query.filter();
        let cursor = self.store.query_items(
            &path::artifacts_prefix(&query.project),
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
            debug!(project = query.project.as_str(), name, "delete artifact");
            let artifact_path = format!("{}{name}", path::artifacts_prefix(&query.project));
            if let Err(err) = self.store.delete_object(&artifact_path) {
                warn!(name, %err, "artifact deletion failed");
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
