//! runmeta - metadata store core for ML execution runs and artifacts
//!
//! runmeta stores structured run/artifact documents in an external
//! document/key-value backend, derives indexable attributes from each
//! document's own metadata section, and answers filtered, sorted listing
//! queries against them. Partial updates apply dot-path merge patches
//! onto the stored blob while preserving its original encoding.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use runmeta::{MemoryStore, RunQuery, RunService};
//!
//! # fn main() -> runmeta::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let runs = RunService::new(store);
//!
//! runs.store(
//!     "iris",
//!     "uid-1",
//!     br#"{"metadata": {"name": "trainer"}, "status": {"state": "running"}}"#,
//! )?;
//! runs.update("iris", "uid-1", br#"{"status.state": "completed"}"#)?;
//!
//! let listing = runs.list(&RunQuery::new("iris"))?;
//! assert!(String::from_utf8(listing).unwrap().contains("trainer"));
//! # Ok(())
//! # }
//! ```
//!
//! The HTTP routing layer and the concrete remote backend client are
//! external collaborators; this crate exposes the service operations they
//! call and the [`StoreClient`] trait a backend must implement.

pub use runmeta_core::{
    build_artifact_filter, build_run_filter, sanitize_name, ArtifactEnvelope, AttrMap, AttrValue,
    Clause, DocumentFormat, EncodeAttrs, Error, Filter, Result, RunEnvelope, DATA_ATTR, NAME_ATTR,
};
pub use runmeta_core::{attrs, document, envelope, filter, merge, path};
pub use runmeta_service::{
    parse_limit, ArtifactQuery, ArtifactService, LogService, RunQuery, RunService,
    DEFAULT_LIST_LIMIT,
};
pub use runmeta_store::{Item, ItemCursor, MemoryStore, StoreClient, StoreConfig};
