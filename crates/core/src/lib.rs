//! runmeta-core: document encoding, filters and merge-patching
//!
//! The algorithmic core of the runmeta metadata store, shared by the
//! service layer and the store client:
//!
//! - [`attrs`]: index attribute scalars and name sanitization
//! - [`envelope`]: run/artifact metadata envelopes and their flatteners
//! - [`document`]: YAML-vs-JSON detection and lossless conversion
//! - [`merge`]: dot-path merge-patch engine
//! - [`filter`]: query filter expressions (string form + local evaluation)
//! - [`path`]: hierarchical store paths
//!
//! Nothing here talks to a backend; all functions are pure over their
//! inputs and surface failures through [`Error`].

pub mod attrs;
pub mod document;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod merge;
pub mod path;

pub use attrs::{sanitize_name, AttrMap, AttrValue, DATA_ATTR, NAME_ATTR};
pub use document::DocumentFormat;
pub use envelope::{ArtifactEnvelope, EncodeAttrs, RunEnvelope};
pub use error::{Error, Result};
pub use filter::{build_artifact_filter, build_run_filter, Clause, Filter};
