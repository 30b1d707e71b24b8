//! Metadata envelopes and their declarative attribute encoders
//!
//! An envelope is a fixed-shape projection of the fields of a run or
//! artifact document that are worth indexing. Envelopes are decoded from
//! the document's JSON form and flattened into an [`AttrMap`]; they are
//! never persisted themselves.
//!
//! Absence handling: every field is an `Option`, so a JSON `null` and a
//! missing key both decode to `None` and emit no attribute, while any
//! present value (including `""`, `0` and `false`) always emits one.
//! Flattening is declarative per envelope type rather than driven by
//! runtime type inspection; nested structure appears only in the dotted
//! attribute names.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::attrs::{put_int, put_labels, put_string, AttrMap};

/// Sanitized attribute holding the run name
pub const RUN_NAME_ATTR: &str = "metadata_name";
/// Sanitized attribute holding the run state
pub const RUN_STATE_ATTR: &str = "status_state";
/// Derived epoch attribute for the run's last-update time
pub const LAST_UPDATE_EPOCH_ATTR: &str = "status_lasttimeEpoch";
/// Derived epoch attribute for the run's start time
pub const START_TIME_EPOCH_ATTR: &str = "status_starttimeEpoch";
/// Unsanitized prefix for run label attributes
pub const RUN_LABEL_PREFIX: &str = "metadata.labels";

/// Attribute holding the artifact's logical name (its key)
pub const ARTIFACT_NAME_ATTR: &str = "name";
/// Unsanitized prefix for artifact label attributes
pub const ARTIFACT_LABEL_PREFIX: &str = "labels";

/// Flatten an envelope into index attributes
pub trait EncodeAttrs {
    /// Append this envelope's attributes to `out`
    fn encode_attrs(&self, out: &mut AttrMap);

    /// Flatten into a fresh attribute map
    fn attrs(&self) -> AttrMap {
        let mut out = AttrMap::new();
        self.encode_attrs(&mut out);
        out
    }
}

/// Indexable projection of a run document
#[derive(Debug, Default, Deserialize)]
pub struct RunEnvelope {
    /// The `metadata` section
    #[serde(default)]
    pub metadata: RunMetadata,
    /// The `status` section
    #[serde(default)]
    pub status: RunState,
}

/// The `metadata` section of a run document
#[derive(Debug, Default, Deserialize)]
pub struct RunMetadata {
    /// Run name
    pub name: Option<String>,
    /// Run unique identifier
    pub uid: Option<String>,
    /// Hyperparameter iteration number
    pub iteration: Option<i64>,
    /// Owning project
    pub project: Option<String>,
    /// User labels
    pub labels: Option<BTreeMap<String, String>>,
}

/// The `status` section of a run document
#[derive(Debug, Default, Deserialize)]
pub struct RunState {
    /// Run state (`running`, `completed`, ...)
    pub state: Option<String>,
    /// Last-update timestamp string
    pub last_update: Option<String>,
    /// Start timestamp string
    pub start_time: Option<String>,
}

impl EncodeAttrs for RunEnvelope {
    fn encode_attrs(&self, out: &mut AttrMap) {
        if let Some(name) = &self.metadata.name {
            put_string(out, "metadata.name", name);
        }
        if let Some(uid) = &self.metadata.uid {
            put_string(out, "metadata.uid", uid);
        }
        if let Some(iteration) = self.metadata.iteration {
            put_int(out, "metadata.iteration", iteration);
        }
        if let Some(project) = &self.metadata.project {
            put_string(out, "metadata.project", project);
        }
        if let Some(labels) = &self.metadata.labels {
            put_labels(out, RUN_LABEL_PREFIX, labels);
        }
        if let Some(state) = &self.status.state {
            put_string(out, "status.state", state);
        }
        // Timestamp fields re-emit as <name>Epoch when they parse.
        if let Some(last_update) = &self.status.last_update {
            put_string(out, "status.lasttime", last_update);
        }
        if let Some(start_time) = &self.status.start_time {
            put_string(out, "status.starttime", start_time);
        }
    }
}

/// Indexable projection of an artifact document
#[derive(Debug, Default, Deserialize)]
pub struct ArtifactEnvelope {
    /// Artifact logical name (the document calls it `key`)
    #[serde(rename = "key")]
    pub name: Option<String>,
    /// User labels
    pub labels: Option<BTreeMap<String, String>>,
}

impl EncodeAttrs for ArtifactEnvelope {
    fn encode_attrs(&self, out: &mut AttrMap) {
        if let Some(name) = &self.name {
            put_string(out, ARTIFACT_NAME_ATTR, name);
        }
        if let Some(labels) = &self.labels {
            put_labels(out, ARTIFACT_LABEL_PREFIX, labels);
        }
    }
}
