//! Listing/deletion query parameters
//!
//! Thin carriers for the query-string inputs the routing layer collects,
//! plus the translation into filter expressions.

use runmeta_core::path::{DEFAULT_ARTIFACT_TAG, WILDCARD_TAG};
use runmeta_core::{build_artifact_filter, build_run_filter, Error, Filter, Result};

/// Default listing limit when the limit parameter is absent
pub const DEFAULT_LIST_LIMIT: usize = 30;

/// Parameters of a run listing or delete-by-query request
#[derive(Debug, Clone, Default)]
pub struct RunQuery {
    /// Project namespace (required)
    pub project: String,
    /// Exact-match run name
    pub name: Option<String>,
    /// Exact-match run state
    pub state: Option<String>,
    /// Label predicate tokens (`key=value`, `key~=value`, `key!=value`, `key`)
    pub labels: Vec<String>,
    /// Only runs updated strictly after this epoch-nanos threshold
    pub updated_after: Option<i64>,
    /// Sort descending by last-update time
    pub sort: bool,
    /// Truncate to at most this many entries; 0 means unbounded
    pub limit: usize,
}

impl RunQuery {
    /// Query over one project with no further clauses
    pub fn new(project: impl Into<String>) -> Self {
        RunQuery {
            project: project.into(),
            ..RunQuery::default()
        }
    }

    /// Build the backend filter for this query
    pub fn filter(&self) -> Filter {
        build_run_filter(
            self.name.as_deref(),
            self.state.as_deref(),
            &self.labels,
            self.updated_after,
        )
    }
}

/// Parameters of an artifact listing or delete-by-query request
#[derive(Debug, Clone, Default)]
pub struct ArtifactQuery {
    /// Project namespace (required)
    pub project: String,
    /// Exact-match artifact key
    pub name: Option<String>,
    /// Version tag; `None` defaults to `latest`, `*` matches any tag
    pub tag: Option<String>,
    /// Label predicate tokens
    pub labels: Vec<String>,
}

impl ArtifactQuery {
    /// Query over one project with no further clauses
    pub fn new(project: impl Into<String>) -> Self {
        ArtifactQuery {
            project: project.into(),
            ..ArtifactQuery::default()
        }
    }

    /// The tag clause to apply: default when absent, none for the wildcard
    pub fn effective_tag(&self) -> Option<&str> {
        match self.tag.as_deref() {
            None => Some(DEFAULT_ARTIFACT_TAG),
            Some(WILDCARD_TAG) => None,
            Some(tag) => Some(tag),
        }
    }

    /// Build the backend filter for this query
    pub fn filter(&self) -> Filter {
        build_artifact_filter(self.name.as_deref(), self.effective_tag(), &self.labels)
    }
}

/// Parse a listing limit parameter
///
/// An absent parameter defaults to [`DEFAULT_LIST_LIMIT`]; a present but
/// malformed value is rejected rather than silently defaulted, so callers
/// can answer bad requests distinctly from unbounded ones (`limit=0`).
pub fn parse_limit(raw: Option<&str>) -> Result<usize> {
    match raw {
        None => Ok(DEFAULT_LIST_LIMIT),
        Some(value) => value.parse().map_err(|_| Error::InvalidParam {
            name: "limit",
            value: value.to_string(),
        }),
    }
}
