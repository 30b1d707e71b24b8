//! Hierarchical store paths for runs, artifacts and logs
//!
//! Runs live under `/run/{project}/{uid}`. Artifacts are stored twice,
//! under `/artifact/{project}/{key}.{uid}` and `/artifact/{project}/{key}.{tag}`,
//! giving two independent access paths to the same logical version. Logs
//! are flat blobs under `/log/{project}-{uid}`.

/// Tag an artifact write defaults to when none is given
pub const DEFAULT_ARTIFACT_TAG: &str = "latest";

/// Listing tag meaning "match any tag" (no tag clause)
pub const WILDCARD_TAG: &str = "*";

/// Path of a single run
pub fn run(project: &str, uid: &str) -> String {
    format!("/run/{project}/{uid}")
}

/// Query prefix covering all runs of a project
pub fn runs_prefix(project: &str) -> String {
    format!("/run/{project}/")
}

/// Path of an artifact record; `suffix` is a uid or a tag
pub fn artifact(project: &str, key: &str, suffix: &str) -> String {
    format!("/artifact/{project}/{key}.{suffix}")
}

/// Query prefix covering all artifacts of a project
pub fn artifacts_prefix(project: &str) -> String {
    format!("/artifact/{project}/")
}

/// Path of a run's log blob
pub fn log(project: &str, uid: &str) -> String {
    format!("/log/{project}-{uid}")
}
