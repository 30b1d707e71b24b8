//! End-to-end flows through the public facade against the in-memory store

use std::sync::Arc;

use runmeta::{ArtifactQuery, ArtifactService, LogService, MemoryStore, RunQuery, RunService};

fn setup() -> (RunService, ArtifactService, LogService) {
    let store = Arc::new(MemoryStore::new());
    (
        RunService::new(store.clone()),
        ArtifactService::new(store.clone()),
        LogService::new(store),
    )
}

fn run_doc(name: &str, state: &str, last_update: &str) -> Vec<u8> {
    format!(
        r#"{{"metadata": {{"name": "{name}", "project": "iris", "labels": {{"owner": "joe"}}}}, "status": {{"state": "{state}", "last_update": "{last_update}"}}}}"#
    )
    .into_bytes()
}

#[test]
fn run_lifecycle_store_update_list_delete() {
    let (runs, _, _) = setup();

    runs.store(
        "iris",
        "u1",
        &run_doc("trainer", "running", "2021-03-01 10:00:00.000000"),
    )
    .unwrap();

    // Patch state and a fresh field through a dot-path patch
    runs.update(
        "iris",
        "u1",
        br#"{"status.state": "completed", "status.results.accuracy": 0.93}"#,
    )
    .unwrap();

    let body = runs.read("iris", "u1").unwrap();
    let wrapped: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(wrapped["data"]["status"]["state"], "completed");
    assert_eq!(wrapped["data"]["status"]["results"]["accuracy"], 0.93);
    assert_eq!(wrapped["data"]["metadata"]["labels"]["owner"], "joe");

    // Listing by the merged state finds it; by the old state does not
    let mut query = RunQuery::new("iris");
    query.state = Some("completed".to_string());
    assert!(String::from_utf8(runs.list(&query).unwrap())
        .unwrap()
        .contains("trainer"));

    query.state = Some("running".to_string());
    assert_eq!(runs.list(&query).unwrap(), b"{\"runs\": []}".to_vec());

    runs.delete("iris", "u1").unwrap();
    assert!(runs.read("iris", "u1").unwrap_err().is_not_found());
}

#[test]
fn yaml_documents_survive_update_in_their_own_encoding() {
    let (runs, _, _) = setup();
    runs.store(
        "iris",
        "u1",
        b"---\nmetadata:\n  name: trainer\nstatus:\n  state: running\n",
    )
    .unwrap();
    runs.update("iris", "u1", br#"{"status.state": "failed"}"#)
        .unwrap();

    let body = String::from_utf8(runs.read("iris", "u1").unwrap()).unwrap();
    assert!(body.contains("---"));
    assert!(body.contains("state: failed"));
    assert!(body.contains("name: trainer"));
}

#[test]
fn listing_sorts_descending_and_truncates() {
    let (runs, _, _) = setup();
    for (i, second) in [10, 50, 30, 20, 40].iter().enumerate() {
        runs.store(
            "iris",
            &format!("u{i}"),
            &run_doc(
                &format!("run{i}"),
                "done",
                &format!("2021-01-01 00:00:{second}.000000"),
            ),
        )
        .unwrap();
    }

    let mut query = RunQuery::new("iris");
    query.sort = true;
    query.limit = 3;
    let body = String::from_utf8(runs.list(&query).unwrap()).unwrap();

    let pos = |n: &str| body.find(n);
    // Epochs [50, 40, 30]: run1, run4, run2 in that order; the rest cut
    assert!(pos("run1").unwrap() < pos("run4").unwrap());
    assert!(pos("run4").unwrap() < pos("run2").unwrap());
    assert!(pos("run0").is_none());
    assert!(pos("run3").is_none());
}

#[test]
fn listing_unknown_project_is_empty_not_an_error() {
    let (runs, artifacts, _) = setup();
    assert_eq!(
        runs.list(&RunQuery::new("ghost")).unwrap(),
        b"{\"runs\": []}".to_vec()
    );
    assert_eq!(
        artifacts.list(&ArtifactQuery::new("ghost")).unwrap(),
        b"{\"artifacts\": []}".to_vec()
    );
}

#[test]
fn artifact_tagging_and_wildcard() {
    let (_, artifacts, _) = setup();
    let doc = br#"{"key": "model", "labels": {"framework": "sklearn"}}"#;

    // No explicit tag: stored under uid and "latest"
    artifacts.store("iris", "u1", "model", None, doc).unwrap();
    assert!(artifacts.read("iris", "model", None).is_ok());

    // A newer version under an explicit tag
    artifacts
        .store("iris", "u2", "model", Some("v2"), doc)
        .unwrap();
    assert!(artifacts.read("iris", "model", Some("v2")).is_ok());

    // Default listing sees only "latest" pointer records
    let body = String::from_utf8(artifacts.list(&ArtifactQuery::new("iris")).unwrap()).unwrap();
    assert_eq!(body.matches("sklearn").count(), 1);

    // Wildcard removes the tag clause entirely: uid records included
    let mut all = ArtifactQuery::new("iris");
    all.tag = Some("*".to_string());
    let body = String::from_utf8(artifacts.list(&all).unwrap()).unwrap();
    assert_eq!(body.matches("sklearn").count(), 4);
}

#[test]
fn delete_by_query_is_independent_per_item() {
    let (runs, _, _) = setup();
    runs.store("iris", "u1", &run_doc("a", "done", "x")).unwrap();
    runs.store("iris", "u2", &run_doc("b", "done", "x")).unwrap();
    runs.store("iris", "u3", &run_doc("c", "failed", "x"))
        .unwrap();

    let mut query = RunQuery::new("iris");
    query.state = Some("done".to_string());
    assert_eq!(runs.delete_matching(&query).unwrap(), 2);

    // The non-matching run survives
    assert!(runs.read("iris", "u3").is_ok());
    let body = String::from_utf8(runs.list(&RunQuery::new("iris")).unwrap()).unwrap();
    assert!(body.contains("\"c\""));
    assert!(!body.contains("\"a\""));
}

#[test]
fn logs_are_opaque_blobs() {
    let (_, _, logs) = setup();
    logs.store("iris", "u1", b"step 1\nstep 2\n").unwrap();
    assert_eq!(logs.fetch("iris", "u1").unwrap(), b"step 1\nstep 2\n");
    assert!(logs.fetch("iris", "u9").unwrap_err().is_not_found());
}
