//! Listing engine: sort, truncate and assemble response envelopes
//!
//! Listing pulls a full batch of items off a query cursor, derives a sort
//! key per item and renders the retained blobs into a JSON envelope. The
//! blobs themselves are never re-serialized; each keeps its own internal
//! format verbatim inside the response.

use runmeta_core::envelope::LAST_UPDATE_EPOCH_ATTR;
use runmeta_core::DATA_ATTR;
use runmeta_store::Item;

/// Extract and order document blobs from a listing batch
///
/// The sort key is the last-update epoch attribute when present; items
/// lacking it get an incrementing synthetic counter starting at zero, so
/// they still order deterministically (ties keep arrival order) and sit
/// far below any real epoch value. When `sort` is requested or a limit is
/// set, the batch is ordered descending (most recent first); a positive
/// `limit` truncates, zero means unbounded.
pub fn sort_and_truncate(items: Vec<Item>, sort: bool, limit: usize) -> Vec<Vec<u8>> {
    let mut synthetic = 0i64;
    let mut keyed: Vec<(i64, Vec<u8>)> = items
        .into_iter()
        .filter_map(|item| {
            let blob = item.get_blob(DATA_ATTR)?.to_vec();
            let key = match item.get_int(LAST_UPDATE_EPOCH_ATTR) {
                Some(epoch) => epoch,
                None => {
                    let key = synthetic;
                    synthetic += 1;
                    key
                }
            };
            Some((key, blob))
        })
        .collect();

    if sort || limit > 0 {
        // Stable: equal keys keep arrival order.
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
    }
    if limit > 0 {
        keyed.truncate(limit);
    }
    keyed.into_iter().map(|(_, blob)| blob).collect()
}

/// Render a listing envelope: `{"<kind>": [<blob>,<blob>,...]}`
pub fn render_listing(kind: &str, blobs: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::with_capacity(16 + blobs.iter().map(Vec::len).sum::<usize>());
    out.extend_from_slice(b"{\"");
    out.extend_from_slice(kind.as_bytes());
    out.extend_from_slice(b"\": [");
    for (i, blob) in blobs.iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        out.extend_from_slice(blob);
    }
    out.extend_from_slice(b"]}");
    out
}

/// Render a point-read envelope: `{"data": <blob>}`
pub fn render_document(blob: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(blob.len() + 10);
    out.extend_from_slice(b"{\"data\":");
    out.extend_from_slice(blob);
    out.push(b'}');
    out
}
