//! Index attribute values and name sanitization
//!
//! Every stored document carries one canonical blob attribute ([`DATA_ATTR`])
//! plus derived scalar attributes recomputed wholesale on every write.
//! Attribute names are sanitized to `[A-Za-z0-9_]` so the names used in
//! filter expressions always match the names under which values were stored.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

/// Attribute name holding the canonical document blob
pub const DATA_ATTR: &str = "_data_";

/// Reserved backend-internal key attribute (the item's relative name)
pub const NAME_ATTR: &str = "__name";

/// Timestamp format recognized in string fields: `YYYY-MM-DD HH:MM:SS.ffffff`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

static SANITIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("attribute sanitizer regex"));

/// A single indexed scalar stored alongside the document blob
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Integer attribute (iteration counters, epoch timestamps)
    Int(i64),
    /// Float attribute
    Float(f64),
    /// Boolean attribute
    Bool(bool),
    /// String attribute
    Str(String),
    /// Opaque byte blob (the canonical document)
    Blob(Vec<u8>),
}

impl AttrValue {
    /// String value, if this is a string attribute
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value, if this is an integer attribute
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Blob bytes, if this is a blob attribute
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            AttrValue::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Textual rendering used for equality/containment filter matching
    pub fn render(&self) -> String {
        match self {
            AttrValue::Int(i) => i.to_string(),
            AttrValue::Float(f) => f.to_string(),
            AttrValue::Bool(b) => b.to_string(),
            AttrValue::Str(s) => s.clone(),
            AttrValue::Blob(_) => String::new(),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

/// Mapping from sanitized attribute name to scalar value
pub type AttrMap = BTreeMap<String, AttrValue>;

/// Sanitize an attribute name: every character outside `[A-Za-z0-9_]`
/// becomes `_`
///
/// Sanitization is not collision-free; colliding names silently overwrite
/// each other in the attribute map.
pub fn sanitize_name(name: &str) -> String {
    SANITIZE_RE.replace_all(name, "_").into_owned()
}

/// Parse a timestamp string in [`TIMESTAMP_FORMAT`] to epoch nanoseconds
pub fn parse_epoch_nanos(value: &str) -> Option<i64> {
    let ts = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok()?;
    ts.and_utc().timestamp_nanos_opt()
}

/// Insert a string attribute, rewriting timestamps to their epoch form
///
/// A value matching [`TIMESTAMP_FORMAT`] is emitted only as the derived
/// `<name>Epoch` integer attribute (nanoseconds since epoch); time-range
/// filters and sort keys operate on that form. Any other string is stored
/// under the sanitized name as-is.
pub fn put_string(out: &mut AttrMap, name: &str, value: &str) {
    match parse_epoch_nanos(value) {
        Some(nanos) => {
            out.insert(sanitize_name(&format!("{name}Epoch")), AttrValue::Int(nanos));
        }
        None => {
            out.insert(sanitize_name(name), AttrValue::Str(value.to_string()));
        }
    }
}

/// Insert an integer attribute under the sanitized name
pub fn put_int(out: &mut AttrMap, name: &str, value: i64) {
    out.insert(sanitize_name(name), AttrValue::Int(value));
}

/// Expand a label map into one string attribute per key, named `<name>.<key>`
pub fn put_labels(out: &mut AttrMap, name: &str, labels: &BTreeMap<String, String>) {
    for (key, value) in labels {
        out.insert(
            sanitize_name(&format!("{name}.{key}")),
            AttrValue::Str(value.clone()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_passthrough() {
        assert_eq!(sanitize_name("already_clean_123"), "already_clean_123");
    }

    #[test]
    fn test_sanitize_replaces_punctuation() {
        assert_eq!(sanitize_name("metadata.name"), "metadata_name");
        assert_eq!(sanitize_name("status.lasttimeEpoch"), "status_lasttimeEpoch");
        assert_eq!(sanitize_name("a-b/c d"), "a_b_c_d");
    }

    #[test]
    fn test_sanitize_collisions_possible() {
        // Documented limitation: distinct names can collide after sanitization.
        assert_eq!(sanitize_name("a.b"), sanitize_name("a-b"));
    }

    #[test]
    fn test_parse_epoch_nanos() {
        let nanos = parse_epoch_nanos("2020-05-04 13:21:45.123456").unwrap();
        // 2020-05-04T13:21:45.123456 UTC
        assert_eq!(nanos, 1_588_598_505_123_456_000);
    }

    #[test]
    fn test_parse_epoch_rejects_other_strings() {
        assert!(parse_epoch_nanos("not a time").is_none());
        assert!(parse_epoch_nanos("2020-05-04").is_none());
        assert!(parse_epoch_nanos("").is_none());
    }

    #[test]
    fn test_put_string_plain() {
        let mut out = AttrMap::new();
        put_string(&mut out, "status.state", "running");
        assert_eq!(out.get("status_state").unwrap().as_str(), Some("running"));
    }

    #[test]
    fn test_put_string_timestamp_emits_epoch_only() {
        let mut out = AttrMap::new();
        put_string(&mut out, "status.lasttime", "2020-05-04 13:21:45.123456");
        assert!(out.get("status_lasttime").is_none());
        let epoch = out.get("status_lasttimeEpoch").unwrap().as_int().unwrap();
        assert_eq!(epoch, 1_588_598_505_123_456_000);
    }

    #[test]
    fn test_put_labels() {
        let mut labels = BTreeMap::new();
        labels.insert("owner".to_string(), "iris".to_string());
        labels.insert("kind".to_string(), "job".to_string());
        let mut out = AttrMap::new();
        put_labels(&mut out, "metadata.labels", &labels);
        assert_eq!(
            out.get("metadata_labels_owner").unwrap().as_str(),
            Some("iris")
        );
        assert_eq!(
            out.get("metadata_labels_kind").unwrap().as_str(),
            Some("job")
        );
    }

    #[test]
    fn test_attr_value_render() {
        assert_eq!(AttrValue::Int(7).render(), "7");
        assert_eq!(AttrValue::Bool(true).render(), "true");
        assert_eq!(AttrValue::Str("x".into()).render(), "x");
    }
}
