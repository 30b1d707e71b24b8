//! Query filter expressions
//!
//! Filters are built as a small AST of AND-ed clauses with two surfaces:
//! [`Filter::to_query_string`] renders the backend filter grammar, and
//! [`Filter::matches`] evaluates the same clauses against an attribute map
//! locally (used by the in-memory store and by tests). Attribute names go
//! through the same sanitizer as the encoder, so names on both sides of a
//! query always agree.
//!
//! Label predicate tokens take the form `key~=value` (contains),
//! `key=value` (equality), `key!=value` (inequality) or a bare `key`
//! (attribute exists).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::attrs::{sanitize_name, AttrMap, AttrValue};

// Non-greedy key so `!=` binds to the operator, not the key.
static LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)(~=|!=|=)(.+)$").expect("label predicate regex"));

/// A single filter clause
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Exact string equality
    Eq {
        /// Sanitized attribute name
        attr: String,
        /// Comparison value
        value: String,
    },
    /// String inequality; absent attributes do not match
    Ne {
        /// Sanitized attribute name
        attr: String,
        /// Comparison value
        value: String,
    },
    /// Substring containment
    Contains {
        /// Sanitized attribute name
        attr: String,
        /// Substring to look for
        value: String,
    },
    /// Attribute presence
    Exists {
        /// Sanitized attribute name
        attr: String,
    },
    /// String suffix match (tag pointer records via the `__name` attribute)
    EndsWith {
        /// Sanitized attribute name
        attr: String,
        /// Required suffix
        value: String,
    },
    /// Integer greater-than (epoch thresholds)
    Gt {
        /// Sanitized attribute name
        attr: String,
        /// Threshold
        value: i64,
    },
}

impl Clause {
    /// Render this clause in the backend filter grammar
    pub fn to_query_string(&self) -> String {
        match self {
            Clause::Eq { attr, value } => format!("{attr} == \"{}\"", escape(value, '"')),
            Clause::Ne { attr, value } => format!("{attr} != \"{}\"", escape(value, '"')),
            Clause::Contains { attr, value } => {
                format!("contains({attr},'{}')", escape(value, '\''))
            }
            Clause::Exists { attr } => format!("exists({attr})"),
            Clause::EndsWith { attr, value } => format!("ends({attr},\"{}\")", escape(value, '"')),
            Clause::Gt { attr, value } => format!("{attr} > {value}"),
        }
    }

    /// Evaluate this clause against an attribute map
    pub fn matches(&self, attrs: &AttrMap) -> bool {
        match self {
            Clause::Eq { attr, value } => {
                attrs.get(attr).is_some_and(|v| v.render() == *value)
            }
            Clause::Ne { attr, value } => {
                attrs.get(attr).is_some_and(|v| v.render() != *value)
            }
            Clause::Contains { attr, value } => attrs
                .get(attr)
                .and_then(AttrValue::as_str)
                .is_some_and(|s| s.contains(value.as_str())),
            Clause::Exists { attr } => attrs.contains_key(attr),
            Clause::EndsWith { attr, value } => attrs
                .get(attr)
                .and_then(AttrValue::as_str)
                .is_some_and(|s| s.ends_with(value.as_str())),
            Clause::Gt { attr, value } => attrs
                .get(attr)
                .and_then(AttrValue::as_int)
                .is_some_and(|n| n > *value),
        }
    }
}

/// An AND-conjunction of clauses
///
/// The empty filter matches everything and renders as the empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    /// Create an empty filter
    pub fn new() -> Self {
        Filter::default()
    }

    /// Append a clause
    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    /// True if no clauses were added
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The clauses in insertion order
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Render the backend filter expression string
    pub fn to_query_string(&self) -> String {
        self.clauses
            .iter()
            .map(Clause::to_query_string)
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Evaluate all clauses against an attribute map
    pub fn matches(&self, attrs: &AttrMap) -> bool {
        self.clauses.iter().all(|c| c.matches(attrs))
    }
}

fn escape(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == quote || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Parse one label predicate token into a clause
///
/// `prefix` is the unsanitized attribute prefix under which labels were
/// flattened (`metadata.labels` for runs, `labels` for artifacts). A token
/// with no recognized operator is a presence test on the named label.
pub fn parse_label_predicate(prefix: &str, token: &str) -> Clause {
    let qualified = |key: &str| {
        if prefix.is_empty() {
            sanitize_name(key)
        } else {
            sanitize_name(&format!("{prefix}.{key}"))
        }
    };
    match LABEL_RE.captures(token) {
        None => Clause::Exists {
            attr: qualified(token),
        },
        Some(caps) => {
            let attr = qualified(&caps[1]);
            let value = caps[3].to_string();
            match &caps[2] {
                "~=" => Clause::Contains { attr, value },
                "!=" => Clause::Ne { attr, value },
                _ => Clause::Eq { attr, value },
            }
        }
    }
}

/// Build the filter for run listing and deletion queries
///
/// Every present input contributes one AND clause; label iteration order
/// affects the rendered string but not which items match.
pub fn build_run_filter(
    name: Option<&str>,
    state: Option<&str>,
    labels: &[String],
    updated_after: Option<i64>,
) -> Filter {
    let mut filter = Filter::new();
    if let Some(name) = name {
        filter.push(Clause::Eq {
            attr: sanitize_name("metadata.name"),
            value: name.to_string(),
        });
    }
    if let Some(state) = state {
        filter.push(Clause::Eq {
            attr: sanitize_name("status.state"),
            value: state.to_string(),
        });
    }
    for token in labels {
        filter.push(parse_label_predicate(
            crate::envelope::RUN_LABEL_PREFIX,
            token,
        ));
    }
    if let Some(threshold) = updated_after {
        filter.push(Clause::Gt {
            attr: crate::envelope::LAST_UPDATE_EPOCH_ATTR.to_string(),
            value: threshold,
        });
    }
    filter
}

/// Build the filter for artifact listing and deletion queries
///
/// `tag = None` means the wildcard: no tag clause at all. Otherwise the tag
/// is matched as a suffix of the backend-internal `__name` key attribute,
/// which distinguishes tag pointer records from uid content records.
pub fn build_artifact_filter(name: Option<&str>, tag: Option<&str>, labels: &[String]) -> Filter {
    let mut filter = Filter::new();
    if let Some(name) = name {
        filter.push(Clause::Eq {
            attr: crate::envelope::ARTIFACT_NAME_ATTR.to_string(),
            value: name.to_string(),
        });
    }
    if let Some(tag) = tag {
        filter.push(Clause::EndsWith {
            attr: crate::attrs::NAME_ATTR.to_string(),
            value: tag.to_string(),
        });
    }
    for token in labels {
        filter.push(parse_label_predicate(
            crate::envelope::ARTIFACT_LABEL_PREFIX,
            token,
        ));
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::NAME_ATTR;

    fn attrs(pairs: &[(&str, AttrValue)]) -> AttrMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_parse_equality_predicate() {
        let clause = parse_label_predicate("metadata.labels", "owner=joe");
        assert_eq!(
            clause,
            Clause::Eq {
                attr: "metadata_labels_owner".to_string(),
                value: "joe".to_string()
            }
        );
    }

    #[test]
    fn test_parse_contains_predicate() {
        let clause = parse_label_predicate("labels", "framework~=sk");
        assert_eq!(
            clause,
            Clause::Contains {
                attr: "labels_framework".to_string(),
                value: "sk".to_string()
            }
        );
    }

    #[test]
    fn test_parse_inequality_predicate() {
        // `!=` binds as an operator; the key is not greedily extended over `!`.
        let clause = parse_label_predicate("metadata.labels", "owner!=joe");
        assert_eq!(
            clause,
            Clause::Ne {
                attr: "metadata_labels_owner".to_string(),
                value: "joe".to_string()
            }
        );
    }

    #[test]
    fn test_parse_bare_key_is_exists() {
        let clause = parse_label_predicate("metadata.labels", "owner");
        assert_eq!(
            clause,
            Clause::Exists {
                attr: "metadata_labels_owner".to_string()
            }
        );
    }

    #[test]
    fn test_parse_without_prefix() {
        let clause = parse_label_predicate("", "owner=joe");
        assert_eq!(
            clause,
            Clause::Eq {
                attr: "owner".to_string(),
                value: "joe".to_string()
            }
        );
    }

    #[test]
    fn test_run_filter_query_string() {
        let filter = build_run_filter(
            Some("trainer"),
            Some("running"),
            &["owner=joe".to_string()],
            Some(100),
        );
        assert_eq!(
            filter.to_query_string(),
            "metadata_name == \"trainer\" AND status_state == \"running\" \
             AND metadata_labels_owner == \"joe\" AND status_lasttimeEpoch > 100"
        );
    }

    #[test]
    fn test_empty_filter() {
        let filter = build_run_filter(None, None, &[], None);
        assert!(filter.is_empty());
        assert_eq!(filter.to_query_string(), "");
        assert!(filter.matches(&AttrMap::new()));
    }

    #[test]
    fn test_filter_matching() {
        let filter = build_run_filter(Some("trainer"), None, &["owner=joe".to_string()], None);
        let hit = attrs(&[
            ("metadata_name", AttrValue::Str("trainer".into())),
            ("metadata_labels_owner", AttrValue::Str("joe".into())),
        ]);
        let miss = attrs(&[("metadata_name", AttrValue::Str("other".into()))]);
        assert!(filter.matches(&hit));
        assert!(!filter.matches(&miss));
    }

    #[test]
    fn test_ne_requires_presence() {
        let clause = parse_label_predicate("metadata.labels", "owner!=joe");
        let other = attrs(&[("metadata_labels_owner", AttrValue::Str("ann".into()))]);
        let same = attrs(&[("metadata_labels_owner", AttrValue::Str("joe".into()))]);
        assert!(clause.matches(&other));
        assert!(!clause.matches(&same));
        assert!(!clause.matches(&AttrMap::new()));
    }

    #[test]
    fn test_gt_clause_on_epoch() {
        let filter = build_run_filter(None, None, &[], Some(50));
        let newer = attrs(&[("status_lasttimeEpoch", AttrValue::Int(60))]);
        let older = attrs(&[("status_lasttimeEpoch", AttrValue::Int(40))]);
        assert!(filter.matches(&newer));
        assert!(!filter.matches(&older));
        assert!(!filter.matches(&AttrMap::new()));
    }

    #[test]
    fn test_label_order_does_not_change_semantics() {
        let forward = build_run_filter(None, None, &["a=1".to_string(), "b~=x".to_string()], None);
        let reverse = build_run_filter(None, None, &["b~=x".to_string(), "a=1".to_string()], None);
        assert_ne!(forward.to_query_string(), reverse.to_query_string());
        let candidates = [
            attrs(&[
                ("metadata_labels_a", AttrValue::Str("1".into())),
                ("metadata_labels_b", AttrValue::Str("xyz".into())),
            ]),
            attrs(&[("metadata_labels_a", AttrValue::Str("1".into()))]),
            attrs(&[("metadata_labels_b", AttrValue::Str("x".into()))]),
            AttrMap::new(),
        ];
        for candidate in &candidates {
            assert_eq!(forward.matches(candidate), reverse.matches(candidate));
        }
    }

    #[test]
    fn test_artifact_filter_tag_clause() {
        let filter = build_artifact_filter(Some("model"), Some("latest"), &[]);
        assert_eq!(
            filter.to_query_string(),
            "name == \"model\" AND ends(__name,\"latest\")"
        );
        let tagged = attrs(&[
            ("name", AttrValue::Str("model".into())),
            (NAME_ATTR, AttrValue::Str("model.latest".into())),
        ]);
        let by_uid = attrs(&[
            ("name", AttrValue::Str("model".into())),
            (NAME_ATTR, AttrValue::Str("model.abc123".into())),
        ]);
        assert!(filter.matches(&tagged));
        assert!(!filter.matches(&by_uid));
    }

    #[test]
    fn test_artifact_filter_wildcard_drops_tag_clause() {
        let filter = build_artifact_filter(None, None, &[]);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_value_escaping() {
        let clause = Clause::Eq {
            attr: "metadata_name".to_string(),
            value: "say \"hi\"".to_string(),
        };
        assert_eq!(
            clause.to_query_string(),
            "metadata_name == \"say \\\"hi\\\"\""
        );
    }
}
