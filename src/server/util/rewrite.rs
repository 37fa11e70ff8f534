//! Tenant identifier rewriting for restored snapshots.
//!
//! A backup carries the identifier of the tenant it was taken from. Restoring it for
//! another tenant rewrites that identifier in one of two ways:
//!
//! - `rewrite_text` replaces every occurrence of the old id in the raw JSON text. It also
//!   rewrites unrelated values that merely contain the old id.
//! - `rewrite_structural` works on the parsed snapshot and only touches `tenant` fields
//!   and `assets/<old>/` path segments.

use regex::{NoExpand, Regex};
use serde_json::Value;
use std::sync::LazyLock;

use crate::server::{
    error::backup::ExtractionError,
    model::snapshot::{Snapshot, TENANT_FIELD},
};

static TENANT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""tenant"\s*:\s*"([^"\\]*)""#).expect("Invalid regex pattern for tenant field")
});

/// Finds the tenant id a serialized snapshot was exported from.
///
/// # Returns
/// - `Some(&str)` - Value of the first `"tenant": "<id>"` pair in the text
/// - `None` - The text holds no tenant field
pub fn find_tenant_id(text: &str) -> Option<&str> {
    TENANT_PATTERN
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .filter(|id| !id.is_empty())
}

/// Replaces every occurrence of `old` with `new` in a serialized snapshot.
///
/// # Returns
/// - `Ok(String)` - Rewritten text, unchanged when `old == new`
/// - `Err(ExtractionError::InvalidSnapshot)` - The old id cannot be matched
pub fn rewrite_text(text: &str, old: &str, new: &str) -> Result<String, ExtractionError> {
    if old == new {
        return Ok(text.to_string());
    }

    let pattern = Regex::new(&regex::escape(old)).map_err(|e| {
        ExtractionError::InvalidSnapshot(format!("cannot match tenant id '{}': {}", old, e))
    })?;

    Ok(pattern.replace_all(text, NoExpand(new)).into_owned())
}

/// Finds the tenant id a parsed snapshot was exported from.
pub fn snapshot_tenant_id(snapshot: &Snapshot) -> Option<String> {
    snapshot.iter().find_map(|(_, records)| {
        records
            .iter()
            .find_map(|record| record.get(TENANT_FIELD).and_then(Value::as_str))
            .map(str::to_string)
    })
}

/// Assigns a parsed snapshot to another tenant.
///
/// Sets the `tenant` field of every record that has one and rewrites the `assets/<old>/`
/// segment of every string value, at any depth, to `assets/<new>/`.
///
/// # Returns
/// - Number of records whose `tenant` field changed
pub fn rewrite_structural(snapshot: &mut Snapshot, old: Option<&str>, new: &str) -> usize {
    let asset_paths = old
        .filter(|old| *old != new)
        .map(|old| (format!("assets/{}/", old), format!("assets/{}/", new)));

    let mut changed = 0;
    for record in snapshot.records_mut() {
        if let Some(tenant) = record.get_mut(TENANT_FIELD) {
            if tenant.as_str() != Some(new) {
                *tenant = Value::String(new.to_string());
                changed += 1;
            }
        }

        if let Some((from, to)) = &asset_paths {
            rewrite_strings(record, from, to);
        }
    }

    changed
}

fn rewrite_strings(value: &mut Value, from: &str, to: &str) {
    match value {
        Value::String(text) if text.contains(from) => *text = text.replace(from, to),
        Value::Array(items) => items
            .iter_mut()
            .for_each(|item| rewrite_strings(item, from, to)),
        Value::Object(map) => map
            .values_mut()
            .for_each(|item| rewrite_strings(item, from, to)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_first_tenant_field() {
        let text = r#"{"ads":[{"_id":"a1","tenant" : "old-co"}],"tags":[{"tenant":"other"}]}"#;

        assert_eq!(find_tenant_id(text), Some("old-co"));
        assert_eq!(find_tenant_id(r#"{"ads":[]}"#), None);
        assert_eq!(find_tenant_id(r#"{"ads":[{"tenant":""}]}"#), None);
    }

    #[test]
    fn text_rewrite_replaces_every_occurrence() {
        let text = r#"{"ads":[{"tenant":"old","image":"assets/old/ads/a.png"}]}"#;

        let rewritten = rewrite_text(text, "old", "new").unwrap();

        assert_eq!(
            rewritten,
            r#"{"ads":[{"tenant":"new","image":"assets/new/ads/a.png"}]}"#
        );
    }

    #[test]
    fn text_rewrite_escapes_pattern_and_replacement() {
        let text = r#"{"tenant":"a.b","note":"axb a.b"}"#;

        let rewritten = rewrite_text(text, "a.b", "$1").unwrap();

        assert_eq!(rewritten, r#"{"tenant":"$1","note":"axb $1"}"#);
    }

    #[test]
    fn text_rewrite_also_hits_unrelated_substrings() {
        let text = r#"{"tenant":"abc","name":"abcdef"}"#;

        let rewritten = rewrite_text(text, "abc", "xyz").unwrap();

        assert_eq!(rewritten, r#"{"tenant":"xyz","name":"xyzdef"}"#);
    }

    #[test]
    fn structural_rewrite_touches_only_tenant_and_asset_paths() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            "ads",
            vec![json!({
                "_id": "a1",
                "tenant": "abc",
                "name": "abcdef",
                "media": { "images": ["assets/abc/ads/a.png", "https://cdn/abc/x.png"] }
            })],
        );
        snapshot.insert("languages", vec![json!({ "_id": "fr", "code": "fr" })]);

        let old = snapshot_tenant_id(&snapshot);
        let changed = rewrite_structural(&mut snapshot, old.as_deref(), "xyz");

        assert_eq!(changed, 1);
        assert_eq!(
            snapshot.records("ads")[0],
            json!({
                "_id": "a1",
                "tenant": "xyz",
                "name": "abcdef",
                "media": { "images": ["assets/xyz/ads/a.png", "https://cdn/abc/x.png"] }
            })
        );
        assert_eq!(snapshot.records("languages")[0], json!({ "_id": "fr", "code": "fr" }));
    }

    #[test]
    fn structural_rewrite_without_known_origin_sets_tenant_only() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            "tags",
            vec![json!({ "_id": "t1", "tenant": 42, "icon": "assets/abc/t.png" })],
        );

        rewrite_structural(&mut snapshot, None, "xyz");

        assert_eq!(
            snapshot.records("tags")[0],
            json!({ "_id": "t1", "tenant": "xyz", "icon": "assets/abc/t.png" })
        );
    }
}
