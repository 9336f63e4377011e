//! Helpers for the free-form JSON metadata envelopes on sessions, attempts,
//! and registrations.
//!
//! Reads are tolerant: a missing or wrongly-typed key yields `None`. Writes
//! merge into the existing object instead of replacing it.

use serde_json::{Map, Value};

/// Read an integer key, accepting both JSON numbers and numeric strings.
pub fn get_i64(meta: &Value, key: &str) -> Option<i64> {
    match meta.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Read a string key. Empty strings count as absent.
pub fn get_str(meta: &Value, key: &str) -> Option<String> {
    match meta.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Merge `updates` into `base`, preserving unrelated keys. A non-object base
/// (legacy rows stored `""` or `null`) is replaced by a fresh object first.
pub fn merge(base: &Value, updates: Map<String, Value>) -> Value {
    let mut out = match base {
        Value::Object(existing) => existing.clone(),
        _ => Map::new(),
    };
    for (k, v) in updates {
        out.insert(k, v);
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tolerant_integer_reads() {
        let meta = json!({"setNumber": 3, "personalityTraitId": "17", "studentBoard": "CBSE"});
        assert_eq!(get_i64(&meta, "setNumber"), Some(3));
        assert_eq!(get_i64(&meta, "personalityTraitId"), Some(17));
        assert_eq!(get_i64(&meta, "missing"), None);
        assert_eq!(get_i64(&json!(null), "setNumber"), None);
    }

    #[test]
    fn empty_string_counts_as_absent() {
        let meta = json!({"studentBoard": ""});
        assert_eq!(get_str(&meta, "studentBoard"), None);
        assert_eq!(get_str(&json!({"studentBoard": "ICSE"}), "studentBoard"), Some("ICSE".into()));
    }

    #[test]
    fn merge_keeps_unrelated_keys() {
        let base = json!({"setNumber": 2, "studentBoard": "CBSE"});
        let mut updates = Map::new();
        updates.insert("overall_sincerity".into(), json!(80.0));

        let merged = merge(&base, updates);
        assert_eq!(merged["setNumber"], json!(2));
        assert_eq!(merged["studentBoard"], json!("CBSE"));
        assert_eq!(merged["overall_sincerity"], json!(80.0));
    }

    #[test]
    fn merge_replaces_non_object_base() {
        let mut updates = Map::new();
        updates.insert("disc_scores".into(), json!({"D": 4.0}));
        let merged = merge(&json!(""), updates);
        assert_eq!(merged, json!({"disc_scores": {"D": 4.0}}));
    }
}
