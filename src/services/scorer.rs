//! Level-specific score aggregation and the sincerity index.
//!
//! The SQL half (sum queries) lives in `db::answers`; everything here is a
//! pure function over those aggregates so the arithmetic is testable
//! without a database.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::models::SincerityClass;

/// Result of DISC scoring over an attempt.
#[derive(Debug, Clone)]
pub struct DiscOutcome {
    /// Factor code → summed score, plus a `total` entry. The NULL-factor
    /// bucket contributes to the total but gets no map entry.
    pub scores: Value,
    pub total: f64,
    /// Top two factor codes concatenated (e.g. "DI"), or the single top
    /// factor when only one is present. `None` when no factor scored.
    pub dominant_factor: Option<String>,
}

/// Fold the per-factor sums from the DISC aggregation query.
pub fn disc_outcome(sums: &[(Option<String>, f64)]) -> DiscOutcome {
    let mut total = 0.0;
    let mut map = Map::new();
    let mut ranked: Vec<(&str, f64)> = Vec::new();

    for (factor, sum) in sums {
        total += sum;
        match factor.as_deref() {
            Some(code) if !code.is_empty() => {
                map.insert(code.to_string(), json!(sum));
                ranked.push((code, *sum));
            }
            _ => {}
        }
    }

    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| a.0.cmp(b.0)));

    let dominant_factor = match ranked.as_slice() {
        [] => None,
        [only] => Some(only.0.to_string()),
        [first, second, ..] => Some(format!("{}{}", first.0, second.0)),
    };

    map.insert("total".to_string(), json!(total));

    DiscOutcome {
        scores: Value::Object(map),
        total,
        dominant_factor,
    }
}

/// Agile value scores in a fixed field order, `total` last.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgileScores {
    #[serde(rename = "Commitment")]
    pub commitment: f64,
    #[serde(rename = "Courage")]
    pub courage: f64,
    #[serde(rename = "Focus")]
    pub focus: f64,
    #[serde(rename = "Openness")]
    pub openness: f64,
    #[serde(rename = "Respect")]
    pub respect: f64,
    pub total: f64,
}

/// Fold the per-category sums from the agile aggregation query.
///
/// Categories outside the five agile values (attention checks and the
/// like) count toward the total but have no dedicated field.
pub fn agile_outcome(sums: &[(Option<String>, f64)]) -> AgileScores {
    let mut scores = AgileScores::default();
    for (category, sum) in sums {
        scores.total += sum;
        match category.as_deref() {
            Some("Commitment") => scores.commitment = *sum,
            Some("Courage") => scores.courage = *sum,
            Some("Focus") => scores.focus = *sum,
            Some("Openness") => scores.openness = *sum,
            Some("Respect") => scores.respect = *sum,
            _ => {}
        }
    }
    scores
}

/// Generic category rollup used by levels past the agile battery: every
/// named category gets an entry, plus a `total` entry.
pub fn category_map(sums: &[(Option<String>, f64)]) -> (Value, f64) {
    let mut total = 0.0;
    let mut map = Map::new();
    for (category, sum) in sums {
        total += sum;
        if let Some(name) = category.as_deref() {
            if !name.is_empty() {
                map.insert(name.to_string(), json!(sum));
            }
        }
    }
    map.insert("total".to_string(), json!(total));
    (Value::Object(map), total)
}

/// Sincerity index: start at 100, −20 per attention-check failure, −10 per
/// distraction chosen, floored at 0.
pub fn sincerity_index(attention_fails: i64, distractions_chosen: i64) -> f64 {
    let index = 100.0 - (attention_fails as f64) * 20.0 - (distractions_chosen as f64) * 10.0;
    index.max(0.0)
}

/// Classify a sincerity index.
pub fn sincerity_class(index: f64) -> SincerityClass {
    if index >= 80.0 {
        SincerityClass::Sincere
    } else if index >= 50.0 {
        SincerityClass::Borderline
    } else {
        SincerityClass::NotSincere
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sums(pairs: &[(&str, f64)]) -> Vec<(Option<String>, f64)> {
        pairs.iter().map(|(k, v)| (Some(k.to_string()), *v)).collect()
    }

    #[test]
    fn disc_dominant_is_top_two_concatenated() {
        let outcome = disc_outcome(&sums(&[("D", 4.0), ("I", 3.0), ("S", 2.0), ("C", 1.0)]));
        assert_eq!(outcome.dominant_factor.as_deref(), Some("DI"));
        assert_eq!(outcome.total, 10.0);
        assert_eq!(outcome.scores["D"], 4.0);
        assert_eq!(outcome.scores["C"], 1.0);
        assert_eq!(outcome.scores["total"], 10.0);
    }

    #[test]
    fn disc_single_factor() {
        let outcome = disc_outcome(&sums(&[("S", 7.0)]));
        assert_eq!(outcome.dominant_factor.as_deref(), Some("S"));
        assert_eq!(outcome.total, 7.0);
    }

    #[test]
    fn disc_null_factor_counts_toward_total_only() {
        let mut input = sums(&[("D", 4.0), ("I", 2.0)]);
        input.push((None, 3.0));
        let outcome = disc_outcome(&input);
        assert_eq!(outcome.total, 9.0);
        assert_eq!(outcome.scores["total"], 9.0);
        assert!(outcome.scores.get("").is_none());
        assert_eq!(outcome.dominant_factor.as_deref(), Some("DI"));
    }

    #[test]
    fn disc_no_factors_at_all() {
        let outcome = disc_outcome(&[(None, 5.0)]);
        assert_eq!(outcome.dominant_factor, None);
        assert_eq!(outcome.total, 5.0);
    }

    #[test]
    fn agile_fields_fill_and_total_spans_everything() {
        let outcome = agile_outcome(&sums(&[
            ("Commitment", 10.0),
            ("Courage", 8.0),
            ("Focus", 6.0),
            ("Openness", 9.0),
            ("Respect", 7.0),
        ]));
        assert_eq!(outcome.commitment, 10.0);
        assert_eq!(outcome.respect, 7.0);
        assert_eq!(outcome.total, 40.0);
    }

    #[test]
    fn agile_serializes_total_last() {
        let outcome = agile_outcome(&sums(&[("Commitment", 1.0)]));
        let text = serde_json::to_string(&outcome).unwrap();
        assert!(text.starts_with("{\"Commitment\""));
        assert!(text.ends_with("\"total\":1.0}"));
    }

    #[test]
    fn category_map_includes_total() {
        let (map, total) = category_map(&sums(&[("Planning", 3.0), ("Delivery", 2.0)]));
        assert_eq!(total, 5.0);
        assert_eq!(map["Planning"], 3.0);
        assert_eq!(map["total"], 5.0);
    }

    #[test]
    fn sincerity_arithmetic() {
        assert_eq!(sincerity_index(0, 0), 100.0);
        assert_eq!(sincerity_index(1, 0), 80.0);
        assert_eq!(sincerity_index(0, 3), 70.0);
        assert_eq!(sincerity_index(2, 1), 50.0);
        // Floors at zero rather than going negative.
        assert_eq!(sincerity_index(5, 5), 0.0);
    }

    #[test]
    fn sincerity_class_thresholds() {
        assert_eq!(sincerity_class(100.0), SincerityClass::Sincere);
        assert_eq!(sincerity_class(80.0), SincerityClass::Sincere);
        assert_eq!(sincerity_class(79.9), SincerityClass::Borderline);
        assert_eq!(sincerity_class(50.0), SincerityClass::Borderline);
        assert_eq!(sincerity_class(49.9), SincerityClass::NotSincere);
        assert_eq!(sincerity_class(0.0), SincerityClass::NotSincere);
    }
}
