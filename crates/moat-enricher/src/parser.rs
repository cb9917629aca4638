//! Normalisation of recovered JSON into per-company pillar scores

use crate::error::EnricherError;
use moat_domain::SemanticPillarScore;
use moat_thesis::ThesisConfig;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One company's JSON object
pub type Record = Map<String, Value>;

/// Flatten a recovered value into one record per company
///
/// A top-level object is a single record. Array elements are either an
/// object or a list of objects; a list is merged into one record (later keys
/// win). Anything else in the array is rejected.
pub fn records_from_value(value: Value) -> Result<Vec<Record>, EnricherError> {
    match value {
        Value::Object(map) => Ok(vec![map]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => Ok(map),
                Value::Array(parts) => merge_parts(i, parts),
                other => Err(EnricherError::InvalidFormat(format!(
                    "element {} is {} instead of an object",
                    i,
                    kind(&other)
                ))),
            })
            .collect(),
        other => Err(EnricherError::InvalidFormat(format!(
            "expected an object or array, got {}",
            kind(&other)
        ))),
    }
}

fn merge_parts(index: usize, parts: Vec<Value>) -> Result<Record, EnricherError> {
    let mut merged = Map::new();
    for part in parts {
        match part {
            Value::Object(map) => merged.extend(map),
            other => {
                return Err(EnricherError::InvalidFormat(format!(
                    "element {} contains {} instead of objects",
                    index,
                    kind(&other)
                )))
            }
        }
    }
    Ok(merged)
}

/// Extract the thesis pillars from one record
///
/// A pillar entry needs a numeric `score` and `confidence`; entries without
/// them (typically cut off mid-object) are skipped. Scores are clamped to the
/// pillar's range, confidence to 0..=1, and effective confidence is capped by
/// `input_quality`.
pub fn pillar_scores(
    record: &Record,
    thesis: &ThesisConfig,
    input_quality: f64,
) -> BTreeMap<String, SemanticPillarScore> {
    let mut scores = BTreeMap::new();

    for (name, pillar) in &thesis.pillars {
        let Some(entry) = lookup(record, name).and_then(Value::as_object) else {
            continue;
        };
        let (Some(score), Some(confidence)) = (
            entry.get("score").and_then(as_number),
            entry.get("confidence").and_then(as_number),
        ) else {
            continue;
        };

        let max = pillar.max_raw_score;
        let score = clamp_score(score, max);
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let band = entry
            .get("band")
            .and_then(Value::as_array)
            .and_then(|b| match b.as_slice() {
                [low, high] => Some((as_number(low)?, as_number(high)?)),
                _ => None,
            })
            .map(|(low, high)| {
                let (low, high) = (clamp_score(low, max), clamp_score(high, max));
                (low.min(high), low.max(high))
            })
            .unwrap_or((score, score));
        let justification = entry
            .get("justification")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();

        scores.insert(
            name.clone(),
            SemanticPillarScore {
                score,
                confidence,
                band,
                justification,
                effective_confidence: confidence.min(input_quality),
            },
        );
    }

    scores
}

/// Exact key first, then case-insensitive
fn lookup<'a>(record: &'a Record, name: &str) -> Option<&'a Value> {
    record.get(name).or_else(|| {
        record
            .iter()
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

/// Numbers, or numeric strings
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

fn clamp_score(value: f64, max: i32) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    (value.round() as i64).clamp(0, max as i64) as i32
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn thesis() -> ThesisConfig {
        ThesisConfig::default_thesis().unwrap()
    }

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_object_is_single_record() {
        let records = records_from_value(json!({"regulatory": {}})).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_list_element_is_merged() {
        let value = json!([
            [{"regulatory": {"score": 1}}, {"network": {"score": 2}}],
            {"data": {"score": 3}}
        ]);
        let records = records_from_value(value).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].contains_key("regulatory"));
        assert!(records[0].contains_key("network"));
    }

    #[test]
    fn test_scalar_element_rejected() {
        assert!(records_from_value(json!([{"a": 1}, 7])).is_err());
        assert!(records_from_value(json!("text")).is_err());
    }

    #[test]
    fn test_pillar_scores_clamped_and_capped() {
        let rec = record(json!({
            "regulatory": {"score": 140, "confidence": 0.9, "band": [90, 60], "justification": " ISO 27001 "},
            "network": {"score": "35", "confidence": 1.7},
            "data": {"score": -5, "confidence": 0.4, "band": [0, 10]}
        }));
        let scores = pillar_scores(&rec, &thesis(), 0.5);

        let reg = &scores["regulatory"];
        assert_eq!(reg.score, 100);
        assert_eq!(reg.band, (60, 90));
        assert_eq!(reg.justification, "ISO 27001");
        assert_eq!(reg.confidence, 0.9);
        assert_eq!(reg.effective_confidence, 0.5);

        let net = &scores["network"];
        assert_eq!(net.score, 35);
        assert_eq!(net.confidence, 1.0);
        assert_eq!(net.band, (35, 35));

        let data = &scores["data"];
        assert_eq!(data.score, 0);
        assert_eq!(data.effective_confidence, 0.4);
    }

    #[test]
    fn test_incomplete_and_unknown_pillars_skipped() {
        let rec = record(json!({
            "regulatory": {"score": 45},
            "moonshot": {"score": 99, "confidence": 0.9},
            "Geographic": {"score": 20, "confidence": 0.6}
        }));
        let scores = pillar_scores(&rec, &thesis(), 1.0);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores["geographic"].score, 20);
    }
}
