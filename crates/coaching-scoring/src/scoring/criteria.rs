//! Transport form of a scoring policy.
//!
//! Grade ladders, and range brackets when present, are folded into a single criteria record whose
//! `expected_value` carries the JSON-encoded ladder, so storage holds one row per item rather than
//! one per rung.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

use super::domain::{
    calculate_total_score, AggregationMode, GradeMapping, GradeType, GradeValue, ItemId,
    MatchingType, ScoringConfig, ValueSource,
};

const EXISTS_VALUES: [&str; 2] = ["exists", "있음"];
const NONE_VALUES: [&str; 2] = ["none", "없음"];
const EXISTS_LABEL: &str = "있음";
const NONE_LABEL: &str = "없음";

/// Serialized, transport-ready scoring criteria record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringCriteria {
    pub matching_type: MatchingType,
    #[serde(default)]
    pub expected_value: Option<String>,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_source: Option<ValueSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_mode: Option<AggregationMode>,
}

/// Convert a policy into the records the persistence layer stores.
///
/// A policy without a matching type has nothing to store and yields no records.
pub fn build_scoring_criteria(config: &ScoringConfig) -> Vec<ScoringCriteria> {
    let Some(matching_type) = config.matching_type else {
        return Vec::new();
    };

    let (expected_value, score) = if encodes_ladder(matching_type, config) {
        (
            grade_configuration(config).to_string(),
            calculate_total_score(config),
        )
    } else {
        (String::new(), 0.0)
    };

    vec![ScoringCriteria {
        matching_type,
        expected_value: Some(expected_value),
        score,
        value_source: config.value_source,
        source_field: config.source_field.clone(),
        extract_pattern: config.extract_pattern.clone(),
        aggregation_mode: config.aggregation_mode,
    }]
}

/// Grade ladders always travel in the payload; range ladders only when brackets are configured.
fn encodes_ladder(matching_type: MatchingType, config: &ScoringConfig) -> bool {
    match matching_type {
        MatchingType::Grade => true,
        MatchingType::Range => !config.grade_mappings.is_empty(),
        MatchingType::Exact | MatchingType::Contains => false,
    }
}

fn grade_configuration(config: &ScoringConfig) -> Value {
    let grade_type = match (config.grade_type, config.matching_type) {
        (Some(grade_type), _) => grade_type,
        (None, Some(MatchingType::Range)) => GradeType::Numeric,
        (None, _) => {
            warn!(item_id = %config.item_id, "grade policy has no grade type; encoding as string");
            GradeType::String
        }
    };

    let grades = if grade_type == GradeType::FileExists && config.grade_mappings.len() >= 2 {
        json!({
            "exists": presence_score(&config.grade_mappings, &EXISTS_VALUES),
            "none": presence_score(&config.grade_mappings, &NONE_VALUES),
        })
    } else {
        Value::Array(config.grade_mappings.iter().map(grade_json).collect())
    };

    let mut configuration = Map::new();
    configuration.insert("type".to_string(), Value::from(grade_type.label()));
    configuration.insert("grades".to_string(), grades);
    if grade_type == GradeType::MultiSelect {
        configuration.insert("mode".to_string(), Value::from("contains"));
    }
    Value::Object(configuration)
}

fn grade_json(mapping: &GradeMapping) -> Value {
    let mut entry = Map::new();
    entry.insert("value".to_string(), mapping.value.to_json());
    entry.insert("score".to_string(), Value::from(mapping.score));
    if let Some(label) = &mapping.label {
        entry.insert("label".to_string(), Value::from(label.as_str()));
    }
    Value::Object(entry)
}

fn presence_score(mappings: &[GradeMapping], aliases: &[&str]) -> f64 {
    mappings
        .iter()
        .find(|mapping| aliases.contains(&mapping.value.key().as_str()))
        .map(|mapping| mapping.score)
        .unwrap_or(0.0)
}

/// Rebuild a policy from stored criteria records.
///
/// Grade records whose payload is not a JSON object are read with the pre-JSON layout, where each
/// record held one rung. Well-formed payloads are decoded entry by entry; unreadable entries are
/// skipped.
pub fn parse_scoring_criteria(item_id: ItemId, criteria: &[ScoringCriteria]) -> Option<ScoringConfig> {
    let first = criteria.first()?;

    let mut config = ScoringConfig::new(item_id);
    config.matching_type = Some(first.matching_type);
    config.value_source = Some(first.value_source.unwrap_or_default());
    config.source_field = first.source_field.clone();
    config.extract_pattern = first.extract_pattern.clone();
    config.aggregation_mode = first.aggregation_mode;
    config.configured = true;

    let encoded = first.expected_value.as_deref().unwrap_or_default().trim();
    let reads_payload = match first.matching_type {
        MatchingType::Grade => true,
        MatchingType::Range => !encoded.is_empty(),
        MatchingType::Exact | MatchingType::Contains => false,
    };
    if !reads_payload {
        return Some(config);
    }

    match serde_json::from_str::<Value>(encoded) {
        Ok(Value::Object(configuration)) => {
            let (grade_type, mappings) = decode_configuration(&config.item_id, &configuration);
            config.grade_type = grade_type;
            config.grade_mappings = mappings;
        }
        other if first.matching_type == MatchingType::Grade => {
            let reason = match other {
                Ok(_) => "payload is not a JSON object".to_string(),
                Err(err) => err.to_string(),
            };
            warn!(
                item_id = %config.item_id,
                records = criteria.len(),
                reason = %reason,
                "grade criteria is not JSON encoded; reading legacy one-record-per-grade layout"
            );
            config.grade_mappings = criteria
                .iter()
                .map(|record| {
                    GradeMapping::new(
                        record.expected_value.clone().unwrap_or_default(),
                        record.score,
                    )
                })
                .collect();
        }
        _ => {
            warn!(item_id = %config.item_id, "range criteria payload is unreadable; brackets dropped");
        }
    }

    Some(config)
}

fn decode_configuration(
    item_id: &ItemId,
    configuration: &Map<String, Value>,
) -> (Option<GradeType>, Vec<GradeMapping>) {
    let grade_type = configuration
        .get("type")
        .and_then(|raw| serde_json::from_value::<GradeType>(raw.clone()).ok());
    if grade_type.is_none() {
        warn!(
            item_id = %item_id,
            grade_type = ?configuration.get("type"),
            "grade criteria names an unknown grade type"
        );
    }

    let mappings = match configuration.get("grades") {
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let mapping = decode_grade(entry);
                if mapping.is_none() {
                    warn!(item_id = %item_id, index, entry = %entry, "skipping unreadable grade entry");
                }
                mapping
            })
            .collect(),
        Some(Value::Object(presence)) if grade_type == Some(GradeType::FileExists) => vec![
            GradeMapping::new("exists", presence_side(item_id, presence, "exists"))
                .with_label(EXISTS_LABEL),
            GradeMapping::new("none", presence_side(item_id, presence, "none"))
                .with_label(NONE_LABEL),
        ],
        other => {
            warn!(item_id = %item_id, grades = ?other, "grade criteria has no readable grades");
            Vec::new()
        }
    };

    (grade_type, mappings)
}

fn decode_grade(entry: &Value) -> Option<GradeMapping> {
    let fields = entry.as_object()?;
    let value = match fields.get("value")? {
        Value::Number(number) => GradeValue::Number(number.as_f64()?),
        Value::String(text) => GradeValue::Text(text.clone()),
        _ => return None,
    };
    let score = match fields.get("score") {
        None | Some(Value::Null) => 0.0,
        Some(raw) => lenient_number(raw)?,
    };

    Some(GradeMapping {
        value,
        score,
        label: fields.get("label").and_then(Value::as_str).map(str::to_string),
        fixed: false,
    })
}

fn presence_side(item_id: &ItemId, presence: &Map<String, Value>, side: &str) -> f64 {
    match presence.get(side) {
        None | Some(Value::Null) => 0.0,
        Some(raw) => lenient_number(raw).unwrap_or_else(|| {
            warn!(item_id = %item_id, side, score = %raw, "unreadable presence score; using 0");
            0.0
        }),
    }
}

/// Scores typed into forms often arrive as strings such as `"40"` or `"1,000"`.
fn lenient_number(raw: &Value) -> Option<f64> {
    let number = match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}
