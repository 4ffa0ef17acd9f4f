use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Summary shown for items whose scoring policy has not been finalized.
pub const NOT_CONFIGURED_SUMMARY: &str = "Not configured";

/// Identifier wrapper for competency items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Semantic type of the value being graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeType {
    #[serde(alias = "STRING")]
    String,
    #[serde(alias = "NUMERIC")]
    Numeric,
    #[serde(alias = "FILE_EXISTS")]
    FileExists,
    #[serde(alias = "MULTI_SELECT")]
    MultiSelect,
}

impl GradeType {
    pub const ALL: [GradeType; 4] = [
        GradeType::String,
        GradeType::Numeric,
        GradeType::FileExists,
        GradeType::MultiSelect,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            GradeType::String => "string",
            GradeType::Numeric => "numeric",
            GradeType::FileExists => "file_exists",
            GradeType::MultiSelect => "multi_select",
        }
    }

    /// Aggregation modes that make sense for values of this type.
    pub const fn allowed_aggregations(self) -> &'static [AggregationMode] {
        match self {
            GradeType::String => &[
                AggregationMode::AnyMatch,
                AggregationMode::First,
                AggregationMode::BestMatch,
            ],
            GradeType::Numeric => &[
                AggregationMode::Sum,
                AggregationMode::Max,
                AggregationMode::Count,
                AggregationMode::BestMatch,
            ],
            GradeType::FileExists => &[AggregationMode::First],
            GradeType::MultiSelect => &[
                AggregationMode::AnyMatch,
                AggregationMode::Count,
                AggregationMode::BestMatch,
            ],
        }
    }

    pub fn allows(self, mode: AggregationMode) -> bool {
        self.allowed_aggregations().contains(&mode)
    }
}

/// Comparison strategy used to turn a raw value into a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchingType {
    Exact,
    Contains,
    Range,
    Grade,
}

impl MatchingType {
    pub const fn label(self) -> &'static str {
        match self {
            MatchingType::Exact => "EXACT",
            MatchingType::Contains => "CONTAINS",
            MatchingType::Range => "RANGE",
            MatchingType::Grade => "GRADE",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            MatchingType::Exact => "Exact match",
            MatchingType::Contains => "Contains",
            MatchingType::Range => "Range",
            MatchingType::Grade => "Grade",
        }
    }
}

/// Where the evaluator reads the input value from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueSource {
    #[default]
    Submitted,
    UserField,
    JsonField,
}

impl ValueSource {
    pub const fn label(self) -> &'static str {
        match self {
            ValueSource::Submitted => "SUBMITTED",
            ValueSource::UserField => "USER_FIELD",
            ValueSource::JsonField => "JSON_FIELD",
        }
    }

    pub const fn requires_source_field(self) -> bool {
        matches!(self, ValueSource::UserField | ValueSource::JsonField)
    }
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How multiple submitted values for one item combine into a single score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationMode {
    AnyMatch,
    First,
    Sum,
    Max,
    Count,
    BestMatch,
}

impl AggregationMode {
    pub const ALL: [AggregationMode; 6] = [
        AggregationMode::AnyMatch,
        AggregationMode::First,
        AggregationMode::Sum,
        AggregationMode::Max,
        AggregationMode::Count,
        AggregationMode::BestMatch,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            AggregationMode::AnyMatch => "ANY_MATCH",
            AggregationMode::First => "FIRST",
            AggregationMode::Sum => "SUM",
            AggregationMode::Max => "MAX",
            AggregationMode::Count => "COUNT",
            AggregationMode::BestMatch => "BEST_MATCH",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            AggregationMode::AnyMatch => "Any match",
            AggregationMode::First => "First value",
            AggregationMode::Sum => "Sum",
            AggregationMode::Max => "Maximum",
            AggregationMode::Count => "Count",
            AggregationMode::BestMatch => "Best match",
        }
    }
}

/// Whether supporting documentation must accompany the submitted value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProofRequirement {
    #[default]
    NotRequired,
    Optional,
    Required,
}

/// Value side of a grade rung; the wire format carries either strings or numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GradeValue {
    Number(f64),
    Text(String),
}

impl GradeValue {
    /// Canonical form used for uniqueness checks and lookups.
    pub fn key(&self) -> String {
        match self {
            GradeValue::Number(number) => format_number(*number),
            GradeValue::Text(text) => text.trim().to_string(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            GradeValue::Number(number) => Some(*number),
            GradeValue::Text(text) => text.trim().parse::<f64>().ok(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            GradeValue::Number(number) => Value::from(*number),
            GradeValue::Text(text) => Value::String(text.clone()),
        }
    }
}

impl fmt::Display for GradeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<&str> for GradeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for GradeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for GradeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// One rung of a grade ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeMapping {
    pub value: GradeValue,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Template-provided rung: score may be tuned, value and presence may not.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fixed: bool,
}

impl GradeMapping {
    pub fn new(value: impl Into<GradeValue>, score: f64) -> Self {
        Self {
            value: value.into(),
            score,
            label: None,
            fixed: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn locked(mut self) -> Self {
        self.fixed = true;
        self
    }
}

/// Scoring policy for one competency item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    pub item_id: ItemId,
    #[serde(default)]
    pub matching_type: Option<MatchingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_type: Option<GradeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_source: Option<ValueSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_mode: Option<AggregationMode>,
    #[serde(default)]
    pub grade_mappings: Vec<GradeMapping>,
    #[serde(default)]
    pub configured: bool,
    #[serde(default)]
    pub fixed_grades: bool,
    #[serde(default = "allow_add_grades_default")]
    pub allow_add_grades: bool,
    #[serde(default)]
    pub proof_required: ProofRequirement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_note: Option<String>,
}

fn allow_add_grades_default() -> bool {
    true
}

impl ScoringConfig {
    /// Fresh, unconfigured policy used when no template applies.
    pub fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            matching_type: Some(MatchingType::Exact),
            grade_type: None,
            value_source: None,
            source_field: None,
            extract_pattern: None,
            aggregation_mode: None,
            grade_mappings: Vec::new(),
            configured: false,
            fixed_grades: false,
            allow_add_grades: true,
            proof_required: ProofRequirement::NotRequired,
            verification_note: None,
        }
    }

    pub fn value_source(&self) -> ValueSource {
        self.value_source.unwrap_or_default()
    }

    pub fn total_score(&self) -> f64 {
        calculate_total_score(self)
    }

    pub fn summary(&self) -> String {
        scoring_config_summary(self)
    }

    /// Mark the policy as finalized once it passes validation.
    pub fn finalize(&mut self, max_score: Option<f64>) -> Result<(), Vec<String>> {
        let errors = super::validation::validate(self, max_score);
        if errors.is_empty() {
            self.configured = true;
            Ok(())
        } else {
            self.configured = false;
            Err(errors)
        }
    }

    /// Drop every edit and return to an unconfigured exact-match policy.
    pub fn reset(&mut self) {
        *self = Self::new(self.item_id.clone());
    }
}

/// Definition-side facts about an item that the policy itself does not carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyItem {
    pub item_id: ItemId,
    pub name: String,
    #[serde(default)]
    pub max_score: f64,
    /// Scalar comparison value or range expression for non-grade matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<String>,
}

impl CompetencyItem {
    pub fn new(item_id: ItemId, name: impl Into<String>, max_score: f64) -> Self {
        Self {
            item_id,
            name: name.into(),
            max_score,
            expected_value: None,
        }
    }

    pub fn with_expected_value(mut self, expected: impl Into<String>) -> Self {
        self.expected_value = Some(expected.into());
        self
    }
}

/// Stored profile fields for the applicant, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(pub Map<String, Value>);

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Highest rung score on the ladder, or zero for an empty ladder.
pub fn calculate_total_score(config: &ScoringConfig) -> f64 {
    config
        .grade_mappings
        .iter()
        .map(|mapping| mapping.score)
        .fold(None, |best: Option<f64>, score| match best {
            Some(current) if current >= score => Some(current),
            _ => Some(score),
        })
        .unwrap_or(0.0)
}

/// Rungs ordered by score, highest first; equal scores keep their order.
pub fn sort_grade_mappings_by_score(mappings: &[GradeMapping]) -> Vec<GradeMapping> {
    let mut sorted = mappings.to_vec();
    sorted.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    sorted
}

pub fn scoring_config_summary(config: &ScoringConfig) -> String {
    let matching = match (config.configured, config.matching_type) {
        (true, Some(matching)) => matching,
        _ => return NOT_CONFIGURED_SUMMARY.to_string(),
    };

    match config.aggregation_mode {
        Some(mode) => format!("{} / {}", matching.display_name(), mode.display_name()),
        None => matching.display_name().to_string(),
    }
}

pub(crate) fn format_number(number: f64) -> String {
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}
